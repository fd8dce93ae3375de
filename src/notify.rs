//! Runs an external program for operational events.
//!
//! Events are queued without blocking the packet loop; a worker task drains
//! the queue and spawns one short-lived task per event that runs
//! `<program> <ident>` with the event in its environment.

use std::path::PathBuf;

use tokio::{process::Command, sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

use crate::constants::NOTIFY_QUEUE_DEPTH;
use crate::types::NotifyConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub msg_id: String,
    pub text: String,
}

/// Cheap handle the packet pipeline keeps for raising events.
#[derive(Debug, Clone)]
pub struct NotifyHandle {
    tx: mpsc::Sender<Notification>,
}

impl NotifyHandle {
    /// Never blocks; drops the event when the queue is full or closed.
    pub fn notify(&self, msg_id: &str, text: impl Into<String>) {
        let n = Notification { msg_id: msg_id.to_string(), text: text.into() };
        if let Err(e) = self.tx.try_send(n) {
            warn!(msg_id, "notification dropped: {e}");
        }
    }
}

pub struct Notifier {
    handle: NotifyHandle,
    worker: JoinHandle<()>,
}

impl Notifier {
    /// Must be called from within a tokio runtime.
    pub fn spawn(cfg: &NotifyConfig) -> Self {
        let (tx, rx) = mpsc::channel(NOTIFY_QUEUE_DEPTH);
        let ident = sanitize_ident(&cfg.ident);
        let worker = tokio::spawn(run_worker(rx, cfg.program.clone(), ident));
        Self { handle: NotifyHandle { tx }, worker }
    }

    pub fn handle(&self) -> NotifyHandle {
        self.handle.clone()
    }

    /// Closes the queue once every handle is gone and waits for the worker.
    pub async fn shutdown(self) {
        drop(self.handle);
        if let Err(e) = self.worker.await {
            warn!("notify worker failed: {e}");
        }
    }
}

async fn run_worker(mut rx: mpsc::Receiver<Notification>, program: PathBuf, ident: String) {
    let mut running = Vec::new();
    while let Some(n) = rx.recv().await {
        running.retain(|t: &JoinHandle<()>| !t.is_finished());
        let env = notification_env(&ident, &n, chrono::Utc::now().timestamp());
        let program = program.clone();
        let ident = ident.clone();
        running.push(tokio::spawn(async move {
            let status = Command::new(&program).arg(&ident).env_clear().envs(env).status().await;
            match status {
                Ok(s) if s.success() => debug!(msg_id = %n.msg_id, "notified"),
                Ok(s) => warn!(program = %program.display(), "notify program exited with {s}"),
                Err(e) => warn!(program = %program.display(), "notify program failed: {e}"),
            }
        }));
    }
    for t in running {
        let _ = t.await;
    }
}

/// Ident is passed as a single argument, so path separators are replaced.
pub fn sanitize_ident(ident: &str) -> String {
    ident.replace('/', "-")
}

/// `_MESSAGE_MSG` is the id in lower case with underscores as spaces.
pub fn notification_env(ident: &str, n: &Notification, ts: i64) -> Vec<(String, String)> {
    let msg = n
        .msg_id
        .chars()
        .map(|c| if c == '_' { ' ' } else { c.to_ascii_lowercase() })
        .collect::<String>();
    vec![
        ("_TS".into(), ts.to_string()),
        ("_IDENT".into(), ident.to_string()),
        ("_MESSAGE_ID".into(), n.msg_id.clone()),
        ("_MESSAGE_TEXT".into(), n.text.clone()),
        ("_MESSAGE_MSG".into(), msg),
    ]
}
