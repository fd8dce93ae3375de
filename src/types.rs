use std::{net::SocketAddrV4, path::PathBuf, time::Duration};

use serde::Serialize;

use crate::ca_system::CaSystem;

/// Which signalling message a camd35 frame carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    Emm,
    Ecm,
}

impl FrameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameKind::Emm => "emm",
            FrameKind::Ecm => "ecm",
        }
    }
}

/// Control word returned by the CAS, with the fields echoed for correlation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlWord {
    pub ca_id: u16,
    pub idx: u16,
    pub cw: [u8; 16],
}

/// A CA system's (CA id, pid) pair for EMM or ECM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaInfo {
    pub ca_id: u16,
    pub pid: u16,
}

/// Where camd35 frames go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportMode {
    /// Numbered dump files in a directory
    Capture(PathBuf),
    /// UDP exchange with the server, waiting this long for a CW
    Udp(Duration),
}

/// camd35 server endpoint and credentials
#[derive(Clone)]
pub struct ServerConfig {
    pub addr: SocketAddrV4,
    pub user: String,
    pub pass: String,
}

/// Notifier settings; both are needed for notifications to run
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub ident: String,
    pub program: PathBuf,
}

/// Configuration options for a decrypt session
pub struct Options {
    pub ca_system: CaSystem,
    pub server: ServerConfig,
    pub transport: TransportMode,
    pub notify: Option<NotifyConfig>,
    pub report: bool,
}
