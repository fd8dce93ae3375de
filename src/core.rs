use std::io::{self, Read};

use anyhow::Context;
use tokio::task::JoinError;
use tracing::info;

use crate::camd35::{CasClient, FileCapture, Transport, UdpTransport};
use crate::constants::{CHUNK_SIZE, TS_PACKET_SIZE};
use crate::extract::CaExtractor;
use crate::notify::Notifier;
use crate::processor::Session;
use crate::report::SessionReport;
use crate::types::{Options, TransportMode};

/// Decrypt-session entry point: wires transport, client and notifier, then
/// consumes stdin until it runs dry.
pub async fn run(opts: Options) -> anyhow::Result<()> {
    info!("CA System : {}", opts.ca_system);
    info!("Server");
    info!("  Addr    : {}", opts.server.addr);
    info!("  Auth    : {} / {}", opts.server.user, opts.server.pass);

    let transport: Box<dyn Transport> = match &opts.transport {
        TransportMode::Capture(dir) => Box::new(FileCapture::new(dir)),
        TransportMode::Udp(timeout) => Box::new(
            UdpTransport::connect(opts.server.addr, *timeout)
                .with_context(|| format!("connecting to {}", opts.server.addr))?,
        ),
    };
    let client = CasClient::new(&opts.server, transport);

    let notifier = opts.notify.as_ref().map(Notifier::spawn);
    let mut session = Session::new(CaExtractor::new(opts.ca_system), client);
    if let Some(n) = &notifier {
        n.handle().notify("START", format!("Starting with {}", opts.ca_system));
        session = session.with_notifier(n.handle());
    }

    let joined = tokio::task::spawn_blocking(move || {
        let result = pump(io::stdin().lock(), &mut session);
        (session, result)
    })
    .await;

    let packets = finish(joined, notifier, opts.report).await?;
    info!(packets, "end of input");
    Ok(())
}

/// Raises STOP, prints the report and drains the notifier, whether or not
/// the packet loop came back.
async fn finish(
    joined: Result<(Session, anyhow::Result<u64>), JoinError>,
    notifier: Option<Notifier>,
    report: bool,
) -> anyhow::Result<u64> {
    if let Some(n) = &notifier {
        n.handle().notify("STOP", "Stopping");
    }
    let result = match joined {
        Ok((session, result)) => {
            if report {
                println!("{}", SessionReport::from_session(&session).to_json());
            }
            result
        }
        Err(e) => Err(anyhow::Error::new(e).context("packet loop panicked")),
    };
    if let Some(n) = notifier {
        n.shutdown().await;
    }
    result
}

/// Feeds `input` to the session in fixed multi-packet chunks. A short chunk
/// (end of input) is processed and ends the loop. Returns whole packets read.
pub fn pump<R: Read>(mut input: R, session: &mut Session) -> anyhow::Result<u64> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = fill(&mut input, &mut buf).context("reading transport stream")?;
        session.process_packets(&buf[..n])?;
        total += (n / TS_PACKET_SIZE) as u64;
        if n < CHUNK_SIZE {
            return Ok(total);
        }
    }
}

fn fill<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
