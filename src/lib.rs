// src/lib.rs
//! Relays CA signalling (EMM / ECM) from an MPEG transport stream to a
//! camd35 card server and reads control words back.

pub mod tsdecrypt {
    pub use crate::types::{NotifyConfig, Options, ServerConfig, TransportMode};

    /// Async entry-point; returns at end of input
    pub async fn run(opts: Options) -> anyhow::Result<()> {
        crate::core::run(opts).await
    }
}

mod core;
pub mod ca_system;
pub mod camd35;
pub mod constants;
pub mod error;
pub mod extract;
pub mod notify;
pub mod packet;
pub mod processor;
pub mod psi;
pub mod report;
pub mod table;
pub mod types;
pub mod util;

#[cfg(test)]
mod test_utils;

pub use ca_system::CaSystem;
pub use camd35::{CasClient, CasKey, FileCapture, Transport, UdpTransport};
pub use crate::core::pump;
pub use error::{Error, Result};
pub use extract::CaExtractor;
pub use processor::Session;
pub use report::SessionReport;
pub use types::{CaInfo, ControlWord, FrameKind};
