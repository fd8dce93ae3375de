//! camd35 client: frames EMMs and ECMs for a card server and reads
//! control words back.

pub mod crypto;
pub mod frame;
pub mod response;
pub mod transport;

use std::sync::OnceLock;

use tracing::{debug, warn};

pub use crypto::CasKey;
pub use frame::Request;
pub use transport::{FileCapture, Transport, UdpTransport};

use crate::error::Result;
use crate::types::{ControlWord, ServerConfig};
use crate::util::{hex_dump, hex_prefix};

pub struct CasClient {
    user: String,
    pass: String,
    key: OnceLock<CasKey>,
    transport: Box<dyn Transport>,
}

impl CasClient {
    pub fn new(server: &ServerConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            user: server.user.clone(),
            pass: server.pass.clone(),
            key: OnceLock::new(),
            transport,
        }
    }

    /// Derived on first use, fixed for the life of the client.
    pub fn key(&self) -> &CasKey {
        self.key.get_or_init(|| CasKey::derive(&self.user, &self.pass))
    }

    fn send(&mut self, req: Request, payload: &[u8]) -> Result<()> {
        let frame = frame::encode(self.key(), &req, payload)?;
        debug!(?req, len = frame.len(), "camd35 send");
        self.transport.send(req.kind(), &frame)
    }

    pub fn send_emm(&mut self, ca_id: u16, payload: &[u8]) -> Result<()> {
        self.send(Request::Emm { ca_id }, payload)
    }

    /// Forwards an ECM and, when the transport yields an answer, decodes the
    /// control word. Once the frame is out the delivery counts: a rejected
    /// answer is reported as `Ok(Some(Err(_)))` and a failed receive as no
    /// answer.
    pub fn send_ecm(
        &mut self,
        service_id: u16,
        ca_id: u16,
        idx: u16,
        payload: &[u8],
    ) -> Result<Option<Result<ControlWord>>> {
        self.send(Request::Ecm { service_id, ca_id, idx }, payload)?;
        let answer = match self.transport.recv() {
            Ok(Some(answer)) => answer,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(idx, "no answer: {e}");
                return Ok(None);
            }
        };
        let decoded = match response::decrypt(self.key(), &answer) {
            Ok(data) => response::parse_cw(&data).inspect_err(|e| {
                warn!("{e}, response:\n{}", hex_dump(&data, 16));
            }),
            Err(e) => {
                warn!("{e}, response:\n{}", hex_dump(&answer, 16));
                Err(e)
            }
        };
        if let Ok(cw) = &decoded {
            debug!("CW ca_id: 0x{:04x} idx: 0x{:04x} cw: {}", cw.ca_id, cw.idx, hex_prefix(&cw.cw, 16));
        }
        Ok(Some(decoded))
    }
}
