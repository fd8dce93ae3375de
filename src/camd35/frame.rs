//! camd35 request frames.
//!
//! ```text
//! 0..4    auth token (clear)
//! 4..24   header: cmd, len, 0, 0, crc32(payload), srvid, caid, provid, idx, ffff
//! 24..    payload, 0xff padded to a 16-byte boundary
//! ```
//! Everything after the token is AES-128 encrypted block by block.

use bytes::{Bytes, BytesMut};

use super::crypto::{crc32, CasKey};
use crate::constants::{CAMD35_AUTH_LEN, CAMD35_BLOCK, CAMD35_BUF_SIZE, CAMD35_HDR_LEN, CAMD35_MAX_PAYLOAD, CAMD35_PAD_BYTE};
use crate::error::{Error, Result};
use crate::types::FrameKind;
use crate::util::{put_u16, put_u32, round_up};

/// Command byte of a request frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// ECM forwarded for a control word.
    Ecm { service_id: u16, ca_id: u16, idx: u16 },
    /// EMM pushed to the card server, no answer expected.
    Emm { ca_id: u16 },
}

impl Request {
    pub const CMD_ECM: u8 = 0x00;
    pub const CMD_EMM: u8 = 0x06;

    pub fn command(&self) -> u8 {
        match self {
            Request::Ecm { .. } => Self::CMD_ECM,
            Request::Emm { .. } => Self::CMD_EMM,
        }
    }

    pub fn kind(&self) -> FrameKind {
        match self {
            Request::Ecm { .. } => FrameKind::Ecm,
            Request::Emm { .. } => FrameKind::Emm,
        }
    }

    fn write_fields(&self, hdr: &mut [u8]) {
        hdr[0] = self.command();
        match *self {
            Request::Ecm { service_id, ca_id, idx } => {
                put_u16(&mut hdr[8..], service_id);
                put_u16(&mut hdr[10..], ca_id);
                put_u32(&mut hdr[12..], 0); // provider id
                put_u16(&mut hdr[16..], idx);
                hdr[18] = 0xff;
                hdr[19] = 0xff;
            }
            Request::Emm { ca_id } => {
                put_u16(&mut hdr[10..], ca_id);
                put_u32(&mut hdr[12..], 0);
            }
        }
    }
}

/// Plain (unencrypted) header + padded payload, without the token.
pub fn encode_plain(req: &Request, payload: &[u8]) -> Result<BytesMut> {
    if payload.len() > CAMD35_MAX_PAYLOAD {
        return Err(Error::PayloadTooLarge(payload.len()));
    }
    let len = round_up(CAMD35_HDR_LEN + payload.len(), CAMD35_BLOCK);
    let mut buf = BytesMut::with_capacity(CAMD35_BUF_SIZE);
    buf.resize(CAMD35_HDR_LEN, 0);
    buf.resize(len, CAMD35_PAD_BYTE);

    buf[1] = payload.len() as u8;
    put_u32(&mut buf[4..], crc32(payload));
    req.write_fields(&mut buf[..CAMD35_HDR_LEN]);
    buf[CAMD35_HDR_LEN..CAMD35_HDR_LEN + payload.len()].copy_from_slice(payload);
    Ok(buf)
}

/// Token followed by the encrypted header and payload, ready for the wire.
pub fn encode(key: &CasKey, req: &Request, payload: &[u8]) -> Result<Bytes> {
    let plain = encode_plain(req, payload)?;
    let mut frame = BytesMut::with_capacity(CAMD35_AUTH_LEN + plain.len());
    frame.extend_from_slice(&key.auth_token().to_be_bytes());
    frame.extend_from_slice(&plain);
    key.encrypt(&mut frame[CAMD35_AUTH_LEN..]);
    Ok(frame.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{get_u16, get_u32};
    use pretty_assertions::assert_eq;

    const ECM: [u8; 10] = [0x80, 0x70, 0x07, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];

    #[test]
    fn ecm_frame_round_trip() {
        let key = CasKey::derive("user", "pass");
        let req = Request::Ecm { service_id: 100, ca_id: 0x0500, idx: 7 };
        let frame = encode(&key, &req, &ECM).unwrap();

        assert_eq!(frame.len(), 4 + 32);
        assert_eq!(get_u32(&frame), key.auth_token());

        let mut body = frame[4..].to_vec();
        key.decrypt(&mut body);
        assert_eq!(body[0], Request::CMD_ECM);
        assert_eq!(body[1] as usize, ECM.len());
        assert_eq!(&body[2..4], &[0, 0]);
        assert_eq!(get_u32(&body[4..]), crc32(&body[20..20 + ECM.len()]));
        assert_eq!(get_u16(&body[8..]), 100);
        assert_eq!(get_u16(&body[10..]), 0x0500);
        assert_eq!(get_u32(&body[12..]), 0);
        assert_eq!(get_u16(&body[16..]), 7);
        assert_eq!(&body[18..20], &[0xff, 0xff]);
        assert_eq!(&body[20..30], &ECM);
        assert!(body[30..].iter().all(|&b| b == 0xff));
    }

    #[test]
    fn emm_frame_layout() {
        let payload = [0x82u8; 40];
        let plain = encode_plain(&Request::Emm { ca_id: 0x0B00 }, &payload).unwrap();
        assert_eq!(plain.len(), 64);
        assert_eq!(plain[0], Request::CMD_EMM);
        assert_eq!(plain[1], 40);
        assert_eq!(get_u16(&plain[8..]), 0);
        assert_eq!(get_u16(&plain[10..]), 0x0B00);
        assert_eq!(get_u16(&plain[16..]), 0);
        assert_eq!(&plain[18..20], &[0, 0]);
        assert_eq!(&plain[20..60], &payload[..]);
        assert_eq!(&plain[60..], &[0xff; 4]);
    }

    #[test]
    fn block_aligned_payload_gets_no_extra_block() {
        let plain = encode_plain(&Request::Emm { ca_id: 1 }, &[0u8; 12]).unwrap();
        assert_eq!(plain.len(), 32);
    }

    #[test]
    fn oversize_payload_rejected() {
        let key = CasKey::derive("user", "pass");
        let err = encode(&key, &Request::Emm { ca_id: 1 }, &[0u8; 256]).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge(256)));

        let max = encode(&key, &Request::Emm { ca_id: 1 }, &[0u8; 255]).unwrap();
        assert_eq!(max.len(), 4 + 288);
    }
}
