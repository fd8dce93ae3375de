//! camd35 control-word responses.

use tracing::warn;

use super::crypto::CasKey;
use crate::constants::{CAMD35_AUTH_LEN, CW_LEN, CW_MIN_LEN, CW_OFFSET, CW_RESPONSE_MIN_LEN};
use crate::error::{Error, Result};
use crate::types::ControlWord;
use crate::util::{get_u16, get_u32};

/// Strips the token and decrypts the rest. A token mismatch is only logged.
pub fn decrypt(key: &CasKey, frame: &[u8]) -> Result<Vec<u8>> {
    if frame.len() < CAMD35_AUTH_LEN {
        return Err(Error::ResponseTooShort(frame.len()));
    }
    let token = get_u32(frame);
    if token != key.auth_token() {
        warn!("recv auth : 0x{:08x} != camd35_auth 0x{:08x}", token, key.auth_token());
    }
    let mut data = frame[CAMD35_AUTH_LEN..].to_vec();
    key.decrypt(&mut data);
    Ok(data)
}

/// Validates a decrypted response and extracts the control word.
pub fn parse_cw(data: &[u8]) -> Result<ControlWord> {
    if data.len() < CW_RESPONSE_MIN_LEN {
        return Err(Error::ResponseTooShort(data.len()));
    }
    if data[0] < 0x01 {
        return Err(Error::InvalidStatus(data[0]));
    }
    if data[1] < CW_MIN_LEN {
        return Err(Error::InvalidCwLength(data[1]));
    }
    let mut cw = [0u8; CW_LEN];
    cw.copy_from_slice(&data[CW_OFFSET..CW_OFFSET + CW_LEN]);
    Ok(ControlWord {
        ca_id: get_u16(&data[10..]),
        idx:   get_u16(&data[16..]),
        cw,
    })
}
