//! camd35 key schedule: token and AES-128 keys derived from the credentials.

use std::fmt;

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128Dec, Aes128Enc};
use crc::{Crc, CRC_32_ISO_HDLC};
use md5::{Digest, Md5};

use crate::constants::CAMD35_BLOCK;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// zlib-compatible CRC-32, as used for the token and payload checksums.
pub fn crc32(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}

fn md5(data: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(&Md5::digest(data));
    out
}

#[derive(Clone)]
pub struct CasKey {
    auth_token: u32,
    enc: Aes128Enc,
    dec: Aes128Dec,
}

impl CasKey {
    pub fn derive(user: &str, pass: &str) -> Self {
        let key = md5(pass.as_bytes());
        let key = GenericArray::from_slice(&key);
        Self {
            auth_token: crc32(&md5(user.as_bytes())),
            enc: Aes128Enc::new(key),
            dec: Aes128Dec::new(key),
        }
    }

    pub fn auth_token(&self) -> u32 {
        self.auth_token
    }

    /// Encrypts every whole 16-byte block of `buf` in place (ECB).
    pub fn encrypt(&self, buf: &mut [u8]) {
        for block in buf.chunks_exact_mut(CAMD35_BLOCK) {
            self.enc.encrypt_block(GenericArray::from_mut_slice(block));
        }
    }

    /// Decrypts every whole 16-byte block of `buf` in place; a trailing
    /// partial block is left untouched.
    pub fn decrypt(&self, buf: &mut [u8]) {
        for block in buf.chunks_exact_mut(CAMD35_BLOCK) {
            self.dec.decrypt_block(GenericArray::from_mut_slice(block));
        }
    }
}

impl fmt::Debug for CasKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CasKey")
            .field("auth_token", &format_args!("0x{:08x}", self.auth_token))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_crc_of_user_digest() {
        // md5("user") = ee11cbb19052e40b07aac0ca060c23ee
        let key = CasKey::derive("user", "pass");
        assert_eq!(key.auth_token(), 0xdd03_0b17);
    }

    #[test]
    fn payload_checksum_matches_zlib() {
        assert_eq!(crc32(b"123456789"), 0xcbf4_3926);
    }

    #[test]
    fn aes_key_is_password_digest() {
        // AES-128-ECB(md5("pass"), 00..0f)
        let key = CasKey::derive("user", "pass");
        let mut block: [u8; 16] = std::array::from_fn(|i| i as u8);
        key.encrypt(&mut block);
        assert_eq!(block, AES_PASS_VECTOR);
        key.decrypt(&mut block);
        assert_eq!(block, std::array::from_fn::<u8, 16, _>(|i| i as u8));
    }

    #[test]
    fn partial_tail_untouched() {
        let key = CasKey::derive("u", "p");
        let mut buf = [0x5Au8; 20];
        key.decrypt(&mut buf);
        assert_eq!(&buf[16..], &[0x5A; 4]);
    }

    const AES_PASS_VECTOR: [u8; 16] = [
        0xa5, 0x23, 0x29, 0xcc, 0x3d, 0x01, 0x76, 0x08, 0x7f, 0xc1, 0x60, 0x44, 0x78, 0xe7, 0xc5, 0x25,
    ];
}
