//! 188-byte transport packet header.

use crate::constants::{TS_HEADER_SIZE, TS_PACKET_SIZE, TS_SYNC_BYTE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TsHeader {
    pub payload_unit_start: bool,
    pub pid: u16,
    pub adaptation_field_control: u8,
    pub continuity_counter: u8,
}

impl TsHeader {
    /// `None` for short packets or a lost sync byte.
    pub fn parse(packet: &[u8]) -> Option<Self> {
        if packet.len() < TS_PACKET_SIZE || packet[0] != TS_SYNC_BYTE {
            return None;
        }
        Some(Self {
            payload_unit_start: packet[1] & 0x40 != 0,
            pid: pid(packet),
            adaptation_field_control: (packet[3] & 0x30) >> 4,
            continuity_counter: packet[3] & 0x0F,
        })
    }

    /// Payload bytes after the header and adaptation field, if any.
    pub fn payload<'a>(&self, packet: &'a [u8]) -> Option<&'a [u8]> {
        let mut offset = TS_HEADER_SIZE;
        match self.adaptation_field_control {
            0 | 2 => return None,
            3 => {
                offset += 1 + packet[4] as usize;
                if offset >= TS_PACKET_SIZE {
                    return None;
                }
            }
            _ => {}
        }
        Some(&packet[offset..TS_PACKET_SIZE])
    }
}

pub fn pid(packet: &[u8]) -> u16 {
    ((packet[1] & 0x1F) as u16) << 8 | packet[2] as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(b1: u8, b2: u8, b3: u8) -> [u8; TS_PACKET_SIZE] {
        let mut p = [0xFFu8; TS_PACKET_SIZE];
        p[..4].copy_from_slice(&[TS_SYNC_BYTE, b1, b2, b3]);
        p
    }

    #[test]
    fn decodes_header_fields() {
        let p = packet(0x40 | 0x01, 0x23, 0x17);
        let h = TsHeader::parse(&p).unwrap();
        assert!(h.payload_unit_start);
        assert_eq!(h.pid, 0x0123);
        assert_eq!(h.adaptation_field_control, 1);
        assert_eq!(h.continuity_counter, 7);
        assert_eq!(h.payload(&p).unwrap().len(), TS_PACKET_SIZE - 4);
    }

    #[test]
    fn skips_adaptation_field() {
        let mut p = packet(0x00, 0x40, 0x30);
        p[4] = 10;
        let h = TsHeader::parse(&p).unwrap();
        assert_eq!(h.payload(&p).unwrap().len(), TS_PACKET_SIZE - 4 - 11);

        let only_af = packet(0x00, 0x40, 0x20);
        assert!(TsHeader::parse(&only_af).unwrap().payload(&only_af).is_none());
    }

    #[test]
    fn rejects_lost_sync() {
        let mut p = packet(0, 0, 0x10);
        p[0] = 0x00;
        assert!(TsHeader::parse(&p).is_none());
        assert!(TsHeader::parse(&p[..100]).is_none());
    }
}
