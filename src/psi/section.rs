// psi/section.rs
//! Section reassembly across TS packets and long-form header decoding
//! with CRC-32 (MPEG-2) validation.

use bytes::{Bytes, BytesMut};
use crc::{Crc, CRC_32_MPEG_2};
use tracing::{debug, trace};

use crate::constants::TABLE_ID_STUFFING;
use crate::error::{Error, Result};
use crate::packet::TsHeader;

const CRC_MPEG: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

pub fn crc32_mpeg(data: &[u8]) -> u32 {
    CRC_MPEG.checksum(data)
}

/// Accumulates the packets of one pid until a whole section is present.
#[derive(Debug, Default)]
pub struct SectionBuffer {
    buf: BytesMut,
    last_cc: Option<u8>,
}

impl SectionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        self.last_cc = None;
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Feeds one packet. Returns every section (table_id through the last
    /// section byte) the packet completes, in stream order: first the one
    /// finished by the bytes ahead of the pointer field, then any that start
    /// and end inside this packet.
    pub fn push_packet(&mut self, packet: &[u8]) -> Vec<Bytes> {
        let mut done = Vec::new();
        let Some(header) = TsHeader::parse(packet) else { return done };
        let Some(payload) = header.payload(packet) else { return done };
        let cc = header.continuity_counter;
        let continuous = self.last_cc.is_some_and(|last| cc == (last + 1) & 0x0F);

        if header.payload_unit_start {
            let Some((&pointer, rest)) = payload.split_first() else {
                self.reset();
                return done;
            };
            if pointer as usize > rest.len() {
                debug!(pid = header.pid, pointer, "pointer field past payload");
                self.reset();
                return done;
            }
            let (tail, head) = rest.split_at(pointer as usize);
            if !self.buf.is_empty() {
                if continuous {
                    self.buf.extend_from_slice(tail);
                    done.extend(self.take_section());
                } else {
                    debug!(pid = header.pid, cc, "discontinuity, dropping partial section");
                }
            }
            self.buf.clear();
            self.buf.extend_from_slice(head);
            self.last_cc = Some(cc);
            while let Some(section) = self.take_section() {
                done.push(section);
            }
        } else {
            let Some(last) = self.last_cc else { return done };
            if cc == last {
                trace!(pid = header.pid, cc, "duplicate packet");
                return done;
            }
            self.last_cc = Some(cc);
            if self.buf.is_empty() {
                return done;
            }
            if !continuous {
                debug!(pid = header.pid, expected = (last + 1) & 0x0F, cc, "discontinuity, dropping partial section");
                self.buf.clear();
                return done;
            }
            self.buf.extend_from_slice(payload);
            if let Some(section) = self.take_section() {
                done.push(section);
                // a new section cannot start without payload_unit_start
                self.buf.clear();
            }
        }
        done
    }

    /// Splits off the leading section once all of it is buffered. Stuffing
    /// ends the packet's sections.
    fn take_section(&mut self) -> Option<Bytes> {
        if *self.buf.first()? == TABLE_ID_STUFFING {
            self.buf.clear();
            return None;
        }
        if self.buf.len() < 3 {
            return None;
        }
        let total = 3 + (((self.buf[1] & 0x0F) as usize) << 8 | self.buf[2] as usize);
        if self.buf.len() < total {
            return None;
        }
        Some(self.buf.split_to(total).freeze())
    }
}

/// Long-form section header view. Built from a complete section.
pub struct SectionReader<'a> {
    pub table_id:      u8,
    pub table_id_ext:  u16,
    pub version:       u8,
    pub current_next:  bool,
    pub section_number:u8,
    pub last_section:  u8,
    pub body:          &'a [u8],   // bytes between fixed header & CRC
}

impl<'a> SectionReader<'a> {
    /// Validates length and CRC-32.
    pub fn new(section: &'a [u8]) -> Result<Self> {
        if section.len() < 12 { return Err(Error::MalformedSection("short section")) }
        if section[1] & 0x80 == 0 { return Err(Error::MalformedSection("not a long-form section")) }

        let sec_len = ((section[1] & 0x0F) as usize) << 8 | section[2] as usize;
        let end     = 3 + sec_len;
        if sec_len < 9 { return Err(Error::MalformedSection("invalid section_length")) }
        if end > section.len() { return Err(Error::MalformedSection("truncated section")) }

        let crc_calc = crc32_mpeg(&section[..end-4]);
        let crc_pkt  = u32::from_be_bytes([section[end-4], section[end-3], section[end-2], section[end-1]]);
        if crc_calc != crc_pkt {
            return Err(Error::MalformedSection("CRC-32 mismatch"));
        }

        Ok(Self {
            table_id:      section[0],
            table_id_ext:  u16::from_be_bytes([section[3], section[4]]),
            version:       (section[5] & 0x3E) >> 1,
            current_next:  section[5] & 0x01 != 0,
            section_number:section[6],
            last_section:  section[7],
            body:          &section[8 .. end-4],
        })
    }
}
