//! Builders for CRC-correct sections and their TS packetization.

use crate::constants::{CA_DESCRIPTOR_TAG, TS_PACKET_SIZE, TS_SYNC_BYTE};
use crate::psi::section::crc32_mpeg;

pub type Packet = [u8; TS_PACKET_SIZE];

/// Long-form section with version, current_next = 1 and a trailing CRC.
pub fn long_section(table_id: u8, ext: u16, version: u8, body: &[u8]) -> Vec<u8> {
    let section_length = 5 + body.len() + 4;
    let mut sec = vec![
        table_id,
        0xB0 | ((section_length >> 8) as u8 & 0x0F),
        section_length as u8,
        (ext >> 8) as u8,
        ext as u8,
        0xC1 | (version & 0x1F) << 1,
        0x00,
        0x00,
    ];
    sec.extend_from_slice(body);
    let crc = crc32_mpeg(&sec);
    sec.extend_from_slice(&crc.to_be_bytes());
    sec
}

/// Short-form private section as carried on EMM/ECM pids.
pub fn private_section(table_id: u8, body: &[u8]) -> Vec<u8> {
    let mut sec = vec![table_id, 0x70 | ((body.len() >> 8) as u8 & 0x0F), body.len() as u8];
    sec.extend_from_slice(body);
    sec
}

pub fn ca_descriptor(ca_id: u16, pid: u16) -> Vec<u8> {
    vec![CA_DESCRIPTOR_TAG, 4, (ca_id >> 8) as u8, ca_id as u8, 0xE0 | (pid >> 8) as u8, pid as u8]
}

pub fn pat_section(programs: &[(u16, u16)]) -> Vec<u8> {
    let body: Vec<u8> = programs
        .iter()
        .flat_map(|&(program, pid)| [(program >> 8) as u8, program as u8, 0xE0 | (pid >> 8) as u8, pid as u8])
        .collect();
    long_section(0x00, 0x0001, 0, &body)
}

pub fn cat_section(descriptors: &[u8]) -> Vec<u8> {
    long_section(0x01, 0xFFFF, 0, descriptors)
}

/// One elementary stream per `(stream_type, pid, es_descriptors)`.
pub fn pmt_section(program: u16, pcr_pid: u16, program_info: &[u8], streams: &[(u8, u16, Vec<u8>)]) -> Vec<u8> {
    let mut body = vec![
        0xE0 | (pcr_pid >> 8) as u8,
        pcr_pid as u8,
        0xF0 | (program_info.len() >> 8) as u8,
        program_info.len() as u8,
    ];
    body.extend_from_slice(program_info);
    for (stream_type, pid, descriptors) in streams {
        body.extend_from_slice(&[
            *stream_type,
            0xE0 | (pid >> 8) as u8,
            *pid as u8,
            0xF0 | (descriptors.len() >> 8) as u8,
            descriptors.len() as u8,
        ]);
        body.extend_from_slice(descriptors);
    }
    long_section(0x02, program, 0, &body)
}

pub fn packetize(pid: u16, section: &[u8], first_cc: u8) -> Vec<Packet> {
    packetize_with_pointer(pid, section, first_cc, 0)
}

/// Splits `section` into packets, the first one carrying a pointer field
/// that skips `pointer` filler bytes. Unused payload is 0xFF stuffing.
pub fn packetize_with_pointer(pid: u16, section: &[u8], first_cc: u8, pointer: u8) -> Vec<Packet> {
    let mut out = Vec::new();
    let mut rest = section;
    let mut cc = first_cc & 0x0F;
    let mut first = true;
    while first || !rest.is_empty() {
        let mut p = [0xFFu8; TS_PACKET_SIZE];
        p[0] = TS_SYNC_BYTE;
        p[1] = (if first { 0x40 } else { 0x00 }) | (pid >> 8) as u8 & 0x1F;
        p[2] = pid as u8;
        p[3] = 0x10 | cc;
        let mut at = 4;
        if first {
            p[at] = pointer;
            at += 1 + pointer as usize;
        }
        let n = rest.len().min(TS_PACKET_SIZE - at);
        p[at..at + n].copy_from_slice(&rest[..n]);
        rest = &rest[n..];
        out.push(p);
        cc = (cc + 1) & 0x0F;
        first = false;
    }
    out
}

pub fn concat(packets: &[Packet]) -> Vec<u8> {
    packets.iter().flat_map(|p| p.iter().copied()).collect()
}

/// Single packet with `payload` placed verbatim after the header (pointer
/// field included when `start` is set), padded with 0xFF.
pub fn raw_packet(pid: u16, start: bool, cc: u8, payload: &[u8]) -> Packet {
    let mut p = [0xFFu8; TS_PACKET_SIZE];
    p[0] = TS_SYNC_BYTE;
    p[1] = (if start { 0x40 } else { 0x00 }) | (pid >> 8) as u8 & 0x1F;
    p[2] = pid as u8;
    p[3] = 0x10 | (cc & 0x0F);
    p[4..4 + payload.len()].copy_from_slice(payload);
    p
}
