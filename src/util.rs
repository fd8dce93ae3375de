//! Fixed-width big-endian packing and small formatting helpers.

pub fn put_u16(buf: &mut [u8], value: u16) {
    buf[..2].copy_from_slice(&value.to_be_bytes());
}

pub fn put_u32(buf: &mut [u8], value: u32) {
    buf[..4].copy_from_slice(&value.to_be_bytes());
}

pub fn get_u16(buf: &[u8]) -> u16 {
    u16::from_be_bytes([buf[0], buf[1]])
}

pub fn get_u32(buf: &[u8]) -> u32 {
    u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]])
}

/// Rounds `n` up to the next multiple of `block` (a power of two).
pub fn round_up(n: usize, block: usize) -> usize {
    debug_assert!(block.is_power_of_two());
    (n + block - 1) & !(block - 1)
}

/// Space separated hex of at most `limit` leading bytes.
pub fn hex_prefix(data: &[u8], limit: usize) -> String {
    data.iter()
        .take(limit)
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Multi-line hex dump, `per_line` bytes per row with an offset column.
pub fn hex_dump(data: &[u8], per_line: usize) -> String {
    data.chunks(per_line.max(1))
        .enumerate()
        .map(|(row, chunk)| format!("{:04x}: {}", row * per_line, hex_prefix(chunk, chunk.len())))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_big_endian() {
        let mut buf = [0u8; 6];
        put_u16(&mut buf, 0x0500);
        put_u32(&mut buf[2..], 0xdd03_0b17);
        assert_eq!(buf, [0x05, 0x00, 0xdd, 0x03, 0x0b, 0x17]);
        assert_eq!(get_u16(&buf), 0x0500);
        assert_eq!(get_u32(&buf[2..]), 0xdd03_0b17);
    }

    #[test]
    fn rounds_to_block() {
        assert_eq!(round_up(0, 16), 0);
        assert_eq!(round_up(20, 16), 32);
        assert_eq!(round_up(32, 16), 32);
        assert_eq!(round_up(20 + 255, 16), 288);
    }

    #[test]
    fn hex_helpers() {
        assert_eq!(hex_prefix(&[0x80, 0x70, 0x01], 2), "80 70");
        assert_eq!(hex_dump(&[0u8; 3], 2), "0000: 00 00\n0002: 00");
    }
}
