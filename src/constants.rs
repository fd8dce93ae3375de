//! Constants for MPEG-TS demultiplexing and the camd35 protocol

/// MPEG-TS packet constants
pub const TS_PACKET_SIZE: usize = 188;
pub const TS_SYNC_BYTE: u8 = 0x47;
pub const TS_HEADER_SIZE: usize = 4;

/// Packets read from stdin per chunk
pub const PACKETS_PER_CHUNK: usize = 7;
pub const CHUNK_SIZE: usize = TS_PACKET_SIZE * PACKETS_PER_CHUNK;

/// Well-known PIDs
pub const PID_PAT: u16 = 0x0000;
pub const PID_CAT: u16 = 0x0001;

/// Table ids
pub const TABLE_ID_PAT: u8 = 0x00;
pub const TABLE_ID_CAT: u8 = 0x01;
pub const TABLE_ID_PMT: u8 = 0x02;
pub const TABLE_ID_STUFFING: u8 = 0xFF;

/// CA_descriptor (ISO/IEC 13818-1 2.6.16)
pub const CA_DESCRIPTOR_TAG: u8 = 0x09;

/// camd35 framing
pub const CAMD35_AUTH_LEN: usize = 4;
pub const CAMD35_HDR_LEN: usize = 20;
pub const CAMD35_MAX_PAYLOAD: usize = 255;
pub const CAMD35_BLOCK: usize = 16;
pub const CAMD35_BUF_SIZE: usize = CAMD35_AUTH_LEN + CAMD35_HDR_LEN + 256 + CAMD35_BLOCK;
pub const CAMD35_PAD_BYTE: u8 = 0xFF;

/// A CW response must carry at least this many decrypted bytes
pub const CW_RESPONSE_MIN_LEN: usize = 48;
pub const CW_MIN_LEN: u8 = 0x10;
pub const CW_OFFSET: usize = 20;
pub const CW_LEN: usize = 16;

/// Defaults matching the historic command line
pub const DEFAULT_SERVER: &str = "10.0.1.78";
pub const DEFAULT_PORT: u16 = 2233;
pub const DEFAULT_USER: &str = "user";
pub const DEFAULT_PASS: &str = "pass";

/// Pending notifications before new ones are dropped
pub const NOTIFY_QUEUE_DEPTH: usize = 64;
