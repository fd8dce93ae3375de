use crate::constants::TABLE_ID_PMT;
use crate::error::{Error, Result};
use crate::psi::descriptor::{parse_descriptors, Descriptor};
use crate::psi::section::SectionReader;
use crate::table::PsiTable;

/// ─────────── PMT ───────────
#[derive(Debug, Clone)]
pub struct PmtSection {
    pub version:        u8,
    pub program_number: u16,
    pub pcr_pid:        u16,
    pub descriptors:    Vec<Descriptor>,
    pub streams:        Vec<StreamInfo>,
}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub stream_type:   u8,
    pub elementary_pid:u16,
    pub descriptors:   Vec<Descriptor>,
}

impl PmtSection {
    /// Program-level descriptors first, then each stream's in order.
    pub fn all_descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.descriptors
            .iter()
            .chain(self.streams.iter().flat_map(|s| s.descriptors.iter()))
    }
}

pub fn parse_pmt(sec: &SectionReader<'_>) -> Result<PmtSection> {
    if sec.table_id != TABLE_ID_PMT { return Err(Error::MalformedSection("not PMT")); }
    let b = sec.body;
    if b.len() < 4 { return Err(Error::MalformedSection("short PMT")); }

    /* ── fixed header inside the body ── */
    let pcr_pid       = ((b[0] & 0x1F) as u16) << 8 | b[1] as u16;
    let prog_info_len = ((b[2] & 0x0F) as usize) << 8 | b[3] as usize;
    if 4 + prog_info_len > b.len() { return Err(Error::MalformedSection("program_info overruns PMT")); }
    let descriptors   = parse_descriptors(&b[4..4 + prog_info_len]);
    let mut idx       = 4 + prog_info_len;

    /* ── ES loop ── */
    let mut streams = Vec::new();
    while idx + 5 <= b.len() {
        let stype = b[idx];
        let pid   = ((b[idx+1] & 0x1F) as u16) << 8 | b[idx+2] as u16;
        let eslen = ((b[idx+3] & 0x0F) as usize) << 8 | b[idx+4] as usize;
        let end   = (idx + 5 + eslen).min(b.len());
        streams.push(StreamInfo{ stream_type:stype,
                                 elementary_pid:pid,
                                 descriptors:parse_descriptors(&b[idx+5..end]) });
        idx += 5 + eslen;
    }

    Ok(PmtSection{ version:sec.version,
                   program_number:sec.table_id_ext,
                   pcr_pid,
                   descriptors,
                   streams })
}

impl PsiTable for PmtSection {
    const KIND: &'static str = "PMT";

    fn decode(section: &SectionReader<'_>) -> Result<Self> {
        parse_pmt(section)
    }

    fn is_same(&self, other: &Self) -> bool {
        self.program_number == other.program_number
            && self.pcr_pid == other.pcr_pid
            && self.descriptors == other.descriptors
            && self.streams == other.streams
    }
}
