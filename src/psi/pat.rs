use crate::constants::TABLE_ID_PAT;
use crate::error::{Error, Result};
use crate::psi::section::SectionReader;
use crate::table::PsiTable;

/// ─────────── PAT ───────────
#[derive(Debug, Clone)]
pub struct PatSection {
    pub version:      u8,
    pub ts_id:        u16,
    pub programs:     Vec<PatEntry>,
}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatEntry {
    pub program_number: u16,
    pub pmt_pid:        u16,
}

pub fn parse_pat(sec: &SectionReader<'_>) -> Result<PatSection> {
    if sec.table_id != TABLE_ID_PAT { return Err(Error::MalformedSection("not PAT")); }

    let programs = sec.body
        .chunks_exact(4)
        .map(|e| PatEntry {
            program_number: u16::from_be_bytes([e[0], e[1]]),
            pmt_pid:        ((e[2] & 0x1F) as u16) << 8 | e[3] as u16,
        })
        .collect();
    Ok(PatSection{ version:sec.version, ts_id:sec.table_id_ext, programs })
}

impl PsiTable for PatSection {
    const KIND: &'static str = "PAT";

    fn decode(section: &SectionReader<'_>) -> Result<Self> {
        parse_pat(section)
    }

    fn is_same(&self, other: &Self) -> bool {
        self.ts_id == other.ts_id && self.programs == other.programs
    }
}
