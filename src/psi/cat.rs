use crate::constants::TABLE_ID_CAT;
use crate::error::{Error, Result};
use crate::psi::descriptor::{parse_descriptors, Descriptor};
use crate::psi::section::SectionReader;
use crate::table::PsiTable;

#[derive(Debug, Clone)]
pub struct CatSection {
    pub version: u8,
    pub descriptors: Vec<Descriptor>,
}

pub fn parse_cat(sec: &SectionReader<'_>) -> Result<CatSection> {
    if sec.table_id != TABLE_ID_CAT {
        return Err(Error::MalformedSection("not CAT"));
    }
    Ok(CatSection { version: sec.version, descriptors: parse_descriptors(sec.body) })
}

impl PsiTable for CatSection {
    const KIND: &'static str = "CAT";

    fn decode(section: &SectionReader<'_>) -> Result<Self> {
        parse_cat(section)
    }

    fn is_same(&self, other: &Self) -> bool {
        self.descriptors == other.descriptors
    }
}
