//! Accumulate / compare / commit for signalling tables.
//!
//! Every table kind goes through the same steps: feed packets into a
//! candidate until it is complete, drop it if it decodes to the same
//! content as the committed table, otherwise replace the committed one.
//! Callers only ever see committed tables.

use tracing::{info, warn};

use crate::error::Result;
use crate::psi::section::{SectionBuffer, SectionReader};

pub trait PsiTable: Sized {
    const KIND: &'static str;

    fn decode(section: &SectionReader<'_>) -> Result<Self>;

    /// Content equality on decoded fields.
    fn is_same(&self, other: &Self) -> bool;
}

#[derive(Debug)]
pub struct TableSlot<T> {
    committed: Option<T>,
    candidate: SectionBuffer,
}

impl<T> Default for TableSlot<T> {
    fn default() -> Self {
        Self { committed: None, candidate: SectionBuffer::new() }
    }
}

impl<T: PsiTable + std::fmt::Debug> TableSlot<T> {
    pub fn committed(&self) -> Option<&T> {
        self.committed.as_ref()
    }

    pub fn has_candidate(&self) -> bool {
        !self.candidate.is_empty()
    }

    /// Feeds one packet. Returns the newly committed table when a section
    /// completed by this packet differs from the committed one.
    pub fn update(&mut self, packet: &[u8]) -> Option<&T> {
        let mut changed = false;
        for raw in self.candidate.push_packet(packet) {
            let table = match SectionReader::new(&raw).and_then(|sec| T::decode(&sec)) {
                Ok(table) => table,
                Err(e) => {
                    warn!(kind = T::KIND, error = %e, "discarding section");
                    continue;
                }
            };
            if self.committed.as_ref().is_some_and(|c| c.is_same(&table)) {
                continue;
            }
            info!(kind = T::KIND, "{} updated: {:?}", T::KIND, table);
            self.committed = Some(table);
            changed = true;
        }
        if changed { self.committed.as_ref() } else { None }
    }
}
