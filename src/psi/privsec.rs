//! Private sections (EMM / ECM). Carried verbatim to the CAS, so their
//! content is the raw section bytes.

use bytes::Bytes;

use crate::psi::section::SectionBuffer;

#[derive(Debug, Clone)]
pub struct PrivateSection {
    pub pid:  u16,
    pub data: Bytes,
}

impl PrivateSection {
    pub fn table_id(&self) -> u8 {
        self.data[0]
    }

    /// Whole section length, header included (`section_length + 3`).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_same(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

/// Per message kind: the section being assembled and the last one handed on.
#[derive(Debug, Default)]
pub struct PrivateSectionState {
    in_progress: SectionBuffer,
    pub last_delivered: Option<PrivateSection>,
}

impl PrivateSectionState {
    /// Returns the sections this packet completes, in stream order.
    pub fn push_packet(&mut self, pid: u16, packet: &[u8]) -> Vec<PrivateSection> {
        self.in_progress
            .push_packet(packet)
            .into_iter()
            .map(|data| PrivateSection { pid, data })
            .collect()
    }

    pub fn is_duplicate(&self, section: &PrivateSection) -> bool {
        self.last_delivered
            .as_ref()
            .is_some_and(|last| last.is_same(section))
    }
}
