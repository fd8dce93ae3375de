use bytes::Bytes;

use crate::ca_system::CaSystem;
use crate::constants::CA_DESCRIPTOR_TAG;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub tag:  u8,
    pub data: Bytes,
}

/// CA_descriptor payload: which CA system and on which pid its messages travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaDescriptor {
    pub ca_id: u16,
    pub pid:   u16,
}

impl Descriptor {
    pub fn ca(&self) -> Option<CaDescriptor> {
        if self.tag != CA_DESCRIPTOR_TAG || self.data.len() < 4 {
            return None;
        }
        Some(CaDescriptor {
            ca_id: u16::from_be_bytes([self.data[0], self.data[1]]),
            pid:   ((self.data[2] & 0x1F) as u16) << 8 | self.data[3] as u16,
        })
    }
}

/// Walks a descriptor loop; a descriptor running past the end stops the walk.
pub fn parse_descriptors(mut b: &[u8]) -> Vec<Descriptor> {
    let mut out = Vec::new();
    while b.len() >= 2 {
        let len = b[1] as usize;
        if 2 + len > b.len() { break; }
        out.push(Descriptor { tag: b[0], data: Bytes::copy_from_slice(&b[2..2 + len]) });
        b = &b[2 + len..];
    }
    out
}

/// First CA descriptor in `descriptors` owned by `system` with a usable pid.
pub fn find_ca<'a>(
    descriptors: impl IntoIterator<Item = &'a Descriptor>,
    system: CaSystem,
) -> Option<CaDescriptor> {
    descriptors
        .into_iter()
        .filter_map(Descriptor::ca)
        .find(|ca| system.owns(ca.ca_id) && ca.pid != 0)
}
