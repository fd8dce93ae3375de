//! Service and CA identifiers derived from committed tables for the
//! configured CA system.

use crate::ca_system::CaSystem;
use crate::psi::descriptor::find_ca;
use crate::psi::{CatSection, PatSection, PmtSection};
use crate::types::CaInfo;

#[derive(Debug, Clone, Copy)]
pub struct CaExtractor {
    system: CaSystem,
}

impl CaExtractor {
    pub fn new(system: CaSystem) -> Self {
        Self { system }
    }

    pub fn system(&self) -> CaSystem {
        self.system
    }

    /// `(service_id, pmt_pid)` of the last real program in the PAT.
    pub fn program(&self, pat: &PatSection) -> Option<(u16, u16)> {
        pat.programs
            .iter()
            .rev()
            .find(|p| p.pmt_pid != 0 && p.program_number != 0)
            .map(|p| (p.program_number, p.pmt_pid))
    }

    pub fn emm(&self, cat: &CatSection) -> Option<CaInfo> {
        find_ca(&cat.descriptors, self.system).map(|d| CaInfo { ca_id: d.ca_id, pid: d.pid })
    }

    pub fn ecm(&self, pmt: &PmtSection) -> Option<CaInfo> {
        find_ca(pmt.all_descriptors(), self.system).map(|d| CaInfo { ca_id: d.ca_id, pid: d.pid })
    }
}
