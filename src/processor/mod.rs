//! Main packet processing logic: demux, table tracking and EMM/ECM delivery

use serde::Serialize;
use tracing::{info, trace, warn};

use crate::camd35::CasClient;
use crate::constants::{PID_CAT, PID_PAT, TS_PACKET_SIZE};
use crate::error::Result;
use crate::extract::CaExtractor;
use crate::notify::NotifyHandle;
use crate::packet::{self, TsHeader};
use crate::psi::{CatSection, PatSection, PmtSection, PrivateSection, PrivateSectionState};
use crate::table::TableSlot;
use crate::types::CaInfo;
use crate::util::hex_prefix;

/// Running totals for the session report
#[derive(Debug, Default, Clone, Serialize)]
pub struct SessionStats {
    pub packets: u64,
    pub emm_sent: u64,
    pub ecm_sent: u64,
    pub ecm_duplicates: u64,
    pub cw_ok: u64,
    pub cw_rejected: u64,
    pub delivery_failures: u64,
}

/// Decoding state for one TS feed
pub struct Session {
    extractor: CaExtractor,
    client: CasClient,
    notifier: Option<NotifyHandle>,

    pat: TableSlot<PatSection>,
    cat: TableSlot<CatSection>,
    pmt: TableSlot<PmtSection>,
    emm: PrivateSectionState,
    ecm: PrivateSectionState,

    pub service_id: Option<u16>,
    pub pmt_pid: Option<u16>,
    pub emm_info: Option<CaInfo>,
    pub ecm_info: Option<CaInfo>,
    pub ecm_counter: u16,
    pub stats: SessionStats,
}

impl Session {
    pub fn new(extractor: CaExtractor, client: CasClient) -> Self {
        Self {
            extractor,
            client,
            notifier: None,
            pat: TableSlot::default(),
            cat: TableSlot::default(),
            pmt: TableSlot::default(),
            emm: PrivateSectionState::default(),
            ecm: PrivateSectionState::default(),
            service_id: None,
            pmt_pid: None,
            emm_info: None,
            ecm_info: None,
            ecm_counter: 0,
            stats: SessionStats::default(),
        }
    }

    pub fn with_notifier(mut self, handle: NotifyHandle) -> Self {
        self.notifier = Some(handle);
        self
    }

    pub fn extractor(&self) -> &CaExtractor {
        &self.extractor
    }

    fn notify(&self, msg_id: &str, text: impl Into<String>) {
        if let Some(n) = &self.notifier {
            n.notify(msg_id, text);
        }
    }

    /// Processes every whole packet in `data`; a trailing partial packet is
    /// ignored. Per-unit failures are logged, fatal ones are returned.
    pub fn process_packets(&mut self, data: &[u8]) -> Result<()> {
        for packet in data.chunks_exact(TS_PACKET_SIZE) {
            let result = self.process_packet(packet);
            self.absorb(result)?;
        }
        Ok(())
    }

    /// Counts and logs a failed delivery; only fatal errors pass through.
    fn absorb(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Err(e) if !e.is_fatal() => {
                self.stats.delivery_failures += 1;
                warn!("delivery failed: {e}");
                Ok(())
            }
            other => other,
        }
    }

    /// Routes one packet through every handler, in fixed order.
    pub fn process_packet(&mut self, packet: &[u8]) -> Result<()> {
        if TsHeader::parse(packet).is_none() {
            trace!("bad sync, packet skipped");
            return Ok(());
        }
        self.stats.packets += 1;
        let pid = packet::pid(packet);

        self.process_pat(pid, packet);
        self.process_cat(pid, packet);
        self.process_pmt(pid, packet);
        self.process_emm(pid, packet)?;
        self.process_ecm(pid, packet)
    }

    fn process_pat(&mut self, pid: u16, packet: &[u8]) {
        if pid != PID_PAT {
            return;
        }
        let Some(pat) = self.pat.update(packet) else { return };
        if let Some((service_id, pmt_pid)) = self.extractor.program(pat) {
            self.service_id = Some(service_id);
            self.pmt_pid = Some(pmt_pid);
        }
    }

    fn process_cat(&mut self, pid: u16, packet: &[u8]) {
        if pid != PID_CAT {
            return;
        }
        let Some(cat) = self.cat.update(packet) else { return };
        if let Some(info) = self.extractor.emm(cat) {
            self.emm_info = Some(info);
        }
    }

    fn process_pmt(&mut self, pid: u16, packet: &[u8]) {
        if pid == 0 || Some(pid) != self.pmt_pid {
            return;
        }
        let Some(pmt) = self.pmt.update(packet) else { return };
        // ECM identifiers are taken from the first PMT that yields them only
        if self.ecm_info.is_some() {
            return;
        }
        let ecm = self.extractor.ecm(pmt);
        let sys = self.extractor.system();
        let emm = self.emm_info.unwrap_or(CaInfo { ca_id: 0, pid: 0 });
        info!("{sys} Service : 0x{:04x}", self.service_id.unwrap_or(0));
        info!("{sys} CA_id   : 0x{:04x}", emm.ca_id);
        info!("{sys} EMM pid : 0x{:04x}", emm.pid);
        info!("{sys} ECM pid : 0x{:04x}", ecm.map_or(0, |e| e.pid));

        let Some(ecm) = ecm else {
            warn!("PMT carries no {sys} ECM descriptor");
            return;
        };
        self.ecm_info = Some(ecm);
        self.notify("CA_INFO", format!(
            "{sys} service 0x{:04x} ECM CA_id 0x{:04x} pid 0x{:04x}",
            self.service_id.unwrap_or(0), ecm.ca_id, ecm.pid,
        ));
    }

    fn process_emm(&mut self, pid: u16, packet: &[u8]) -> Result<()> {
        let Some(emm) = self.emm_info else { return Ok(()) };
        if emm.pid == 0 || emm.pid != pid {
            return Ok(());
        }
        for section in self.emm.push_packet(pid, packet) {
            let result = self.deliver_emm(emm, section);
            self.absorb(result)?;
        }
        Ok(())
    }

    fn deliver_emm(&mut self, emm: CaInfo, section: PrivateSection) -> Result<()> {
        self.client.send_emm(emm.ca_id, &section.data)?;
        self.stats.emm_sent += 1;
        info!("EMM | {}", summary(emm.ca_id, &section, &hex_prefix(&section.data, 16)));
        self.emm.last_delivered = Some(section);
        Ok(())
    }

    fn process_ecm(&mut self, pid: u16, packet: &[u8]) -> Result<()> {
        let Some(ecm) = self.ecm_info else { return Ok(()) };
        if ecm.pid == 0 || ecm.pid != pid {
            return Ok(());
        }
        for section in self.ecm.push_packet(pid, packet) {
            let result = self.deliver_ecm(ecm, section);
            self.absorb(result)?;
        }
        Ok(())
    }

    fn deliver_ecm(&mut self, ecm: CaInfo, section: PrivateSection) -> Result<()> {
        if self.ecm.is_duplicate(&section) {
            self.stats.ecm_duplicates += 1;
            info!("ECM | {}", summary(ecm.ca_id, &section, "--duplicate--"));
            self.ecm.last_delivered = Some(section);
            return Ok(());
        }

        let idx = self.ecm_counter;
        let answer = self.client.send_ecm(self.service_id.unwrap_or(0), ecm.ca_id, idx, &section.data)?;
        self.ecm_counter = self.ecm_counter.wrapping_add(1);
        self.stats.ecm_sent += 1;
        info!("ECM | {}", summary(ecm.ca_id, &section, &hex_prefix(&section.data, 16)));

        match answer {
            Some(Ok(cw)) => {
                self.stats.cw_ok += 1;
                if cw.idx != idx {
                    warn!(expected = idx, got = cw.idx, "CW answers another request");
                }
                self.notify("CODE_WORD_OK", format!("Control word for idx 0x{:04x}", cw.idx));
            }
            Some(Err(e)) => {
                self.stats.cw_rejected += 1;
                self.notify("CODE_WORD_REJECTED", e.to_string());
            }
            None => {}
        }
        self.ecm.last_delivered = Some(section);
        Ok(())
    }
}

fn summary(ca_id: u16, section: &PrivateSection, data: &str) -> String {
    format!(
        "CAID: 0x{:04x} PID 0x{:04x} Table: 0x{:02x} Length: {:3} Data: {}..",
        ca_id,
        section.pid,
        section.table_id(),
        section.len(),
        data,
    )
}
