//! JSON summary of a decrypt session

use serde::Serialize;

use crate::ca_system::CaSystem;
use crate::processor::{Session, SessionStats};
use crate::types::CaInfo;

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub ts_time: String,
    pub ca_system: CaSystem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmt_pid: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emm: Option<CaInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecm: Option<CaInfo>,
    pub stats: SessionStats,
}

impl SessionReport {
    pub fn from_session(session: &Session) -> Self {
        Self {
            ts_time: chrono::Utc::now().to_rfc3339(),
            ca_system: session.extractor().system(),
            service_id: session.service_id,
            pmt_pid: session.pmt_pid,
            emm: session.emm_info,
            ecm: session.ecm_info,
            stats: session.stats.clone(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{\"error\": \"JSON serialization failed\"}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omits_unknown_identifiers() {
        let report = SessionReport {
            ts_time: "2011-01-01T00:00:00+00:00".into(),
            ca_system: CaSystem::Conax,
            service_id: Some(100),
            pmt_pid: None,
            emm: Some(CaInfo { ca_id: 0x0B00, pid: 0x30 }),
            ecm: None,
            stats: SessionStats { packets: 7, ..Default::default() },
        };
        let v: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(v["ca_system"], "CONAX");
        assert_eq!(v["service_id"], 100);
        assert!(v.get("pmt_pid").is_none());
        assert_eq!(v["emm"]["pid"], 0x30);
        assert_eq!(v["stats"]["packets"], 7);
    }
}
