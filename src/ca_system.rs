//! Conditional-access systems, classified by the high byte of the CA id.

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CaSystem {
    Seca,
    Viaccess,
    Irdeto,
    Videoguard,
    #[default]
    Conax,
    Cryptoworks,
    Nagra,
}

impl CaSystem {
    pub const ALL: [CaSystem; 7] = [
        CaSystem::Seca,
        CaSystem::Viaccess,
        CaSystem::Irdeto,
        CaSystem::Videoguard,
        CaSystem::Conax,
        CaSystem::Cryptoworks,
        CaSystem::Nagra,
    ];

    pub fn from_ca_id(ca_id: u16) -> Option<Self> {
        match ca_id >> 8 {
            0x01 => Some(CaSystem::Seca),
            0x05 => Some(CaSystem::Viaccess),
            0x06 => Some(CaSystem::Irdeto),
            0x09 => Some(CaSystem::Videoguard),
            0x0B => Some(CaSystem::Conax),
            0x0D => Some(CaSystem::Cryptoworks),
            0x18 => Some(CaSystem::Nagra),
            _ => None,
        }
    }

    pub fn owns(self, ca_id: u16) -> bool {
        CaSystem::from_ca_id(ca_id) == Some(self)
    }

    pub fn name(self) -> &'static str {
        match self {
            CaSystem::Seca => "SECA",
            CaSystem::Viaccess => "VIACCESS",
            CaSystem::Irdeto => "IRDETO",
            CaSystem::Videoguard => "VIDEOGUARD",
            CaSystem::Conax => "CONAX",
            CaSystem::Cryptoworks => "CRYPTOWORKS",
            CaSystem::Nagra => "NAGRA",
        }
    }
}

impl fmt::Display for CaSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CaSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "CONNAX" is how the option was always spelled on the command line
        if s.eq_ignore_ascii_case("connax") {
            return Ok(CaSystem::Conax);
        }
        CaSystem::ALL
            .into_iter()
            .find(|sys| sys.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownCaSystem(s.to_string()))
    }
}
