pub mod cat;
pub mod descriptor;
pub mod pat;
pub mod pmt;
pub mod privsec;
pub mod section;

pub use cat::{parse_cat, CatSection};
pub use descriptor::{CaDescriptor, Descriptor};
pub use pat::{parse_pat, PatEntry, PatSection};
pub use pmt::{parse_pmt, PmtSection, StreamInfo};
pub use privsec::{PrivateSection, PrivateSectionState};
pub use section::{SectionBuffer, SectionReader};
