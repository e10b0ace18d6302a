pub mod imovirtual;
pub mod olx;

pub use imovirtual::Imovirtual;
pub use olx::Olx;

use chrono::{DateTime, FixedOffset};

/// Providers emit "2022-09-20T12:21:43+01:00" style timestamps.
pub(crate) fn parse_offset_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
}

/// Descriptions keep their text but lose the line-break markup.
pub(crate) fn strip_br(s: &str) -> String {
    s.replace("<br/>", "").replace("<br>", "")
}
