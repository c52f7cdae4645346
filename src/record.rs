use serde::{Deserialize, Serialize};

/// Stand-in for an attacker or team the listing leaves blank.
pub const PLACEHOLDER: &str = "-";

/// One defacement event as listed on the archive site.
///
/// `url` and `mirror` are always non-empty; `attacker` and `team` hold
/// [`PLACEHOLDER`] when the listing has nothing for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefacementRecord {
    #[serde(alias = "Date")]
    pub date: String,
    #[serde(alias = "Attacker")]
    pub attacker: String,
    #[serde(alias = "Team")]
    pub team: String,
    #[serde(alias = "URL")]
    pub url: String,
    #[serde(alias = "Mirror")]
    pub mirror: String,
}

impl DefacementRecord {
    /// Header row used by the CSV writer, in field order.
    pub const CSV_HEADER: [&'static str; 5] = ["Date", "Attacker", "Team", "URL", "Mirror"];

    pub fn csv_row(&self) -> [&str; 5] {
        [&self.date, &self.attacker, &self.team, &self.url, &self.mirror]
    }
}

/// Returns the trimmed value, or [`PLACEHOLDER`] when nothing is left.
pub fn or_placeholder(value: &str) -> String {
    let v = value.trim();
    if v.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        v.to_string()
    }
}
