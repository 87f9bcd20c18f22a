use serde::{Deserialize, Serialize};
use std::fmt;

/// Indian cropping season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Kharif,
    Rabi,
    Zaid,
}

impl Season {
    pub fn name(&self) -> &'static str {
        match self {
            Season::Kharif => "Kharif",
            Season::Rabi => "Rabi",
            Season::Zaid => "Zaid",
        }
    }

    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            6..=10 => Some(Season::Kharif),
            11 | 12 | 1..=3 => Some(Season::Rabi),
            4 | 5 => Some(Season::Zaid),
            _ => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const MONTH_PREFIXES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Month number (1-12) from `"7"`, `"Jul"`, `"july"`, ...
pub fn month_number(month: &str) -> Option<u32> {
    let m = month.trim().to_lowercase();
    if let Ok(n) = m.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    MONTH_PREFIXES
        .iter()
        .position(|p| m.starts_with(p))
        .map(|i| i as u32 + 1)
}

pub fn infer_season(month: &str) -> Option<Season> {
    month_number(month).and_then(Season::from_month)
}
