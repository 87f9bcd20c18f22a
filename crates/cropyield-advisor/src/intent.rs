use serde::{Deserialize, Serialize};
use std::fmt;

/// What a farmer asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Irrigation,
    Fertilizer,
    Pest,
    Sowing,
    Yield,
    Rainfall,
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Intent::Irrigation,
        Intent::Fertilizer,
        Intent::Pest,
        Intent::Sowing,
        Intent::Yield,
        Intent::Rainfall,
    ];

    /// Parse a request tag, case-insensitively. Unknown tags fall back to
    /// [`Intent::Irrigation`].
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        Self::ALL
            .into_iter()
            .find(|i| i.name().eq_ignore_ascii_case(tag))
            .unwrap_or(Intent::Irrigation)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Intent::Irrigation => "irrigation",
            Intent::Fertilizer => "fertilizer",
            Intent::Pest => "pest",
            Intent::Sowing => "sowing",
            Intent::Yield => "yield",
            Intent::Rainfall => "rainfall",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reply language. Unknown codes fall back to English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Mr,
}

impl Language {
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "hi" => Language::Hi,
            "mr" => Language::Mr,
            _ => Language::En,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Mr => "mr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
