use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Content locales supported by the platform.
///
/// Each locale owns one broadcast channel and one partition of the client-side
/// article cache. An article's translations in distinct locales are modeled as
/// independent records sharing an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Th,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Th => "th",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct LocaleParseError;

impl fmt::Display for LocaleParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unrecognized locale code")
    }
}

impl std::error::Error for LocaleParseError {}

impl FromStr for Locale {
    type Err = LocaleParseError;

    fn from_str(code: &str) -> Result<Locale, Self::Err> {
        match code.to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "th" => Ok(Locale::Th),
            _ => Err(LocaleParseError),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
