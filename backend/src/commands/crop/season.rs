use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Kharif,
    Rabi,
    Summer,
    #[serde(rename = "Year-round")]
    YearRound,
}

impl Season {
    /// Sowing season for a calendar month (1-12).
    pub fn from_month(month: u32) -> Self {
        match month {
            6..=10 => Season::Kharif,
            4 | 5 => Season::Summer,
            _ => Season::Rabi,
        }
    }

    pub fn current() -> Self {
        Self::from_month(Local::now().month())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Kharif => "Kharif",
            Season::Rabi => "Rabi",
            Season::Summer => "Summer",
            Season::YearRound => "Year-round",
        }
    }

    /// Whether a crop catalogued for `crop_season` can be sown now.
    pub fn admits(&self, crop_season: &str) -> bool {
        crop_season == self.as_str() || crop_season == Season::YearRound.as_str()
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
