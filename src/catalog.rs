//! Course catalog terms, course codes and page URLs.
//!
//! The catalog is organised by academic year. Summer and autumn belong to the
//! year that starts in the given calendar year; winter and spring belong to
//! the year that started in the previous one.

use crate::config::CatalogSettings;
use crate::error::{AssistantError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::debug;

/// Earliest year a term may name.
pub const MIN_YEAR: u16 = 2001;
/// Latest year a term may name.
pub const MAX_YEAR: u16 = 2098;

/// Academic quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quarter {
    Summer,
    Autumn,
    Winter,
    Spring,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [
        Quarter::Summer,
        Quarter::Autumn,
        Quarter::Winter,
        Quarter::Spring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quarter::Summer => "summer",
            Quarter::Autumn => "autumn",
            Quarter::Winter => "winter",
            Quarter::Spring => "spring",
        }
    }

    /// Whether the quarter opens the academic year (`2024-25` for 2024).
    fn starts_academic_year(&self) -> bool {
        matches!(self, Quarter::Summer | Quarter::Autumn)
    }
}

impl FromStr for Quarter {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "summer" => Ok(Quarter::Summer),
            "autumn" | "fall" => Ok(Quarter::Autumn),
            "winter" => Ok(Quarter::Winter),
            "spring" => Ok(Quarter::Spring),
            _ => Err(AssistantError::InvalidInput(format!(
                "Unknown quarter '{}'; expected summer, autumn, winter or spring",
                s
            ))),
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog year with an optional quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    year: u16,
    quarter: Option<Quarter>,
}

impl Term {
    /// Create a term, rejecting years outside `MIN_YEAR..=MAX_YEAR`.
    pub fn new(year: i64, quarter: Option<Quarter>) -> Result<Self> {
        if year < MIN_YEAR as i64 || year > MAX_YEAR as i64 {
            return Err(AssistantError::InvalidInput(format!(
                "Year {} is outside {}..={}",
                year, MIN_YEAR, MAX_YEAR
            )));
        }
        Ok(Self {
            year: year as u16,
            quarter,
        })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn quarter(&self) -> Option<Quarter> {
        self.quarter
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quarter {
            Some(q) => write!(f, "{} {}", q, self.year),
            None => write!(f, "{}", self.year),
        }
    }
}

fn mpcs_code_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^mpcs-\d{5}-\d$").expect("Invalid regex"))
}

/// A course code normalised for use as a URL path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseCode(String);

impl CourseCode {
    /// Normalise a code: whitespace runs become hyphens, letters are lowercased.
    ///
    /// `MPCS 51030 1` becomes `mpcs-51030-1`. Codes outside the
    /// `mpcs-NNNNN-N` shape are kept, since the catalog also lists
    /// cross-listed courses.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();

        if normalized.is_empty() {
            return Err(AssistantError::InvalidInput(
                "Course code must not be empty".to_string(),
            ));
        }
        if normalized.contains('/') || normalized.contains('?') || normalized.contains('#') {
            return Err(AssistantError::InvalidInput(format!(
                "Course code '{}' is not a valid path segment",
                raw
            )));
        }
        if !mpcs_code_pattern().is_match(&normalized) {
            debug!("Course code '{}' is not in mpcs-NNNNN-N form", normalized);
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds catalog page URLs.
#[derive(Debug, Clone)]
pub struct CatalogUrls {
    base_url: String,
    latest_catalog_year: u16,
}

impl CatalogUrls {
    pub fn new(base_url: &str, latest_catalog_year: u16) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            latest_catalog_year,
        }
    }

    pub fn from_settings(settings: &CatalogSettings) -> Self {
        Self::new(&settings.base_url, settings.latest_catalog_year)
    }

    /// Whole-year catalog page; the year is capped at the latest published one.
    pub fn whole_year(&self, year: u16) -> String {
        let year = year.min(self.latest_catalog_year).max(MIN_YEAR);
        format!("{}/{}-{}/courses", self.base_url, year, year - 1999)
    }

    /// Quarter catalog page for the academic year the quarter belongs to.
    pub fn quarter(&self, year: u16, quarter: Quarter) -> String {
        format!(
            "{}/{}/{}/courses",
            self.base_url,
            academic_year_segment(year, quarter),
            quarter
        )
    }

    /// Listing page for a term: whole-year without a quarter, quarter page otherwise.
    pub fn list_courses(&self, term: &Term) -> String {
        match term.quarter() {
            Some(quarter) => self.quarter(term.year(), quarter),
            None => self.whole_year(term.year()),
        }
    }

    /// Detail page of one course section in a quarter.
    pub fn course_detail(&self, code: &CourseCode, year: u16, quarter: Quarter) -> String {
        format!("{}/{}", self.quarter(year, quarter), code)
    }
}

impl Default for CatalogUrls {
    fn default() -> Self {
        Self::from_settings(&CatalogSettings::default())
    }
}

fn academic_year_segment(year: u16, quarter: Quarter) -> String {
    if quarter.starts_academic_year() {
        format!("{}-{}", year, year - 1999)
    } else {
        format!("{}-{}", year - 1, year - 2000)
    }
}
