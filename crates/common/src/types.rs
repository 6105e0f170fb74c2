//! Domain types shared across the service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Holiday record ────────────────────────────────────────────────────

/// Scope of a holiday: federal, state-wide, or municipal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolidayKind {
    National,
    State,
    City,
}

/// A single non-working day.
///
/// Two holidays with the same `date` are the same holiday for merge
/// purposes, regardless of `name` or `kind`; the first record seen for a
/// date wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: HolidayKind,
}

impl Holiday {
    pub fn new(date: NaiveDate, name: impl Into<String>, kind: HolidayKind) -> Self {
        Self {
            date,
            name: name.into(),
            kind,
        }
    }
}

// ── Cities ────────────────────────────────────────────────────────────

/// Canonical city key used for every cache, lookup, and coalescing
/// operation.
///
/// `City::parse` is the single normalization point: any alias spelling of
/// a supported city maps to the same variant before a key is built, so two
/// requests differing only by spelling can never produce two cache entries
/// or two concurrent resolutions. Unknown inputs map to `Brazil`, the
/// national-only branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum City {
    Salvador,
    RioDeJaneiro,
    SaoPaulo,
    Brazil,
}

impl City {
    /// Normalize a user-supplied city name to its canonical key.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "salvador" => City::Salvador,
            "rio-de-janeiro" | "rio" => City::RioDeJaneiro,
            "sao-paulo" | "sp" => City::SaoPaulo,
            _ => City::Brazil,
        }
    }

    /// Canonical lowercase identifier (cache-key form).
    pub fn key(&self) -> &'static str {
        match self {
            City::Salvador => "salvador",
            City::RioDeJaneiro => "rio-de-janeiro",
            City::SaoPaulo => "sao-paulo",
            City::Brazil => "brazil",
        }
    }

    /// State the city belongs to; `None` for the national-only branch.
    pub fn state(&self) -> Option<&'static str> {
        match self {
            City::Salvador => Some("Bahia"),
            City::RioDeJaneiro => Some("Rio de Janeiro"),
            City::SaoPaulo => Some("São Paulo"),
            City::Brazil => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            City::Salvador => "Salvador",
            City::RioDeJaneiro => "Rio de Janeiro",
            City::SaoPaulo => "São Paulo",
            City::Brazil => "Brasil",
        }
    }
}

/// Cache and coalescing key for one holiday resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
    pub city: City,
    pub year: i32,
}

impl ResolutionKey {
    pub fn new(city: City, year: i32) -> Self {
        Self { city, year }
    }
}

impl std::fmt::Display for ResolutionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.city.key(), self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_normalization() {
        assert_eq!(City::parse("rio"), City::RioDeJaneiro);
        assert_eq!(City::parse("Rio-De-Janeiro"), City::RioDeJaneiro);
        assert_eq!(City::parse("SP"), City::SaoPaulo);
        assert_eq!(City::parse("sao-paulo"), City::SaoPaulo);
        assert_eq!(City::parse("  Salvador "), City::Salvador);
        assert_eq!(City::parse("brasil"), City::Brazil);
        assert_eq!(City::parse("brazil"), City::Brazil);
    }

    #[test]
    fn test_unknown_city_falls_back_to_national_branch() {
        assert_eq!(City::parse("curitiba"), City::Brazil);
        assert_eq!(City::parse(""), City::Brazil);
        assert!(City::parse("curitiba").state().is_none());
    }

    #[test]
    fn test_resolution_key_is_alias_stable() {
        let a = ResolutionKey::new(City::parse("rio"), 2025);
        let b = ResolutionKey::new(City::parse("rio-de-janeiro"), 2025);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "rio-de-janeiro-2025");
    }

    #[test]
    fn test_holiday_kind_wire_format() {
        let h = Holiday::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            "Confraternização Universal",
            HolidayKind::National,
        );
        let json = serde_json::to_string(&h).unwrap();
        assert!(json.contains(r#""date":"2025-01-01""#));
        assert!(json.contains(r#""type":"national""#));

        let back: Holiday = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }
}
