use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Sentinel written to the `Entity` column for movements not tied to a worker or vehicle.
pub const GENERAL_ENTITY: &str = "General";

const LEGACY_GENERAL_LABELS: &[&str] = &["general", "geral"];

/// Compares two human keys the way the roster and fleet do: trimmed, ASCII case-insensitive.
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Who a ledger movement is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EntityRef {
    #[default]
    General,
    Named(String),
}

impl EntityRef {
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.trim().is_empty() {
            EntityRef::General
        } else {
            EntityRef::Named(name.trim().to_string())
        }
    }

    /// Reads a persisted `Entity` cell; blank and legacy sentinels map to [`EntityRef::General`].
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || LEGACY_GENERAL_LABELS
                .iter()
                .any(|label| trimmed.eq_ignore_ascii_case(label))
        {
            EntityRef::General
        } else {
            EntityRef::Named(trimmed.to_string())
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            EntityRef::General => None,
            EntityRef::Named(name) => Some(name),
        }
    }

    pub fn refers_to(&self, name: &str) -> bool {
        self.as_name().map(|own| same_name(own, name)).unwrap_or(false)
    }

    pub fn is_general(&self) -> bool {
        matches!(self, EntityRef::General)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::General => f.write_str(GENERAL_ENTITY),
            EntityRef::Named(name) => f.write_str(name),
        }
    }
}

/// How a movement was settled. Only some table revisions carry this column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Card,
    Pix,
    Other(String),
}

impl PaymentMethod {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let method = match trimmed.to_ascii_lowercase().as_str() {
            "cash" | "dinheiro" => PaymentMethod::Cash,
            "transfer" | "transferencia" | "bank transfer" => PaymentMethod::Transfer,
            "card" | "credit card" | "cartao" => PaymentMethod::Card,
            "pix" => PaymentMethod::Pix,
            _ => PaymentMethod::Other(trimmed.to_string()),
        };
        Some(method)
    }

    pub fn label(&self) -> &str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Transfer => "Transfer",
            PaymentMethod::Card => "Card",
            PaymentMethod::Pix => "Pix",
            PaymentMethod::Other(label) => label,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Format used whenever a date is written back to disk.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parses the date layouts found in historical tables, including full timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Some(date);
    }
    for format in DATETIME_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(stamp.date());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_parse_maps_legacy_sentinels_to_general() {
        assert_eq!(EntityRef::parse(""), EntityRef::General);
        assert_eq!(EntityRef::parse("Geral"), EntityRef::General);
        assert_eq!(EntityRef::parse(" general "), EntityRef::General);
        assert_eq!(
            EntityRef::parse("Truck ABC-1234"),
            EntityRef::Named("Truck ABC-1234".into())
        );
    }

    #[test]
    fn refers_to_ignores_case_and_padding() {
        let entity = EntityRef::named("João");
        assert!(entity.refers_to(" João "));
        assert!(!EntityRef::General.refers_to("General"));
    }

    #[test]
    fn parse_date_accepts_timestamps_and_day_first() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_date("2024-03-09"), Some(expected));
        assert_eq!(parse_date("2024-03-09 14:22:05.123456"), Some(expected));
        assert_eq!(parse_date("09/03/2024"), Some(expected));
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn payment_method_round_trips_known_labels() {
        assert_eq!(PaymentMethod::parse("card"), Some(PaymentMethod::Card));
        assert_eq!(PaymentMethod::parse(""), None);
        assert_eq!(
            PaymentMethod::parse("Cheque").map(|m| m.label().to_string()),
            Some("Cheque".to_string())
        );
    }
}
