use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ErrorRepr;

pub type DateTime = chrono::DateTime<Utc>;
pub type Symbol = String;

/// When a fill happened: either a wall clock timestamp (live) or the index of
/// the bar it was filled on (backtest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeIndex {
    Bar(usize),
    Time(DateTime),
}

impl From<DateTime> for TimeIndex {
    fn from(time: DateTime) -> Self {
        TimeIndex::Time(time)
    }
}

impl From<usize> for TimeIndex {
    fn from(bar: usize) -> Self {
        TimeIndex::Bar(bar)
    }
}

pub(crate) fn check_symbol(sym: &str, who: &'static str) -> Result<(), ErrorRepr> {
    if sym.trim().is_empty() {
        return Err(ErrorRepr::EmptySymbol(who));
    }
    Ok(())
}

pub(crate) fn check_money(value: f64, what: &str) -> Result<(), ErrorRepr> {
    if !value.is_finite() || value < 0.0 {
        return Err(ErrorRepr::OutOfBounds(format!(
            "{} must be a finite non-negative amount, got {}",
            what, value
        )));
    }
    Ok(())
}

pub(crate) fn non_empty_symbol<'de, D>(deserializer: D) -> Result<Symbol, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Symbol::deserialize(deserializer)?;
    check_symbol(&s, "deserialized event").map_err(serde::de::Error::custom)?;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_index_json() {
        let idx: TimeIndex = serde_json::from_str("42").unwrap();
        assert_eq!(idx, TimeIndex::Bar(42));

        let time: DateTime = "2023-02-01T00:00:00Z".parse().unwrap();
        let idx: TimeIndex = serde_json::from_str("\"2023-02-01T00:00:00Z\"").unwrap();
        assert_eq!(idx, TimeIndex::Time(time));
        assert_eq!(TimeIndex::from(time), idx);
    }

    #[test]
    fn test_checks() {
        assert!(check_symbol("GOOG", "order").is_ok());
        assert!(matches!(
            check_symbol("  ", "order"),
            Err(ErrorRepr::EmptySymbol("order"))
        ));

        assert!(check_money(0.0, "fill cost").is_ok());
        assert!(check_money(-0.01, "fill cost").is_err());
        assert!(check_money(f64::NAN, "fill cost").is_err());
        assert!(check_money(f64::INFINITY, "fill cost").is_err());
    }
}
