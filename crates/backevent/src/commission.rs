use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{data::check_money, errors::ErrorRepr};

/// Prices the broker fee of a single fill.
pub trait CommissionModel {
    /// `fill_cost` is the USD value of the holdings filled.
    fn commission(&self, quantity: u32, fill_cost: f64) -> f64;
}

/// Per-share fee schedule with a minimum per order, a cheaper marginal rate
/// above a volume threshold, and a cap expressed as a share of the fill value.
///
/// The defaults are the Interactive Brokers "US API Directed Orders" rates,
/// without exchange or ECN fees. Results are not rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Builder, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
#[serde(try_from = "ScheduleRepr")]
pub struct TieredCommission {
    #[builder(default = "1.3")]
    pub min_per_order: f64,
    /// Largest quantity still charged at `low_tier_rate` (inclusive).
    #[builder(default = "500")]
    pub tier_threshold: u32,
    #[builder(default = "0.013")]
    pub low_tier_rate: f64,
    #[builder(default = "0.008")]
    pub high_tier_rate: f64,
    #[builder(default = "0.005")]
    pub max_pct_of_value: f64,
}

impl Default for TieredCommission {
    fn default() -> Self {
        Self {
            min_per_order: 1.3,
            tier_threshold: 500,
            low_tier_rate: 0.013,
            high_tier_rate: 0.008,
            max_pct_of_value: 0.005,
        }
    }
}

/// Unchecked schedule as read from JSON; missing keys keep the defaults.
#[derive(Deserialize)]
#[serde(default)]
struct ScheduleRepr {
    min_per_order: f64,
    tier_threshold: u32,
    low_tier_rate: f64,
    high_tier_rate: f64,
    max_pct_of_value: f64,
}

impl Default for ScheduleRepr {
    fn default() -> Self {
        let d = TieredCommission::default();
        Self {
            min_per_order: d.min_per_order,
            tier_threshold: d.tier_threshold,
            low_tier_rate: d.low_tier_rate,
            high_tier_rate: d.high_tier_rate,
            max_pct_of_value: d.max_pct_of_value,
        }
    }
}

impl TryFrom<ScheduleRepr> for TieredCommission {
    type Error = ErrorRepr;

    fn try_from(r: ScheduleRepr) -> Result<Self, Self::Error> {
        let m = TieredCommission {
            min_per_order: r.min_per_order,
            tier_threshold: r.tier_threshold,
            low_tier_rate: r.low_tier_rate,
            high_tier_rate: r.high_tier_rate,
            max_pct_of_value: r.max_pct_of_value,
        };
        m.check()?;
        Ok(m)
    }
}

impl TieredCommissionBuilder {
    fn validate(&self) -> Result<(), String> {
        let rates = [
            ("min_per_order", self.min_per_order),
            ("low_tier_rate", self.low_tier_rate),
            ("high_tier_rate", self.high_tier_rate),
            ("max_pct_of_value", self.max_pct_of_value),
        ];
        for (name, value) in rates {
            if let Some(v) = value {
                check_money(v, name).map_err(|e| e.to_string())?;
            }
        }
        Ok(())
    }
}

impl TieredCommission {
    /// Every rate must be finite and non-negative, so no fill is priced
    /// below zero.
    pub fn check(&self) -> Result<(), ErrorRepr> {
        check_money(self.min_per_order, "min_per_order")?;
        check_money(self.low_tier_rate, "low_tier_rate")?;
        check_money(self.high_tier_rate, "high_tier_rate")?;
        check_money(self.max_pct_of_value, "max_pct_of_value")
    }

    fn rate_cost(&self, quantity: u32) -> f64 {
        let rate = if quantity <= self.tier_threshold {
            self.low_tier_rate
        } else {
            self.high_tier_rate
        };
        self.min_per_order.max(rate * quantity as f64)
    }

    fn cap(&self, quantity: u32, fill_cost: f64) -> f64 {
        self.max_pct_of_value * quantity as f64 * fill_cost
    }
}

impl CommissionModel for TieredCommission {
    fn commission(&self, quantity: u32, fill_cost: f64) -> f64 {
        self.rate_cost(quantity).min(self.cap(quantity, fill_cost))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cost {
    /// Fraction of the fill value.
    Ratio(f64),
    /// Flat fee per fill.
    Fixed(f64),
}

impl CommissionModel for Cost {
    fn commission(&self, _quantity: u32, fill_cost: f64) -> f64 {
        match *self {
            Cost::Ratio(r) => r * fill_cost,
            Cost::Fixed(f) => f,
        }
    }
}

/// Commission of a fill under the default [`TieredCommission`] schedule.
pub fn calculate_ib_commission(quantity: u32, fill_cost: f64) -> f64 {
    TieredCommission::default().commission(quantity, fill_cost)
}
