use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid thresholds: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid threshold {name}: {reason}")]
    OutOfRange { name: &'static str, reason: &'static str },
}

/// Cut-offs used when choosing the weekly action and building the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewThresholds {
    /// A card above this utilization triggers a pay-down action.
    pub card_utilization_alert_pct: Decimal,
    /// Utilization the pay-down action aims for.
    pub card_utilization_target_pct: Decimal,
    /// Fraction of the expected straight-line progress a goal must reach.
    pub goal_pace_tolerance: Decimal,
    /// Prior weeks averaged for the spending baseline.
    pub spending_window_weeks: usize,
    /// How far above the baseline weekly spending may go before it is a spike.
    pub spending_spike_pct: Decimal,
    pub emergency_fund_months: Decimal,
    /// Share of monthly expenses suggested as a weekly savings transfer.
    pub emergency_transfer_pct: Decimal,
    pub upcoming_bill_days: u32,
}

impl Default for ReviewThresholds {
    fn default() -> Self {
        Self {
            card_utilization_alert_pct: Decimal::from(75),
            card_utilization_target_pct: Decimal::from(30),
            goal_pace_tolerance: Decimal::new(8, 1),
            spending_window_weeks: 4,
            spending_spike_pct: Decimal::from(25),
            emergency_fund_months: Decimal::from(3),
            emergency_transfer_pct: Decimal::from(25),
            upcoming_bill_days: 30,
        }
    }
}

impl ReviewThresholds {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let thresholds: ReviewThresholds = toml::from_str(s)?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spending_window_weeks == 0 {
            return Err(ConfigError::OutOfRange {
                name: "spending_window_weeks",
                reason: "must be at least 1",
            });
        }
        if self.card_utilization_target_pct >= self.card_utilization_alert_pct {
            return Err(ConfigError::OutOfRange {
                name: "card_utilization_target_pct",
                reason: "must be below card_utilization_alert_pct",
            });
        }
        if self.goal_pace_tolerance < Decimal::ZERO || self.goal_pace_tolerance > Decimal::ONE {
            return Err(ConfigError::OutOfRange {
                name: "goal_pace_tolerance",
                reason: "must be between 0 and 1",
            });
        }
        Ok(())
    }
}
