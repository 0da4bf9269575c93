use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which volume measure a rule table bounds its tiers by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryDimension {
    HandsPlayed,
    RakeVolume,
}

impl SecondaryDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecondaryDimension::HandsPlayed => "hands",
            SecondaryDimension::RakeVolume => "rake",
        }
    }
}

impl fmt::Display for SecondaryDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Evaluation order of a table's tiers by `priority`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityOrder {
    Ascending,
    Descending,
}

impl fmt::Display for PriorityOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityOrder::Ascending => write!(f, "ascending"),
            PriorityOrder::Descending => write!(f, "descending"),
        }
    }
}

/// Closed interval a table clamps observed ratios into before lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioDomain {
    pub min: Decimal,
    pub max: Decimal,
}

impl RatioDomain {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// The `[-1, 1]` domain most loss/win ratio tables are authored over.
    pub fn unit() -> Self {
        Self::new(Decimal::NEGATIVE_ONE, Decimal::ONE)
    }

    pub fn clamp(&self, ratio: Decimal) -> Decimal {
        ratio.max(self.min).min(self.max)
    }
}

/// One tier of a rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRule {
    pub ratio_min: Decimal,
    #[serde(default)]
    pub ratio_max: Option<Decimal>,
    #[serde(default)]
    pub secondary_min: Decimal,
    #[serde(default)]
    pub secondary_max: Option<Decimal>,
    pub percentage: Decimal,
    #[serde(default)]
    pub priority: i32,
}

impl RatioRule {
    pub fn new(ratio_min: Decimal, ratio_max: Option<Decimal>, percentage: Decimal) -> Self {
        Self {
            ratio_min,
            ratio_max,
            secondary_min: Decimal::ZERO,
            secondary_max: None,
            percentage,
            priority: 0,
        }
    }

    pub fn with_secondary(mut self, min: Decimal, max: Option<Decimal>) -> Self {
        self.secondary_min = min;
        self.secondary_max = max;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Lower bounds inclusive, upper bounds exclusive, `None` unbounded.
    pub fn matches(&self, ratio: Decimal, secondary: Decimal) -> bool {
        self.contains_ratio(ratio)
            && secondary >= self.secondary_min
            && self.secondary_max.map_or(true, |max| secondary < max)
    }

    pub fn contains_ratio(&self, ratio: Decimal) -> bool {
        ratio >= self.ratio_min && self.ratio_max.map_or(true, |max| ratio < max)
    }
}

impl fmt::Display for RatioRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let upper = |v: Option<Decimal>| v.map_or_else(|| "∞".to_string(), |m| m.to_string());
        write!(
            f,
            "[{}, {}) x [{}, {}) -> {}% (p{})",
            self.ratio_min,
            upper(self.ratio_max),
            self.secondary_min,
            upper(self.secondary_max),
            self.percentage,
            self.priority
        )
    }
}
