use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::SecondaryDimension;

pub type Result<T> = std::result::Result<T, SettlementError>;

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("invalid agreement: {0}")]
    InvalidAgreement(String),
    #[error("dynamic agreement references rule table {0} but no table was supplied")]
    MissingRuleTable(String),
    #[error("agreement references rule table {expected}, got {actual}")]
    RuleTableMismatch { expected: String, actual: String },
    #[error("rule table {table_id} is bounded by {actual}, but this layer is bounded by {expected}")]
    DimensionMismatch {
        table_id: String,
        expected: SecondaryDimension,
        actual: SecondaryDimension,
    },
    #[error("rule table {table_id} has no tier for ratio {ratio} and {dimension} {secondary}")]
    UnmatchedTier {
        table_id: String,
        ratio: Decimal,
        dimension: SecondaryDimension,
        secondary: Decimal,
    },
    #[error("invalid rule table {table_id}: {reason}")]
    InvalidRuleTable { table_id: String, reason: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("membership {membership_id} is already settled for week starting {week_start}")]
    DuplicateSettlement {
        membership_id: String,
        week_start: NaiveDate,
    },
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("amount out of range while computing {step}")]
    Arithmetic { step: &'static str },
}

/// Boundary checks applied before stats or agreements reach the calculator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be between 0 and 100, got {value}")]
    PercentageOutOfRange { field: &'static str, value: Decimal },
    #[error("rake must not be negative, got {0}")]
    NegativeRake(Decimal),
}

impl SettlementError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Short machine-readable code, used by the report for failed entries.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAgreement(_) => "invalid_agreement",
            Self::MissingRuleTable(_) => "missing_rule_table",
            Self::RuleTableMismatch { .. } => "rule_table_mismatch",
            Self::DimensionMismatch { .. } => "dimension_mismatch",
            Self::UnmatchedTier { .. } => "unmatched_tier",
            Self::InvalidRuleTable { .. } => "invalid_rule_table",
            Self::Validation(_) => "validation",
            Self::DuplicateSettlement { .. } => "duplicate_settlement",
            Self::NotFound { .. } => "not_found",
            Self::Arithmetic { .. } => "arithmetic",
        }
    }
}
