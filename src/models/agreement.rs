use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::validation::validate_percentage;
use crate::error::{Result, SettlementError};

/// How the percentage for one relationship (Club→Platform or Platform→Player)
/// is determined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AgreementConfig {
    Fixed { percentage: Decimal },
    Dynamic { rule_table_id: String },
}

impl AgreementConfig {
    pub fn fixed(percentage: Decimal) -> Self {
        AgreementConfig::Fixed { percentage }
    }

    pub fn dynamic(rule_table_id: impl Into<String>) -> Self {
        AgreementConfig::Dynamic {
            rule_table_id: rule_table_id.into(),
        }
    }

    pub fn mode(&self) -> AgreementMode {
        match self {
            AgreementConfig::Fixed { .. } => AgreementMode::Fixed,
            AgreementConfig::Dynamic { .. } => AgreementMode::Dynamic,
        }
    }

    pub fn rule_table_id(&self) -> Option<&str> {
        match self {
            AgreementConfig::Fixed { .. } => None,
            AgreementConfig::Dynamic { rule_table_id } => Some(rule_table_id),
        }
    }
}

impl fmt::Display for AgreementConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgreementConfig::Fixed { percentage } => write!(f, "fixed {}%", percentage),
            AgreementConfig::Dynamic { rule_table_id } => write!(f, "dynamic ({})", rule_table_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementMode {
    Fixed,
    Dynamic,
}

impl fmt::Display for AgreementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgreementMode::Fixed => write!(f, "fixed"),
            AgreementMode::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Storage shape of an agreement: a mode column plus two nullable columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAgreement {
    pub mode: AgreementMode,
    #[serde(default)]
    pub fixed_percentage: Option<Decimal>,
    #[serde(default)]
    pub rule_table_id: Option<String>,
}

impl RawAgreement {
    pub fn fixed(percentage: Decimal) -> Self {
        Self {
            mode: AgreementMode::Fixed,
            fixed_percentage: Some(percentage),
            rule_table_id: None,
        }
    }

    pub fn dynamic(rule_table_id: impl Into<String>) -> Self {
        Self {
            mode: AgreementMode::Dynamic,
            fixed_percentage: None,
            rule_table_id: Some(rule_table_id.into()),
        }
    }
}

impl TryFrom<RawAgreement> for AgreementConfig {
    type Error = SettlementError;

    fn try_from(raw: RawAgreement) -> Result<Self> {
        match (raw.mode, raw.fixed_percentage, raw.rule_table_id) {
            (AgreementMode::Fixed, Some(percentage), None) => {
                validate_percentage(percentage, "fixed_percentage")?;
                Ok(AgreementConfig::Fixed { percentage })
            }
            (AgreementMode::Fixed, None, _) => Err(SettlementError::InvalidAgreement(
                "fixed mode without a percentage".to_string(),
            )),
            (AgreementMode::Fixed, Some(_), Some(id)) => Err(SettlementError::InvalidAgreement(
                format!("fixed mode must not reference rule table {}", id),
            )),
            (AgreementMode::Dynamic, None, Some(id)) if !id.trim().is_empty() => {
                Ok(AgreementConfig::Dynamic { rule_table_id: id })
            }
            (AgreementMode::Dynamic, Some(p), Some(_)) => Err(SettlementError::InvalidAgreement(
                format!("dynamic mode must not carry a fixed percentage ({})", p),
            )),
            (AgreementMode::Dynamic, _, _) => Err(SettlementError::InvalidAgreement(
                "dynamic mode without a rule table reference".to_string(),
            )),
        }
    }
}

/// A club's two agreement layers plus its action split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubProfile {
    pub club_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub action_percentage: Option<Decimal>,
    /// Club→Platform layer.
    pub platform_agreement: RawAgreement,
    /// Default Platform→Player layer inherited by memberships.
    pub player_agreement: RawAgreement,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl ClubProfile {
    pub fn platform_agreement(&self) -> Result<AgreementConfig> {
        self.platform_agreement.clone().try_into()
    }

    pub fn default_player_agreement(&self) -> Result<AgreementConfig> {
        self.player_agreement.clone().try_into()
    }

    pub fn action_percentage_or(&self, default: Decimal) -> Decimal {
        self.action_percentage.unwrap_or(default)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentLink {
    pub agent_id: String,
    pub commission_percentage: Decimal,
}

/// A player's membership in one club.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub membership_id: String,
    pub club_id: String,
    pub player_id: String,
    #[serde(default)]
    pub custom_agreement: bool,
    #[serde(default)]
    pub agreement: Option<RawAgreement>,
    #[serde(default)]
    pub agent: Option<AgentLink>,
}

impl Membership {
    /// The Platform→Player agreement that applies to this membership: its own
    /// when `custom_agreement` is set, the club default otherwise.
    pub fn effective_player_agreement(&self, club: &ClubProfile) -> Result<AgreementConfig> {
        if !self.custom_agreement {
            return club.default_player_agreement();
        }
        match &self.agreement {
            Some(raw) => raw.clone().try_into(),
            None => Err(SettlementError::InvalidAgreement(format!(
                "membership {} is flagged custom but has no agreement",
                self.membership_id
            ))),
        }
    }

    pub fn agent_commission(&self) -> Option<Decimal> {
        self.agent.as_ref().map(|a| a.commission_percentage)
    }
}
