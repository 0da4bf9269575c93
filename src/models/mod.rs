pub mod agreement;
pub mod rule;
pub mod settlement;
pub mod stats;

pub use agreement::{
    AgentLink, AgreementConfig, AgreementMode, ClubProfile, Membership, RawAgreement,
};
pub use rule::{PriorityOrder, RatioDomain, RatioRule, SecondaryDimension};
pub use settlement::{
    Resolution, ResolutionSource, SettlementKey, SettlementRecord, SettlementResult,
};
pub use stats::WeeklyPlayStats;
