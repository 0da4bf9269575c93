use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::error::{Result, SettlementError};
use crate::models::{
    PriorityOrder, RatioDomain, RatioRule, Resolution, ResolutionSource, SecondaryDimension,
};

/// Problems found when authoring a table. Structural issues always block.
/// Coverage issues block under `Coverage::Required` and are only logged under
/// `Coverage::Advisory`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum TableIssue {
    NoRules,
    PercentageOutOfRange { index: usize, percentage: Decimal },
    EmptyRatioRange { index: usize },
    EmptySecondaryRange { index: usize },
    InvertedDomain { min: Decimal, max: Decimal },
    /// Ratios from `from` up to `to` (`None` = unbounded) have no tier at zero volume.
    CoverageGap { from: Decimal, to: Option<Decimal> },
    /// Unclamped table whose lowest tier starts at `lowest`; anything below is unmatched.
    OpenLowerBound { lowest: Decimal },
}

impl TableIssue {
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            TableIssue::PercentageOutOfRange { .. }
                | TableIssue::EmptyRatioRange { .. }
                | TableIssue::EmptySecondaryRange { .. }
                | TableIssue::InvertedDomain { .. }
        )
    }

    pub fn is_coverage(&self) -> bool {
        matches!(
            self,
            TableIssue::NoRules
                | TableIssue::CoverageGap { .. }
                | TableIssue::OpenLowerBound { .. }
        )
    }

    pub fn blocks(&self, coverage: Coverage) -> bool {
        self.is_blocking() || (coverage == Coverage::Required && self.is_coverage())
    }
}

/// Whether a rule set must cover the whole ratio domain to be accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    /// Every ratio must land in a tier at zero secondary volume. Unclamped
    /// tables reach down with a `Decimal::MIN` lower bound.
    #[default]
    Required,
    /// Gaps are logged and returned; lookups inside them resolve unmatched.
    Advisory,
}

impl fmt::Display for TableIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableIssue::NoRules => write!(f, "table has no rules"),
            TableIssue::PercentageOutOfRange { index, percentage } => {
                write!(f, "rule #{} percentage {} outside 0..=100", index, percentage)
            }
            TableIssue::EmptyRatioRange { index } => {
                write!(f, "rule #{} ratio range is empty", index)
            }
            TableIssue::EmptySecondaryRange { index } => {
                write!(f, "rule #{} secondary range is empty", index)
            }
            TableIssue::InvertedDomain { min, max } => {
                write!(f, "ratio domain [{}, {}] is inverted", min, max)
            }
            TableIssue::CoverageGap { from, to: Some(to) } => {
                write!(f, "no tier covers ratios {}..{}", from, to)
            }
            TableIssue::CoverageGap { from, to: None } => {
                write!(f, "no tier covers ratios from {} upward", from)
            }
            TableIssue::OpenLowerBound { lowest } => {
                write!(f, "unclamped table starts at ratio {}", lowest)
            }
        }
    }
}

/// An ordered set of tiers shared by every agreement that references it.
///
/// The secondary dimension, evaluation order and optional ratio clamp belong to
/// the table, so the same `RatioRule` shape serves both agreement layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub dimension: SecondaryDimension,
    pub priority_order: PriorityOrder,
    #[serde(default)]
    pub ratio_domain: Option<RatioDomain>,
    #[serde(default)]
    rules: Vec<RatioRule>,
}

impl RuleTable {
    pub fn new(
        id: impl Into<String>,
        dimension: SecondaryDimension,
        priority_order: PriorityOrder,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            dimension,
            priority_order,
            ratio_domain: None,
            rules: Vec::new(),
        }
    }

    /// Club→Platform table: bounded by rake volume, highest priority first.
    pub fn club(id: impl Into<String>) -> Self {
        Self::new(id, SecondaryDimension::RakeVolume, PriorityOrder::Descending)
    }

    /// Platform→Player table: bounded by hands played, lowest priority first.
    pub fn player(id: impl Into<String>) -> Self {
        Self::new(id, SecondaryDimension::HandsPlayed, PriorityOrder::Ascending)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_domain(mut self, domain: RatioDomain) -> Self {
        self.ratio_domain = Some(domain);
        self
    }

    pub fn with_order(mut self, order: PriorityOrder) -> Self {
        self.priority_order = order;
        self
    }

    pub fn with_rules(self, rules: Vec<RatioRule>) -> Result<Self> {
        self.with_rules_under(rules, Coverage::Required)
    }

    /// Draft tables and fixtures that deliberately leave ratios unmatched.
    pub fn with_rules_allowing_gaps(self, rules: Vec<RatioRule>) -> Result<Self> {
        self.with_rules_under(rules, Coverage::Advisory)
    }

    fn with_rules_under(mut self, rules: Vec<RatioRule>, coverage: Coverage) -> Result<Self> {
        self.replace_all_rules(rules, coverage)?;
        Ok(self)
    }

    pub fn rules(&self) -> &[RatioRule] {
        &self.rules
    }

    pub fn clamp_ratio(&self, ratio: Decimal) -> Decimal {
        match &self.ratio_domain {
            Some(domain) => domain.clamp(ratio),
            None => ratio,
        }
    }

    /// Rules in evaluation order, paired with their authored index.
    /// Equal priorities keep authored order.
    pub fn ordered(&self) -> Vec<(usize, &RatioRule)> {
        let mut out: Vec<(usize, &RatioRule)> = self.rules.iter().enumerate().collect();
        match self.priority_order {
            PriorityOrder::Ascending => out.sort_by(|a, b| a.1.priority.cmp(&b.1.priority)),
            PriorityOrder::Descending => out.sort_by(|a, b| b.1.priority.cmp(&a.1.priority)),
        }
        out
    }

    /// First tier in priority order containing the (clamped) ratio and the
    /// secondary value. Falls back to an unmatched 0%.
    pub fn lookup(&self, ratio: Decimal, secondary: Decimal) -> Resolution {
        let ratio = self.clamp_ratio(ratio);
        self.ordered()
            .into_iter()
            .find(|(_, rule)| rule.matches(ratio, secondary))
            .map(|(index, rule)| Resolution {
                percentage: rule.percentage.round_dp(2),
                source: ResolutionSource::Tier {
                    index,
                    priority: rule.priority,
                },
            })
            .unwrap_or_else(Resolution::unmatched)
    }

    pub fn validate(&self) -> Vec<TableIssue> {
        let mut issues = Vec::new();

        if let Some(domain) = &self.ratio_domain {
            if domain.min > domain.max {
                issues.push(TableIssue::InvertedDomain {
                    min: domain.min,
                    max: domain.max,
                });
            }
        }

        if self.rules.is_empty() {
            issues.push(TableIssue::NoRules);
            return issues;
        }

        for (index, rule) in self.rules.iter().enumerate() {
            if rule.percentage < Decimal::ZERO || rule.percentage > Decimal::ONE_HUNDRED {
                issues.push(TableIssue::PercentageOutOfRange {
                    index,
                    percentage: rule.percentage,
                });
            }
            if rule.ratio_max.map_or(false, |max| max <= rule.ratio_min) {
                issues.push(TableIssue::EmptyRatioRange { index });
            }
            if rule.secondary_max.map_or(false, |max| max <= rule.secondary_min) {
                issues.push(TableIssue::EmptySecondaryRange { index });
            }
        }

        if issues.iter().any(TableIssue::is_blocking) {
            return issues;
        }

        issues.extend(self.coverage_issues());
        issues
    }

    /// Sweeps the ratio axis using the tiers that apply at zero secondary volume.
    fn coverage_issues(&self) -> Vec<TableIssue> {
        let mut spans: Vec<(Decimal, Option<Decimal>)> = self
            .rules
            .iter()
            .filter(|r| {
                r.secondary_min <= Decimal::ZERO
                    && r.secondary_max.map_or(true, |max| max > Decimal::ZERO)
            })
            .map(|r| (r.ratio_min, r.ratio_max))
            .collect();
        spans.sort_by(|a, b| a.0.cmp(&b.0));

        let mut issues = Vec::new();
        let (start, end) = match (&self.ratio_domain, spans.first()) {
            (Some(domain), _) => (domain.min, Some(domain.max)),
            (None, Some(first)) => {
                if first.0 > Decimal::MIN {
                    issues.push(TableIssue::OpenLowerBound { lowest: first.0 });
                }
                (first.0, None)
            }
            (None, None) => {
                issues.push(TableIssue::CoverageGap {
                    from: Decimal::MIN,
                    to: None,
                });
                return issues;
            }
        };

        let mut cursor = start;
        let mut open_ended = false;
        for (lo, hi) in spans {
            if end.map_or(false, |e| cursor > e) {
                break;
            }
            if lo > cursor {
                let to = match end {
                    Some(e) if lo > e => e,
                    _ => lo,
                };
                issues.push(TableIssue::CoverageGap {
                    from: cursor,
                    to: Some(to),
                });
            }
            match hi {
                None => {
                    open_ended = true;
                    break;
                }
                Some(h) if h > cursor => cursor = h,
                Some(_) => {}
            }
        }

        if !open_ended {
            match end {
                Some(e) if cursor <= e => issues.push(TableIssue::CoverageGap {
                    from: cursor,
                    to: Some(e),
                }),
                None => issues.push(TableIssue::CoverageGap {
                    from: cursor,
                    to: None,
                }),
                Some(_) => {}
            }
        }

        issues
    }

    /// Swaps in a whole new rule set. Nothing changes when any issue blocks
    /// under `coverage`; the remaining warnings are logged and returned.
    pub fn replace_all_rules(
        &mut self,
        rules: Vec<RatioRule>,
        coverage: Coverage,
    ) -> Result<Vec<TableIssue>> {
        let candidate = RuleTable {
            rules,
            ..self.clone_header()
        };
        let issues = candidate.validate();

        let blocking: Vec<String> = issues
            .iter()
            .filter(|i| i.blocks(coverage))
            .map(|i| i.to_string())
            .collect();
        if !blocking.is_empty() {
            return Err(SettlementError::InvalidRuleTable {
                table_id: self.id.clone(),
                reason: blocking.join("; "),
            });
        }

        for issue in &issues {
            warn!("Rule table {}: {}", self.id, issue);
        }

        self.rules = candidate.rules;
        Ok(issues)
    }

    fn clone_header(&self) -> RuleTable {
        RuleTable {
            id: self.id.clone(),
            name: self.name.clone(),
            dimension: self.dimension,
            priority_order: self.priority_order,
            ratio_domain: self.ratio_domain,
            rules: Vec::new(),
        }
    }
}
