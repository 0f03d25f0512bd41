//! Lead domain records.
//!
//! DESIGN
//! ======
//! These types mirror the JSON shapes the dashboard exchanges (camelCase
//! fields, lowercase enum tags). The store owns every `Lead` and
//! `FeedbackItem`; presentation code only ever sees clones or borrows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::services::scoring::ScoreBand;

// =============================================================================
// ENUMS
// =============================================================================

/// Pipeline stage a lead currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl LeadStatus {
    pub const ALL: [Self; 7] =
        [Self::New, Self::Contacted, Self::Qualified, Self::Proposal, Self::Negotiation, Self::Won, Self::Lost];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lead status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for LeadStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == raw)
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanySize {
    Small,
    Medium,
    Large,
    Enterprise,
}

impl CompanySize {
    pub const ALL: [Self; 4] = [Self::Small, Self::Medium, Self::Large, Self::Enterprise];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Email,
    Call,
    Meeting,
    Other,
}

impl InteractionKind {
    pub const ALL: [Self; 4] = [Self::Email, Self::Call, Self::Meeting, Self::Other];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Score,
    Recommendation,
    Interaction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl FeedbackStatus {
    #[must_use]
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

// =============================================================================
// LEAD
// =============================================================================

/// Historical contact record attached to a lead. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadInteraction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub notes: String,
}

/// A CRM record tracked through the sales pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub company: String,
    pub position: String,
    pub email: String,
    pub phone: String,
    pub industry: String,
    pub location: String,
    pub size: CompanySize,
    pub status: LeadStatus,
    /// 0..=100. Clamped when generated, not re-checked on update.
    pub score: u8,
    #[serde(with = "time::serde::rfc3339")]
    pub last_contact: OffsetDateTime,
    pub notes: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub tags: Vec<String>,
    pub interactions: Vec<LeadInteraction>,
}

impl Lead {
    #[must_use]
    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }
}

// =============================================================================
// FEEDBACK
// =============================================================================

/// A human-in-the-loop review request raised by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub id: String,
    /// Lookup-only reference; the lead may no longer exist.
    pub lead_id: String,
    pub feedback_type: FeedbackType,
    pub status: FeedbackStatus,
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Caller-supplied payload for a new feedback request.
///
/// `status` is accepted so dashboard payloads deserialize unchanged, but the
/// store always files new items as pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    pub lead_id: String,
    pub feedback_type: FeedbackType,
    #[serde(default)]
    pub status: FeedbackStatus,
    pub comment: String,
}

impl NewFeedback {
    #[must_use]
    pub fn new(lead_id: impl Into<String>, feedback_type: FeedbackType, comment: impl Into<String>) -> Self {
        Self { lead_id: lead_id.into(), feedback_type, status: FeedbackStatus::Pending, comment: comment.into() }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
