//! Lead store — authoritative lead and feedback collections.
//!
//! DESIGN
//! ======
//! Every operation here is a synchronous, pure state transition. Mutators
//! return a `StoreEvent` describing what changed; `LeadSession` turns those
//! events into notifications. Selection is held by id, so an updated or
//! refreshed record is what `selected_lead` returns next.
//!
//! REFRESH
//! =======
//! A refresh is split in two. `begin_refresh` marks the store busy and hands
//! out a ticket stamped with the current generation; `complete_refresh`
//! applies a fetch result only if that ticket is still current. Cancelling
//! bumps the generation, so a late result from a torn-down task is dropped.
//! Failed fetches record `refresh_error` and leave the previous leads intact.

use std::collections::HashSet;

use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::filter::{LeadFilter, SCORE_CEILING};
use super::source::SourceError;
use crate::notify::{ErrorCode, Notification};
use crate::state::{FeedbackItem, FeedbackStatus, Lead, LeadStatus, NewFeedback, UnknownStatus};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("lead not found: {0}")]
    LeadNotFound(String),
    #[error("feedback item not found: {0}")]
    FeedbackNotFound(String),
    #[error("feedback item {id} already {status:?}")]
    FeedbackAlreadyResolved { id: String, status: FeedbackStatus },
    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),
    #[error("invalid score range {min}..={max}")]
    InvalidScoreRange { min: u8, max: u8 },
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::LeadNotFound(_) => "E_LEAD_NOT_FOUND",
            Self::FeedbackNotFound(_) => "E_FEEDBACK_NOT_FOUND",
            Self::FeedbackAlreadyResolved { .. } => "E_FEEDBACK_RESOLVED",
            Self::UnknownStatus(_) => "E_UNKNOWN_STATUS",
            Self::InvalidScoreRange { .. } => "E_SCORE_RANGE",
        }
    }
}

/// Observable outcome of a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    LeadUpdated { id: String, name: String, company: String },
    FeedbackRequested { id: String },
    FeedbackResolved { id: String, status: FeedbackStatus },
    LeadsRefreshed { count: usize },
    RefreshFailed { error: SourceError },
}

impl StoreEvent {
    #[must_use]
    pub fn notification(&self) -> Notification {
        match self {
            Self::LeadUpdated { name, company, .. } => {
                Notification::new("Lead Updated", format!("Successfully updated lead for {name} from {company}"))
            }
            Self::FeedbackRequested { .. } => {
                Notification::new("Feedback Requested", "Your input is required on a lead assessment.")
            }
            Self::FeedbackResolved { status: FeedbackStatus::Rejected, .. } => {
                Notification::new("Feedback Rejected", "The AI's assessment has been rejected.")
            }
            Self::FeedbackResolved { .. } => {
                Notification::new("Feedback Approved", "The AI's assessment has been approved and will be applied.")
            }
            Self::LeadsRefreshed { .. } => Notification::new("Leads Refreshed", "Latest lead data has been loaded."),
            Self::RefreshFailed { error } => Notification::error_from("Refresh Failed", error),
        }
    }
}

/// Proof that a refresh was started; redeemed by `complete_refresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct LeadStore {
    leads: Vec<Lead>,
    feedback: Vec<FeedbackItem>,
    selected_id: Option<String>,
    filter: LeadFilter,
    loading: bool,
    refresh_error: Option<String>,
    refresh_generation: u64,
}

impl LeadStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_leads(leads: Vec<Lead>) -> Self {
        Self { leads, ..Self::default() }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    #[must_use]
    pub fn lead(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|lead| lead.id == id)
    }

    /// Leads passing every active filter, in collection order.
    #[must_use]
    pub fn filtered_leads(&self) -> Vec<&Lead> {
        self.filter.apply(&self.leads)
    }

    /// True when the filtered view is empty and should render an empty state.
    #[must_use]
    pub fn is_empty_view(&self) -> bool {
        !self.leads.iter().any(|lead| self.filter.matches(lead))
    }

    #[must_use]
    pub fn selected_lead(&self) -> Option<&Lead> {
        self.selected_id.as_deref().and_then(|id| self.lead(id))
    }

    #[must_use]
    pub fn feedback_items(&self) -> &[FeedbackItem] {
        &self.feedback
    }

    #[must_use]
    pub fn pending_feedback(&self) -> Vec<&FeedbackItem> {
        self.feedback
            .iter()
            .filter(|item| item.status == FeedbackStatus::Pending)
            .collect()
    }

    #[must_use]
    pub fn feedback_for_lead(&self, lead_id: &str) -> Vec<&FeedbackItem> {
        self.feedback
            .iter()
            .filter(|item| item.lead_id == lead_id)
            .collect()
    }

    #[must_use]
    pub fn filter(&self) -> &LeadFilter {
        &self.filter
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn refresh_error(&self) -> Option<&str> {
        self.refresh_error.as_deref()
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.filter.text = text.into();
    }

    /// Set the status filter from its wire tag; `""` clears it.
    ///
    /// # Errors
    ///
    /// Returns `UnknownStatus` for an unrecognised tag, leaving the filter unchanged.
    pub fn set_filter_status(&mut self, raw: &str) -> Result<(), StoreError> {
        self.filter.status = if raw.is_empty() { None } else { Some(raw.parse::<LeadStatus>()?) };
        Ok(())
    }

    pub fn set_status_filter(&mut self, status: Option<LeadStatus>) {
        self.filter.status = status;
    }

    /// # Errors
    ///
    /// Returns `InvalidScoreRange` if `min > max` or `max > 100`.
    pub fn set_filter_score(&mut self, min: u8, max: u8) -> Result<(), StoreError> {
        if min > max || max > SCORE_CEILING {
            return Err(StoreError::InvalidScoreRange { min, max });
        }
        self.filter.score_range = (min, max);
        Ok(())
    }

    pub fn reset_filters(&mut self) {
        self.filter = LeadFilter::default();
    }

    // -------------------------------------------------------------------------
    // Selection and updates
    // -------------------------------------------------------------------------

    /// Select a lead by id. `None` or an unknown id clears the selection.
    pub fn select_lead(&mut self, id: Option<&str>) -> Option<&Lead> {
        self.selected_id = id.filter(|id| self.leads.iter().any(|lead| lead.id == *id)).map(String::from);
        self.selected_lead()
    }

    /// Replace the lead with the same id wholesale.
    ///
    /// # Errors
    ///
    /// Returns `LeadNotFound` if no lead has that id; the store is unchanged.
    pub fn update_lead(&mut self, lead: Lead) -> Result<StoreEvent, StoreError> {
        let Some(slot) = self.leads.iter_mut().find(|existing| existing.id == lead.id) else {
            return Err(StoreError::LeadNotFound(lead.id));
        };
        let event = StoreEvent::LeadUpdated { id: lead.id.clone(), name: lead.name.clone(), company: lead.company.clone() };
        *slot = lead;
        Ok(event)
    }

    // -------------------------------------------------------------------------
    // Feedback
    // -------------------------------------------------------------------------

    /// Append a pending feedback item with a fresh id and timestamp.
    pub fn add_feedback(&mut self, draft: NewFeedback) -> (&FeedbackItem, StoreEvent) {
        let item = FeedbackItem {
            id: format!("feedback-{}", Uuid::new_v4()),
            lead_id: draft.lead_id,
            feedback_type: draft.feedback_type,
            status: FeedbackStatus::Pending,
            comment: draft.comment,
            timestamp: OffsetDateTime::now_utc(),
        };
        debug!(id = %item.id, lead_id = %item.lead_id, "feedback requested");
        let event = StoreEvent::FeedbackRequested { id: item.id.clone() };
        self.feedback.push(item);
        let stored = &self.feedback[self.feedback.len() - 1];
        (stored, event)
    }

    /// Resolve a pending item to approved or rejected. Resolution happens once.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackNotFound` for an unknown id and `FeedbackAlreadyResolved`
    /// if the item has left pending; neither changes the collection.
    pub fn resolve_feedback(&mut self, id: &str, approved: bool) -> Result<StoreEvent, StoreError> {
        let Some(item) = self.feedback.iter_mut().find(|item| item.id == id) else {
            return Err(StoreError::FeedbackNotFound(id.to_string()));
        };
        if item.status.is_resolved() {
            return Err(StoreError::FeedbackAlreadyResolved { id: id.to_string(), status: item.status });
        }
        item.status = if approved { FeedbackStatus::Approved } else { FeedbackStatus::Rejected };
        Ok(StoreEvent::FeedbackResolved { id: id.to_string(), status: item.status })
    }

    // -------------------------------------------------------------------------
    // Refresh
    // -------------------------------------------------------------------------

    /// Mark the store busy. Returns `None` while another refresh is in flight.
    pub fn begin_refresh(&mut self) -> Option<RefreshTicket> {
        if self.loading {
            return None;
        }
        self.refresh_generation += 1;
        self.loading = true;
        Some(RefreshTicket { generation: self.refresh_generation })
    }

    /// Apply a fetch result. Returns `None` if the ticket was cancelled.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<Lead>, SourceError>,
    ) -> Option<StoreEvent> {
        if !self.loading || ticket.generation != self.refresh_generation {
            debug!(ticket = ticket.generation, current = self.refresh_generation, "stale refresh result dropped");
            return None;
        }
        self.loading = false;

        match result.and_then(validate_unique_ids) {
            Ok(leads) => {
                let count = leads.len();
                self.leads = leads;
                self.refresh_error = None;
                info!(count, "leads refreshed");
                Some(StoreEvent::LeadsRefreshed { count })
            }
            Err(e) => {
                warn!(error = %e, "lead refresh failed; keeping previous leads");
                self.refresh_error = Some(e.to_string());
                Some(StoreEvent::RefreshFailed { error: e })
            }
        }
    }

    /// Abandon any in-flight refresh; its result will be ignored.
    pub fn cancel_refresh(&mut self) {
        self.refresh_generation += 1;
        self.loading = false;
    }
}

fn validate_unique_ids(leads: Vec<Lead>) -> Result<Vec<Lead>, SourceError> {
    let duplicate = {
        let mut seen = HashSet::with_capacity(leads.len());
        leads
            .iter()
            .find(|lead| !seen.insert(lead.id.as_str()))
            .map(|lead| lead.id.clone())
    };
    if let Some(id) = duplicate {
        return Err(SourceError::Malformed(format!("duplicate lead id {id}")));
    }
    Ok(leads)
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
