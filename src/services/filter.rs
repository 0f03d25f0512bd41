//! Lead filter predicates.
//!
//! A lead is visible iff it passes all three predicates: free text, status
//! and inclusive score range. The view is recomputed on every read.

use crate::state::{Lead, LeadStatus};

pub const SCORE_FLOOR: u8 = 0;
pub const SCORE_CEILING: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadFilter {
    /// Case-insensitive substring matched against name, company and email.
    pub text: String,
    /// `None` matches every status.
    pub status: Option<LeadStatus>,
    /// Inclusive `(min, max)`.
    pub score_range: (u8, u8),
}

impl Default for LeadFilter {
    fn default() -> Self {
        Self { text: String::new(), status: None, score_range: (SCORE_FLOOR, SCORE_CEILING) }
    }
}

impl LeadFilter {
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn matches(&self, lead: &Lead) -> bool {
        self.matches_text(lead) && self.matches_status(lead) && self.matches_score(lead)
    }

    /// Borrow the matching leads in their original order.
    #[must_use]
    pub fn apply<'a>(&self, leads: &'a [Lead]) -> Vec<&'a Lead> {
        let needle = self.text.to_lowercase();
        leads
            .iter()
            .filter(|lead| text_contains(lead, &needle) && self.matches_status(lead) && self.matches_score(lead))
            .collect()
    }

    fn matches_text(&self, lead: &Lead) -> bool {
        text_contains(lead, &self.text.to_lowercase())
    }

    fn matches_status(&self, lead: &Lead) -> bool {
        self.status.is_none_or(|status| lead.status == status)
    }

    fn matches_score(&self, lead: &Lead) -> bool {
        let (min, max) = self.score_range;
        (min..=max).contains(&lead.score)
    }
}

fn text_contains(lead: &Lead, needle: &str) -> bool {
    needle.is_empty()
        || [&lead.name, &lead.company, &lead.email]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
