//! Lead data source — mock generator behind an async seam.
//!
//! DESIGN
//! ======
//! `LeadSource` is what a refresh awaits. The shipped implementation,
//! `MockLeadSource`, sleeps for a fixed latency and then generates a fresh
//! randomized set. A real backend would implement the same trait and
//! surface failures through `SourceError`.

use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use time::OffsetDateTime;
use tracing::debug;

use crate::notify::ErrorCode;
use crate::state::{CompanySize, InteractionKind, Lead, LeadInteraction, LeadStatus};

pub const DEFAULT_LEAD_COUNT: usize = 25;
pub const DEFAULT_FETCH_LATENCY_MS: u64 = 1000;

const RECENT_DAYS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("lead source unavailable: {0}")]
    Unavailable(String),
    #[error("lead source returned malformed data: {0}")]
    Malformed(String),
}

impl ErrorCode for SourceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "E_SOURCE_UNAVAILABLE",
            Self::Malformed(_) => "E_SOURCE_MALFORMED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

#[async_trait::async_trait]
pub trait LeadSource: Send + Sync {
    async fn fetch_leads(&self) -> Result<Vec<Lead>, SourceError>;
}

// =============================================================================
// MOCK SOURCE
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct MockLeadSource {
    pub count: usize,
    pub latency: Duration,
}

impl Default for MockLeadSource {
    fn default() -> Self {
        Self { count: DEFAULT_LEAD_COUNT, latency: Duration::from_millis(DEFAULT_FETCH_LATENCY_MS) }
    }
}

impl MockLeadSource {
    #[must_use]
    pub fn new(count: usize, latency: Duration) -> Self {
        Self { count, latency }
    }
}

#[async_trait::async_trait]
impl LeadSource for MockLeadSource {
    async fn fetch_leads(&self) -> Result<Vec<Lead>, SourceError> {
        tokio::time::sleep(self.latency).await;
        let leads = generate_mock_leads(self.count);
        debug!(count = leads.len(), "mock leads generated");
        Ok(leads)
    }
}

// =============================================================================
// GENERATOR
// =============================================================================

const COMPANIES: &[&str] = &[
    "FastFreight Logistics",
    "Global Shipping Co.",
    "Express Cargo Solutions",
    "TransWorld Movers",
    "Maritime Shipping Inc.",
    "AirCargo Express",
    "Pacific Freight Systems",
    "Continental Delivery",
    "Nordic Transport Ltd.",
    "EastWest Supply Chain",
    "Atlas Fulfillment",
    "Horizon Distribution",
    "Velocity Logistics",
    "Prime Shipping Group",
    "Eagle Transport Services",
    "Summit Warehousing",
    "Coastal Freight Lines",
    "Central Storage Solutions",
];

const LOCATIONS: &[&str] = &[
    "Los Angeles, CA",
    "New York, NY",
    "Chicago, IL",
    "Houston, TX",
    "Miami, FL",
    "Seattle, WA",
    "Atlanta, GA",
    "Dallas, TX",
    "Toronto, Canada",
    "Vancouver, Canada",
    "London, UK",
    "Rotterdam, Netherlands",
    "Singapore",
    "Hong Kong",
    "Shanghai, China",
    "Tokyo, Japan",
    "Sydney, Australia",
    "Dubai, UAE",
];

const INDUSTRIES: &[&str] = &[
    "Freight Forwarding",
    "eCommerce",
    "Manufacturing",
    "Retail",
    "Automotive",
    "Pharmaceuticals",
    "Electronics",
    "Food & Beverage",
    "Construction",
    "Chemical",
    "Agriculture",
    "Aerospace",
];

const NAMES: &[&str] = &[
    "John Smith",
    "Maria Rodriguez",
    "David Chen",
    "Sarah Johnson",
    "Mohammed Al-Farsi",
    "Priya Patel",
    "Carlos Gomez",
    "Emma Wilson",
    "Hiroshi Tanaka",
    "Olivia Brown",
];

const POSITIONS: &[&str] = &[
    "Logistics Manager",
    "Supply Chain Director",
    "Operations Head",
    "Procurement Manager",
    "CEO",
    "Warehouse Manager",
    "Fleet Director",
    "VP of Operations",
];

const TAGS: &[&str] =
    &["urgent", "follow-up", "key-account", "price-sensitive", "new-market", "referral", "repeat-customer"];

const LEAD_NOTES: &str = "Looking for shipping solutions to optimize their supply chain.";
const INTERACTION_NOTES: &str = "Discussed shipping requirements and logistics needs.";

/// Generate `count` randomized leads with ids `lead-1..=lead-{count}`.
#[must_use]
pub fn generate_mock_leads(count: usize) -> Vec<Lead> {
    generate_mock_leads_with(&mut rand::rng(), count)
}

/// Same as [`generate_mock_leads`] with a caller-supplied RNG.
pub fn generate_mock_leads_with<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Lead> {
    let now = OffsetDateTime::now_utc();
    (1..=count).map(|n| mock_lead(rng, n, now)).collect()
}

fn mock_lead<R: Rng + ?Sized>(rng: &mut R, n: usize, now: OffsetDateTime) -> Lead {
    let id = format!("lead-{n}");
    let company = pick(rng, COMPANIES);
    let status = pick(rng, &LeadStatus::ALL);
    let score = score_for(status, rng.random_range(-10..10));

    Lead {
        name: pick(rng, NAMES).to_string(),
        company: company.to_string(),
        position: pick(rng, POSITIONS).to_string(),
        email: company_email(company),
        phone: format!(
            "+1-{}-{}-{}",
            rng.random_range(100..1000),
            rng.random_range(100..1000),
            rng.random_range(1000..10000)
        ),
        industry: pick(rng, INDUSTRIES).to_string(),
        location: pick(rng, LOCATIONS).to_string(),
        size: pick(rng, &CompanySize::ALL),
        status,
        score,
        last_contact: recent_date(rng, now),
        notes: LEAD_NOTES.to_string(),
        created_at: recent_date(rng, now),
        tags: random_tags(rng),
        interactions: random_interactions(rng, &id, now),
        id,
    }
}

/// Status-dependent base score plus jitter, clamped to `1..=100`.
fn score_for(status: LeadStatus, jitter: i32) -> u8 {
    let base = match status {
        LeadStatus::Qualified => 60,
        LeadStatus::Proposal => 70,
        LeadStatus::Negotiation => 80,
        LeadStatus::Won => 95,
        LeadStatus::New | LeadStatus::Contacted | LeadStatus::Lost => 30,
    };
    u8::try_from((base + jitter).clamp(1, 100)).unwrap_or(1)
}

fn company_email(company: &str) -> String {
    let domain: String = company
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    format!("contact@{domain}.com")
}

fn recent_date<R: Rng + ?Sized>(rng: &mut R, now: OffsetDateTime) -> OffsetDateTime {
    now - time::Duration::days(rng.random_range(0..RECENT_DAYS))
}

fn random_tags<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    let mut tags = TAGS.to_vec();
    tags.shuffle(rng);
    let keep = rng.random_range(1..=3);
    tags.into_iter().take(keep).map(String::from).collect()
}

fn random_interactions<R: Rng + ?Sized>(rng: &mut R, lead_id: &str, now: OffsetDateTime) -> Vec<LeadInteraction> {
    let count = rng.random_range(1..=5);
    (0..count)
        .map(|idx| LeadInteraction {
            id: format!("interaction-{lead_id}-{idx}"),
            kind: pick(rng, &InteractionKind::ALL),
            date: recent_date(rng, now),
            notes: INTERACTION_NOTES.to_string(),
        })
        .collect()
}

fn pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, table: &[T]) -> T {
    table[rng.random_range(0..table.len())]
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
