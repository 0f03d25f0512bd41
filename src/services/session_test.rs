use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::notify::{MemorySink, Variant};
use crate::services::source::{MockLeadSource, SourceError};
use crate::settings::MemorySettings;
use crate::state::FeedbackType;
use crate::state::test_helpers::{lead, scored_trio};

const LATENCY: Duration = Duration::from_millis(1000);

/// Mock source that counts fetches.
struct CountingSource {
    inner: MockLeadSource,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl LeadSource for CountingSource {
    async fn fetch_leads(&self) -> Result<Vec<Lead>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_leads().await
    }
}

struct FailingSource;

#[async_trait::async_trait]
impl LeadSource for FailingSource {
    async fn fetch_leads(&self) -> Result<Vec<Lead>, SourceError> {
        tokio::time::sleep(LATENCY).await;
        Err(SourceError::Unavailable("connection refused".into()))
    }
}

fn session_with(source: Arc<dyn LeadSource>) -> (LeadSession, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let session =
        LeadSession::new(LeadStore::with_leads(scored_trio()), source, sink.clone(), Arc::new(MemorySettings::new()));
    (session, sink)
}

fn mock_session() -> (LeadSession, Arc<MemorySink>) {
    session_with(Arc::new(MockLeadSource::new(25, LATENCY)))
}

// =============================================================================
// Reads and filters
// =============================================================================

#[tokio::test]
async fn filtered_view_tracks_filter_changes() {
    let (session, _) = mock_session();
    assert_eq!(session.filtered_leads().await.len(), 3);

    session.set_filter_score(40, 100).await.unwrap();
    let scores: Vec<u8> = session.filtered_leads().await.iter().map(|l| l.score).collect();
    assert_eq!(scores, vec![50, 90]);

    session.set_filter_text("david").await;
    assert_eq!(session.filtered_leads().await.len(), 1);

    session.set_status_filter(Some(LeadStatus::Lost)).await;
    assert!(session.filtered_leads().await.is_empty());
    assert!(session.read(LeadStore::is_empty_view).await);

    session.reset_filters().await;
    assert!(session.filter().await.is_default());
    assert_eq!(session.leads().await.len(), 3);
}

#[tokio::test]
async fn set_filter_status_surfaces_unknown_tag() {
    let (session, sink) = mock_session();
    assert!(session.set_filter_status("bogus").await.is_err());
    session.set_filter_status("won").await.unwrap();
    assert_eq!(session.filter().await.status, Some(LeadStatus::Won));
    assert!(sink.snapshot().is_empty());
}

#[tokio::test]
async fn select_and_clear() {
    let (session, _) = mock_session();
    assert_eq!(session.select_lead(Some("lead-1")).await.map(|l| l.id), Some("lead-1".into()));
    assert!(session.select_lead(Some("missing")).await.is_none());
    assert!(session.selected_lead().await.is_none());
}

// =============================================================================
// Notifications follow successful transitions only
// =============================================================================

#[tokio::test]
async fn update_lead_notifies_with_name_and_company() {
    let (session, sink) = mock_session();
    session.select_lead(Some("lead-2")).await;

    let mut edited = session.selected_lead().await.unwrap();
    edited.score = 64;
    session.update_lead(edited).await.unwrap();

    assert_eq!(session.selected_lead().await.unwrap().score, 64);
    let notes = sink.snapshot();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Lead Updated");
    assert!(notes[0].description.contains("Maria Rodriguez"));
    assert!(notes[0].description.contains("Global Shipping Co."));
}

#[tokio::test]
async fn update_unknown_lead_is_silent_error() {
    let (session, sink) = mock_session();
    let err = session
        .update_lead(lead("lead-404", "Nobody", "Nowhere", LeadStatus::New, 1))
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::LeadNotFound("lead-404".into()));
    assert!(sink.snapshot().is_empty());
}

#[tokio::test]
async fn feedback_lifecycle_notifies_each_step() {
    let (session, sink) = mock_session();
    let item = session
        .add_feedback(NewFeedback::new("lead-1", FeedbackType::Score, "raise score"))
        .await;
    assert_eq!(item.status, FeedbackStatus::Pending);
    assert_eq!(session.pending_feedback().await.len(), 1);

    let status = session.resolve_feedback(&item.id, false).await.unwrap();
    assert_eq!(status, FeedbackStatus::Rejected);
    assert_eq!(session.feedback_items().await[0].status, FeedbackStatus::Rejected);
    assert_eq!(sink.titles(), vec!["Feedback Requested", "Feedback Rejected"]);

    assert!(session.resolve_feedback("bad-id", true).await.is_err());
    assert!(session.resolve_feedback(&item.id, true).await.is_err());
    assert_eq!(sink.titles().len(), 2);
}

// =============================================================================
// Refresh
// =============================================================================

#[tokio::test(start_paused = true)]
async fn refresh_is_busy_until_latency_elapses() {
    let (session, sink) = mock_session();

    assert_eq!(session.refresh_leads().await, RefreshOutcome::Started);
    assert!(session.is_loading().await);

    tokio::time::sleep(Duration::from_millis(999)).await;
    assert!(session.is_loading().await);
    assert_eq!(session.leads().await.len(), 3);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(!session.is_loading().await);
    assert_eq!(session.leads().await.len(), 25);
    assert_eq!(sink.titles(), vec!["Leads Refreshed"]);
}

#[tokio::test(start_paused = true)]
async fn concurrent_refresh_is_coalesced() {
    let source = Arc::new(CountingSource { inner: MockLeadSource::new(10, LATENCY), calls: AtomicUsize::new(0) });
    let (session, sink) = session_with(source.clone());

    assert_eq!(session.refresh_leads().await, RefreshOutcome::Started);
    assert_eq!(session.refresh_leads().await, RefreshOutcome::Coalesced);
    session.wait_for_refresh().await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.leads().await.len(), 10);
    assert_eq!(sink.titles(), vec!["Leads Refreshed"]);

    // A later refresh starts a fresh fetch.
    assert_eq!(session.refresh_leads().await, RefreshOutcome::Started);
    session.wait_for_refresh().await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_leads_and_reports_error() {
    let (session, sink) = session_with(Arc::new(FailingSource));

    session.refresh_leads().await;
    session.wait_for_refresh().await;

    assert!(!session.is_loading().await);
    assert_eq!(session.leads().await.len(), 3);
    assert_eq!(session.refresh_error().await.as_deref(), Some("lead source unavailable: connection refused"));

    let notes = sink.snapshot();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].variant, Variant::Destructive);
    assert_eq!(notes[0].title, "Refresh Failed");
}

#[tokio::test(start_paused = true)]
async fn shutdown_mid_flight_writes_nothing() {
    let (session, sink) = mock_session();
    session.refresh_leads().await;
    tokio::time::sleep(Duration::from_millis(500)).await;

    session.shutdown().await;
    tokio::time::sleep(LATENCY * 2).await;

    assert!(!session.is_loading().await);
    assert_eq!(session.leads().await.len(), 3);
    assert!(sink.snapshot().is_empty());
}

#[tokio::test(start_paused = true)]
async fn dropping_session_cancels_refresh() {
    let (session, sink) = mock_session();
    session.refresh_leads().await;
    drop(session);

    tokio::time::sleep(LATENCY * 2).await;
    assert!(sink.snapshot().is_empty());
}

#[tokio::test]
async fn wait_without_refresh_returns_immediately() {
    let (session, _) = mock_session();
    session.wait_for_refresh().await;
    assert!(!session.is_loading().await);
}

// =============================================================================
// Settings
// =============================================================================

#[tokio::test]
async fn api_key_round_trips_through_settings() {
    let (session, _) = mock_session();
    assert_eq!(session.api_key(), None);

    session.set_api_key("   ").unwrap();
    assert_eq!(session.api_key(), None, "blank keys count as unset");

    session.set_api_key("xi-live").unwrap();
    assert_eq!(session.api_key().as_deref(), Some("xi-live"));
}
