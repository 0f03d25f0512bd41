//! Lead session — the handle presentation code holds.
//!
//! DESIGN
//! ======
//! A session is constructed explicitly and passed to whoever needs it. It
//! owns the `LeadStore` behind a tokio `RwLock` and publishes notifications
//! only after a store transition has succeeded. Not-found errors are
//! returned to the caller and never produce a toast.
//!
//! REFRESH
//! =======
//! At most one refresh runs per session. A call made while one is in flight
//! is coalesced into it. The fetch runs on a spawned task; `shutdown` (or
//! dropping the session) aborts that task and cancels its ticket so a late
//! result can neither write state nor notify.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::filter::LeadFilter;
use super::source::LeadSource;
use super::store::{LeadStore, StoreError};
use crate::notify::NotificationSink;
use crate::settings::{API_KEY_SETTING, SettingsError, SettingsProvider};
use crate::state::{FeedbackItem, FeedbackStatus, Lead, LeadStatus, NewFeedback};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new fetch was spawned.
    Started,
    /// A fetch was already running; this call joined it.
    Coalesced,
}

pub struct LeadSession {
    store: Arc<RwLock<LeadStore>>,
    source: Arc<dyn LeadSource>,
    notifier: Arc<dyn NotificationSink>,
    settings: Arc<dyn SettingsProvider>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl LeadSession {
    #[must_use]
    pub fn new(
        store: LeadStore,
        source: Arc<dyn LeadSource>,
        notifier: Arc<dyn NotificationSink>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        info!(leads = store.leads().len(), "lead session started");
        Self { store: Arc::new(RwLock::new(store)), source, notifier, settings, refresh_task: Mutex::new(None) }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Run `f` against the store under a read lock.
    pub async fn read<R>(&self, f: impl FnOnce(&LeadStore) -> R) -> R {
        let store = self.store.read().await;
        f(&store)
    }

    pub async fn leads(&self) -> Vec<Lead> {
        self.read(|store| store.leads().to_vec()).await
    }

    pub async fn filtered_leads(&self) -> Vec<Lead> {
        self.read(|store| store.filtered_leads().into_iter().cloned().collect())
            .await
    }

    pub async fn selected_lead(&self) -> Option<Lead> {
        self.read(|store| store.selected_lead().cloned()).await
    }

    pub async fn feedback_items(&self) -> Vec<FeedbackItem> {
        self.read(|store| store.feedback_items().to_vec()).await
    }

    pub async fn pending_feedback(&self) -> Vec<FeedbackItem> {
        self.read(|store| store.pending_feedback().into_iter().cloned().collect())
            .await
    }

    pub async fn filter(&self) -> LeadFilter {
        self.read(|store| store.filter().clone()).await
    }

    pub async fn is_loading(&self) -> bool {
        self.read(LeadStore::is_loading).await
    }

    pub async fn refresh_error(&self) -> Option<String> {
        self.read(|store| store.refresh_error().map(String::from))
            .await
    }

    // -------------------------------------------------------------------------
    // Filters and selection
    // -------------------------------------------------------------------------

    pub async fn set_filter_text(&self, text: impl Into<String>) {
        self.store.write().await.set_filter_text(text);
    }

    /// # Errors
    ///
    /// Returns `UnknownStatus` for an unrecognised status tag.
    pub async fn set_filter_status(&self, raw: &str) -> Result<(), StoreError> {
        self.store.write().await.set_filter_status(raw)
    }

    pub async fn set_status_filter(&self, status: Option<LeadStatus>) {
        self.store.write().await.set_status_filter(status);
    }

    /// # Errors
    ///
    /// Returns `InvalidScoreRange` for an inverted or out-of-bounds range.
    pub async fn set_filter_score(&self, min: u8, max: u8) -> Result<(), StoreError> {
        self.store.write().await.set_filter_score(min, max)
    }

    pub async fn reset_filters(&self) {
        self.store.write().await.reset_filters();
    }

    pub async fn select_lead(&self, id: Option<&str>) -> Option<Lead> {
        self.store.write().await.select_lead(id).cloned()
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `LeadNotFound` if no stored lead shares the id.
    pub async fn update_lead(&self, lead: Lead) -> Result<(), StoreError> {
        let event = self.store.write().await.update_lead(lead)?;
        self.notifier.notify(event.notification());
        Ok(())
    }

    pub async fn add_feedback(&self, draft: NewFeedback) -> FeedbackItem {
        let (item, event) = {
            let mut store = self.store.write().await;
            let (item, event) = store.add_feedback(draft);
            (item.clone(), event)
        };
        self.notifier.notify(event.notification());
        item
    }

    /// # Errors
    ///
    /// Returns `FeedbackNotFound` or `FeedbackAlreadyResolved`.
    pub async fn resolve_feedback(&self, id: &str, approved: bool) -> Result<FeedbackStatus, StoreError> {
        let event = self
            .store
            .write()
            .await
            .resolve_feedback(id, approved)?;
        self.notifier.notify(event.notification());
        Ok(if approved { FeedbackStatus::Approved } else { FeedbackStatus::Rejected })
    }

    // -------------------------------------------------------------------------
    // Refresh
    // -------------------------------------------------------------------------

    /// Start a background refresh, or join the one already running.
    pub async fn refresh_leads(&self) -> RefreshOutcome {
        let Some(ticket) = self.store.write().await.begin_refresh() else {
            debug!("refresh already in flight; coalescing");
            return RefreshOutcome::Coalesced;
        };

        let store = Arc::clone(&self.store);
        let source = Arc::clone(&self.source);
        let notifier = Arc::clone(&self.notifier);
        let handle = tokio::spawn(async move {
            let result = source.fetch_leads().await;
            let event = store.write().await.complete_refresh(ticket, result);
            if let Some(event) = event {
                notifier.notify(event.notification());
            }
        });

        let previous = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            // Finished already (loading was clear), so this is a no-op.
            previous.abort();
        }
        RefreshOutcome::Started
    }

    /// Wait for the in-flight refresh, if any, to finish.
    pub async fn wait_for_refresh(&self) {
        let handle = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "refresh task failed");
                }
            }
        }
    }

    /// Abort any in-flight refresh. No state write or notification follows.
    pub async fn shutdown(&self) {
        self.abort_refresh_task();
        self.store.write().await.cancel_refresh();
        info!("lead session shut down");
    }

    fn abort_refresh_task(&self) {
        let handle = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    /// Voice service credential; `None` when unset or blank.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        self.settings
            .get(API_KEY_SETTING)
            .filter(|key| !key.trim().is_empty())
    }

    /// # Errors
    ///
    /// Returns an error if the settings backend cannot persist the key.
    pub fn set_api_key(&self, key: &str) -> Result<(), SettingsError> {
        self.settings.set(API_KEY_SETTING, key)
    }

    pub(crate) fn notify(&self, notification: crate::notify::Notification) {
        self.notifier.notify(notification);
    }
}

impl Drop for LeadSession {
    fn drop(&mut self) {
        self.abort_refresh_task();
        // EDGE: the task holds its own Arc to the store; invalidate the ticket
        // too in case it is past its last await point.
        if let Ok(mut store) = self.store.try_write() {
            store.cancel_refresh();
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
