//! Simulated voice assistant.
//!
//! DESIGN
//! ======
//! Nothing is recorded or synthesized. `start_listening` walks the same
//! listen, transcribe, respond and speak phases a real integration would,
//! driven by fixed timers and canned text, and files a `recommendation`
//! feedback item against the lead selected when it started.
//!
//! Each run holds a cycle ticket. `stop_listening` and a newer
//! `start_listening` both bump the cycle generation, and a run whose ticket
//! is no longer current abandons at its next phase boundary.
//!
//! ERROR HANDLING
//! ==============
//! Missing credentials and a missing selection are reported twice: as a
//! notification for the user and as a `VoiceError` for the caller. The
//! requested action is abandoned in both cases.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::session::LeadSession;
use crate::notify::{ErrorCode, Notification};
use crate::state::{FeedbackItem, FeedbackType, NewFeedback};

pub const DEFAULT_LISTEN_MS: u64 = 2000;
pub const DEFAULT_PROCESS_MS: u64 = 1500;
pub const DEFAULT_SPEAK_MS_PER_CHAR: u64 = 30;

const CANNED_TRANSCRIPT: &str = "Can you analyze this lead and tell me if it's worth pursuing?";
const CANNED_RESPONSE: &str = "Based on the lead's profile and recent interactions, I'd rate this as a high-potential lead. \
The company size and industry match our ideal customer profile, and they've shown consistent engagement. \
Would you like me to prioritize this lead?";
const RECOMMENDATION_COMMENT: &str =
    "The AI suggests prioritizing this lead based on company profile and engagement metrics.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoiceError {
    #[error("voice service API key is not set")]
    MissingApiKey,
    #[error("no lead is selected")]
    NoLeadSelected,
    #[error("voice cycle was stopped or superseded")]
    Stopped,
}

impl ErrorCode for VoiceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "E_MISSING_API_KEY",
            Self::NoLeadSelected => "E_NO_LEAD_SELECTED",
            Self::Stopped => "E_VOICE_STOPPED",
        }
    }
}

/// Phase timings for the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceTimings {
    pub listen: Duration,
    pub process: Duration,
    pub speak_per_char: Duration,
}

impl Default for VoiceTimings {
    fn default() -> Self {
        Self {
            listen: Duration::from_millis(DEFAULT_LISTEN_MS),
            process: Duration::from_millis(DEFAULT_PROCESS_MS),
            speak_per_char: Duration::from_millis(DEFAULT_SPEAK_MS_PER_CHAR),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceState {
    pub is_listening: bool,
    pub is_processing: bool,
    pub is_speaking: bool,
    pub transcript: String,
    pub last_response: String,
}

#[derive(Debug, Default)]
struct Cycle {
    state: VoiceState,
    generation: u64,
}

/// Identifies one `start_listening` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CycleTicket {
    generation: u64,
}

pub struct VoiceAssistant {
    session: Arc<LeadSession>,
    timings: VoiceTimings,
    cycle: Mutex<Cycle>,
}

impl VoiceAssistant {
    #[must_use]
    pub fn new(session: Arc<LeadSession>, timings: VoiceTimings) -> Self {
        Self { session, timings, cycle: Mutex::new(Cycle::default()) }
    }

    #[must_use]
    pub fn state(&self) -> VoiceState {
        self.lock().state.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Cycle> {
        self.cycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut VoiceState)) {
        f(&mut self.lock().state);
    }

    fn begin_cycle(&self) -> CycleTicket {
        let mut cycle = self.lock();
        cycle.generation += 1;
        cycle.state.is_listening = true;
        cycle.state.transcript.clear();
        CycleTicket { generation: cycle.generation }
    }

    /// Apply `f` only while `ticket` is still the live cycle.
    fn advance(&self, ticket: CycleTicket, f: impl FnOnce(&mut VoiceState)) -> Result<(), VoiceError> {
        let mut cycle = self.lock();
        if cycle.generation != ticket.generation {
            info!(ticket = ticket.generation, current = cycle.generation, "voice cycle abandoned");
            return Err(VoiceError::Stopped);
        }
        f(&mut cycle.state);
        Ok(())
    }

    fn require_api_key(&self) -> Result<(), VoiceError> {
        if self.session.api_key().is_some() {
            return Ok(());
        }
        self.session.notify(Notification::destructive(
            "API Key Required",
            "Please set your voice service API key in settings to use voice features",
        ));
        Err(VoiceError::MissingApiKey)
    }

    /// Run one listen/respond cycle and return the filed feedback item.
    ///
    /// # Errors
    ///
    /// `MissingApiKey` when no credential is stored, `Stopped` when
    /// `stop_listening` or a newer run took over before this one finished.
    pub async fn start_listening(&self) -> Result<FeedbackItem, VoiceError> {
        self.require_api_key()?;

        let lead_id = self.session.selected_lead().await.map(|lead| lead.id).unwrap_or_default();
        let ticket = self.begin_cycle();
        debug!(lead_id = %lead_id, cycle = ticket.generation, "voice listening");
        tokio::time::sleep(self.timings.listen).await;

        self.advance(ticket, |s| {
            s.is_listening = false;
            s.is_processing = true;
            s.transcript = CANNED_TRANSCRIPT.to_string();
        })?;
        tokio::time::sleep(self.timings.process).await;

        self.advance(ticket, |s| {
            s.is_processing = false;
            s.last_response = CANNED_RESPONSE.to_string();
        })?;
        self.speak_text(CANNED_RESPONSE).await?;

        self.advance(ticket, |_| {})?;
        let item = self
            .session
            .add_feedback(NewFeedback::new(lead_id, FeedbackType::Recommendation, RECOMMENDATION_COMMENT))
            .await;
        Ok(item)
    }

    /// Abandon the run that is currently listening. No-op once it has a transcript.
    pub fn stop_listening(&self) {
        let mut cycle = self.lock();
        if cycle.state.is_listening {
            cycle.state.is_listening = false;
            cycle.generation += 1;
        }
    }

    /// Pretend to speak `text`, taking a fixed time per character.
    ///
    /// # Errors
    ///
    /// `MissingApiKey` when no credential is stored.
    pub async fn speak_text(&self, text: &str) -> Result<(), VoiceError> {
        self.require_api_key()?;

        self.update(|s| {
            s.is_speaking = true;
            s.last_response = text.to_string();
        });
        let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        tokio::time::sleep(self.timings.speak_per_char.saturating_mul(chars)).await;
        self.update(|s| s.is_speaking = false);
        Ok(())
    }

    /// File free-form user feedback against the selected lead.
    ///
    /// # Errors
    ///
    /// `NoLeadSelected` when nothing is selected.
    pub async fn process_feedback(&self, text: &str) -> Result<FeedbackItem, VoiceError> {
        let Some(lead) = self.session.selected_lead().await else {
            self.session
                .notify(Notification::new("No Lead Selected", "Please select a lead to provide feedback on"));
            return Err(VoiceError::NoLeadSelected);
        };

        let item = self
            .session
            .add_feedback(NewFeedback::new(lead.id, FeedbackType::Interaction, format!("User feedback: \"{text}\"")))
            .await;
        self.session.notify(Notification::new(
            "Feedback Recorded",
            "Your feedback has been recorded and will be used to improve lead assessments",
        ));
        Ok(item)
    }
}

#[cfg(test)]
#[path = "voice_test.rs"]
mod tests;
