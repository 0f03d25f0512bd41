use std::collections::BTreeMap;
use std::sync::Arc;

use leadboard::config::AppConfig;
use leadboard::notify::TracingSink;
use leadboard::services::scoring::ScoreBand;
use leadboard::services::session::LeadSession;
use leadboard::services::source::{MockLeadSource, generate_mock_leads};
use leadboard::services::store::LeadStore;
use leadboard::settings::{JsonFileSettings, MemorySettings, SettingsProvider};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("invalid configuration");

    let settings: Arc<dyn SettingsProvider> = match JsonFileSettings::open(&config.settings_path) {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            tracing::warn!(error = %e, "settings unavailable; using in-memory settings");
            Arc::new(MemorySettings::new())
        }
    };

    let source = Arc::new(MockLeadSource::new(config.seed_count, config.refresh_latency));
    let store = LeadStore::with_leads(generate_mock_leads(config.seed_count));
    let session = LeadSession::new(store, source, Arc::new(TracingSink), settings);

    tracing::info!(api_key_set = session.api_key().is_some(), "voice credential checked");

    session.refresh_leads().await;
    session.wait_for_refresh().await;

    let leads = session.filtered_leads().await;
    let mut bands: BTreeMap<ScoreBand, usize> = BTreeMap::new();
    for lead in &leads {
        *bands.entry(lead.score_band()).or_default() += 1;
    }
    tracing::info!(
        total = leads.len(),
        high = bands.get(&ScoreBand::High).copied().unwrap_or(0),
        medium = bands.get(&ScoreBand::Medium).copied().unwrap_or(0),
        low = bands.get(&ScoreBand::Low).copied().unwrap_or(0),
        "lead view ready"
    );

    session.shutdown().await;
}
