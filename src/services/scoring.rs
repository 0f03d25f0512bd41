//! Score banding and the simulated conversion-prediction report.
//!
//! There is no model here. `fetch_predictions` waits a fixed latency and
//! returns a canned report shaped like the one the scoring backend serves.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const HIGH_SCORE_THRESHOLD: u8 = 70;
pub const MEDIUM_SCORE_THRESHOLD: u8 = 40;
pub const DEFAULT_PREDICTION_LATENCY_MS: u64 = 1000;

/// Display band for a 0..=100 lead score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Low,
    Medium,
    High,
}

impl ScoreBand {
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        if score >= HIGH_SCORE_THRESHOLD {
            Self::High
        } else if score >= MEDIUM_SCORE_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: u32,
    pub name: String,
    pub company: String,
    pub conversion_probability: f64,
    pub score: u8,
}

impl Prediction {
    #[must_use]
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReport {
    pub predictions: Vec<Prediction>,
    pub feature_importance: Vec<FeatureImportance>,
    pub model_metrics: ModelMetrics,
}

impl PredictionReport {
    /// Predictions ordered by descending conversion probability.
    #[must_use]
    pub fn ranked(&self) -> Vec<&Prediction> {
        let mut ranked: Vec<&Prediction> = self.predictions.iter().collect();
        ranked.sort_by(|a, b| b.conversion_probability.total_cmp(&a.conversion_probability));
        ranked
    }
}

/// Simulated call to the scoring backend.
pub async fn fetch_predictions(latency: Duration) -> PredictionReport {
    tokio::time::sleep(latency).await;
    debug!("prediction report served");
    canned_report()
}

fn canned_report() -> PredictionReport {
    let prediction = |id, name: &str, company: &str, conversion_probability, score| Prediction {
        id,
        name: name.into(),
        company: company.into(),
        conversion_probability,
        score,
    };
    let feature = |name: &str, value| FeatureImportance { name: name.into(), value };

    PredictionReport {
        predictions: vec![
            prediction(1, "John Doe", "ABC Corp", 0.82, 82),
            prediction(2, "Jane Smith", "XYZ Inc", 0.45, 45),
            prediction(3, "Robert Johnson", "123 Services", 0.67, 67),
            prediction(4, "Emily Brown", "Tech Solutions", 0.23, 23),
            prediction(5, "Michael Wilson", "Global Enterprises", 0.91, 91),
        ],
        feature_importance: vec![
            feature("Last Contact Recency", 0.32),
            feature("Budget Size", 0.27),
            feature("Previous Purchases", 0.18),
            feature("Company Size", 0.15),
            feature("Industry", 0.08),
        ],
        model_metrics: ModelMetrics { accuracy: 0.85, precision: 0.83, recall: 0.79, f1_score: 0.81 },
    }
}

#[cfg(test)]
#[path = "scoring_test.rs"]
mod tests;
