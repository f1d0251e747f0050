//! Onboarding ingestion: questionnaire answers in, persisted roadmap out.

mod normalize;

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::roadmap::RoadmapGenerator;
use crate::traits::StateStore;

pub use normalize::{build_records, NormalizedAnswers};

pub const ONBOARDING_FAILED: &str = "Failed to process onboarding. Please try again.";
pub const ONBOARDING_COMPLETED: &str = "Onboarding completed successfully!";

/// The six questionnaire answers as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingAnswers {
    pub ideal_self_vision: String,
    pub priority_areas: Vec<String>,
    pub financial_vision: String,
    pub health_vision: String,
    pub signature_habits: String,
    pub constraints: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingAck {
    pub success: bool,
    pub message: String,
}

#[derive(Debug)]
pub enum OnboardingError {
    /// Raised before any network or database access.
    MissingUserId,
    /// Anything downstream. The cause is logged; only the generic sentence
    /// is displayed.
    Failed(anyhow::Error),
}

impl fmt::Display for OnboardingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnboardingError::MissingUserId => write!(f, "User ID is required to complete onboarding."),
            OnboardingError::Failed(_) => write!(f, "{}", ONBOARDING_FAILED),
        }
    }
}

impl std::error::Error for OnboardingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OnboardingError::MissingUserId => None,
            OnboardingError::Failed(e) => Some(e.as_ref()),
        }
    }
}

/// Runs generation and persists the result in one transaction.
pub struct OnboardingIngestor {
    store: Arc<dyn StateStore>,
    generator: RoadmapGenerator,
}

impl OnboardingIngestor {
    pub fn new(store: Arc<dyn StateStore>, generator: RoadmapGenerator) -> Self {
        Self { store, generator }
    }

    pub async fn process(
        &self,
        user_id: &str,
        answers: &OnboardingAnswers,
    ) -> Result<OnboardingAck, OnboardingError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(OnboardingError::MissingUserId);
        }

        match self.ingest(user_id, answers).await {
            Ok(()) => Ok(OnboardingAck {
                success: true,
                message: ONBOARDING_COMPLETED.to_string(),
            }),
            Err(e) => {
                error!(user_id, error = %format!("{:#}", e), "Onboarding failed");
                Err(OnboardingError::Failed(e))
            }
        }
    }

    async fn ingest(&self, user_id: &str, answers: &OnboardingAnswers) -> anyhow::Result<()> {
        let normalized = NormalizedAnswers::from_answers(answers);
        info!(
            user_id,
            priority_areas = normalized.priority_areas.len(),
            signature_habits = normalized.signature_habits.len(),
            "Processing onboarding"
        );

        let roadmap = self.generator.generate(&normalized.to_request()).await?;
        let records = build_records(user_id, &normalized, &roadmap, Utc::now())?;
        self.store.persist_roadmap(&records).await?;

        info!(user_id, ideal_self_id = %records.ideal_self.id, "Onboarding complete");
        Ok(())
    }
}
