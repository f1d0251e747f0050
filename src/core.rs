use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::dashboard::{self, DashboardMetrics};
use crate::onboarding::{OnboardingAnswers, OnboardingIngestor};
use crate::providers::GoogleGenAiProvider;
use crate::roadmap::RoadmapGenerator;
use crate::server::{self, AppState, DashboardResponse};
use crate::state::SqliteStateStore;
use crate::traits::StateStore;

/// Everything a command needs, wired from config.
pub struct Services {
    pub store: Arc<dyn StateStore>,
    pub ingestor: Arc<OnboardingIngestor>,
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<Services> {
    // 1. State store
    let store: Arc<dyn StateStore> = Arc::new(SqliteStateStore::new(&config.state.db_path).await?);
    info!("State store initialized ({})", config.state.db_path);

    // 2. Provider
    if config.provider.api_key.is_empty() {
        warn!("Gemini API key not configured; onboarding requests will fail until GEMINI_API_KEY is set");
    } else {
        info!(model = %config.provider.model, "Gemini provider configured");
    }
    let provider = Arc::new(GoogleGenAiProvider::with_timeout(
        &config.provider.api_key,
        Some(&config.provider.base_url),
        Duration::from_secs(config.provider.timeout_secs),
    )?);

    // 3. Ingestor
    let generator = RoadmapGenerator::new(provider, config.provider.model.clone());
    let ingestor = Arc::new(OnboardingIngestor::new(store.clone(), generator));

    Ok(Services { store, ingestor })
}

/// `serve`: run the HTTP API until the process is stopped.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let services = build_services(&config).await?;
    let state = AppState {
        store: services.store,
        ingestor: services.ingestor,
    };
    server::start_server(state, config.server.port, &config.server.bind_addr).await
}

/// `dashboard <user_id>`: print the dashboard JSON.
pub async fn print_dashboard(config: AppConfig, user_id: &str) -> anyhow::Result<()> {
    let services = build_services(&config).await?;
    let data = dashboard::load_dashboard(services.store.as_ref(), user_id).await?;
    let metrics = DashboardMetrics::from_data(&data);
    let out = serde_json::to_string_pretty(&DashboardResponse { data, metrics })?;
    println!("{}", out);
    Ok(())
}

/// `onboard <user_id> <answers.json>`: run onboarding from a JSON file.
pub async fn onboard_from_file(
    config: AppConfig,
    user_id: &str,
    answers_path: &Path,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(answers_path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", answers_path.display(), e))?;
    let answers: OnboardingAnswers = serde_json::from_str(&content)?;

    let services = build_services(&config).await?;
    let ack = services.ingestor.process(user_id, &answers).await?;
    println!("{}", serde_json::to_string_pretty(&ack)?);
    Ok(())
}
