//! Test infrastructure: MockProvider, canned roadmap JSON, and a temp-file
//! backed store.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use crate::providers::ProviderError;
use crate::state::SqliteStateStore;
use crate::traits::{ModelProvider, ProviderResponse, TokenUsage};

// ---------------------------------------------------------------------------
// MockProvider
// ---------------------------------------------------------------------------

/// A recorded call to `MockProvider::generate()`.
#[derive(Debug, Clone)]
pub struct MockGenerateCall {
    pub model: String,
    pub prompt: String,
}

/// Mock LLM provider that returns scripted responses.
pub struct MockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    failure: Option<ProviderError>,
    pub call_log: Mutex<Vec<MockGenerateCall>>,
}

impl MockProvider {
    /// Create a provider that always returns a small valid roadmap.
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    /// Create a provider with a FIFO queue of scripted responses.
    pub fn with_responses(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            failure: None,
            call_log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_texts(texts: Vec<String>) -> Self {
        Self::with_responses(texts.iter().map(|t| Self::text_response(t)).collect())
    }

    /// Every call fails with a clone of `err`.
    pub fn failing(err: ProviderError) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            failure: Some(err),
            call_log: Mutex::new(Vec::new()),
        }
    }

    /// Helper: build a text-only ProviderResponse.
    pub fn text_response(text: &str) -> ProviderResponse {
        ProviderResponse {
            content: Some(text.to_string()),
            usage: Some(TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
                model: "mock".to_string(),
            }),
            response_note: None,
        }
    }

    /// How many times `generate()` was called.
    pub async fn call_count(&self) -> usize {
        self.call_log.lock().await.len()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn generate(&self, model: &str, prompt: &str) -> anyhow::Result<ProviderResponse> {
        self.call_log.lock().await.push(MockGenerateCall {
            model: model.to_string(),
            prompt: prompt.to_string(),
        });

        if let Some(err) = &self.failure {
            return Err(err.clone().into());
        }

        let mut responses = self.responses.lock().await;
        if responses.is_empty() {
            Ok(MockProvider::text_response(&sample_roadmap_json(1, 1, 1, 1, 1)))
        } else {
            Ok(responses.remove(0))
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A well-formed roadmap with the requested fan-out at every level.
/// Task priorities cycle high/medium/low; habits alternate daily/weekly.
pub fn sample_roadmap_json(
    goals: usize,
    milestones_per_goal: usize,
    tasks_per_milestone: usize,
    todos_per_task: usize,
    habits: usize,
) -> String {
    let priorities = ["high", "medium", "low"];
    let goals: Vec<_> = (0..goals)
        .map(|g| {
            let milestones: Vec<_> = (0..milestones_per_goal)
                .map(|m| {
                    let tasks: Vec<_> = (0..tasks_per_milestone)
                        .map(|t| {
                            let todos: Vec<_> = (0..todos_per_task)
                                .map(|d| {
                                    json!({
                                        "name": format!("Todo {}.{}.{}.{}", g, m, t, d),
                                        "targetDate": format!("2030-01-{:02}", d + 1),
                                    })
                                })
                                .collect();
                            json!({
                                "name": format!("Task {}.{}.{}", g, m, t),
                                "description": "Do the thing",
                                "priority": priorities[t % priorities.len()],
                                "todos": todos,
                            })
                        })
                        .collect();
                    json!({
                        "name": format!("Milestone {}.{}", g, m),
                        "description": "A step forward",
                        "targetDate": "2030-06-30",
                        "tasks": tasks,
                    })
                })
                .collect();
            json!({
                "name": format!("Goal {}", g),
                "description": "Something worth doing",
                "milestones": milestones,
            })
        })
        .collect();

    let habits: Vec<_> = (0..habits)
        .map(|h| {
            json!({
                "name": format!("Habit {}", h),
                "description": "Keep at it",
                "recurrence": if h % 2 == 0 { "daily" } else { "weekly" },
                "difficulty": "beginner",
            })
        })
        .collect();

    json!({
        "goals": goals,
        "habits": habits,
        "idealSelfProfile": {
            "traits": ["disciplined", "calm"],
            "skills": ["budgeting"],
            "lifestyle": ["early riser"],
        }
    })
    .to_string()
}

/// A fresh store backed by a temp file. Keep the returned file alive for the
/// duration of the test.
pub async fn temp_store() -> (Arc<SqliteStateStore>, tempfile::NamedTempFile) {
    let db_file = tempfile::NamedTempFile::new().unwrap();
    let store = SqliteStateStore::new(db_file.path().to_str().unwrap())
        .await
        .unwrap();
    (Arc::new(store), db_file)
}
