//! LLM-based roadmap generation.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error, info};

use super::GENERATION_FAILED;
use crate::providers::ProviderError;
use crate::traits::{GeneratedRoadmap, ModelProvider, RoadmapRequest};
use crate::utils::truncate_str;

const ROADMAP_FORMAT: &str = r#"Return ONLY valid JSON in this exact format (no markdown, no code blocks):
{
  "goals": [
    {
      "name": "Goal name",
      "description": "Detailed description",
      "milestones": [
        {
          "name": "Milestone name",
          "description": "Description",
          "targetDate": "YYYY-MM-DD",
          "tasks": [
            {
              "name": "Task name",
              "description": "Description",
              "priority": "high|medium|low",
              "todos": [
                {
                  "name": "Todo name",
                  "targetDate": "YYYY-MM-DD"
                }
              ]
            }
          ]
        }
      ]
    }
  ],
  "habits": [
    {
      "name": "Habit name",
      "description": "Description",
      "recurrence": "daily|weekly",
      "difficulty": "beginner|intermediate|advanced"
    }
  ],
  "idealSelfProfile": {
    "traits": ["trait1", "trait2"],
    "skills": ["skill1", "skill2"],
    "lifestyle": ["lifestyle1", "lifestyle2"]
  }
}"#;

/// Build the single prompt sent to the model. Every questionnaire field gets
/// its own labeled line.
pub fn build_roadmap_prompt(request: &RoadmapRequest) -> String {
    let priority_areas = if request.priority_areas.is_empty() {
        "None specified".to_string()
    } else {
        request.priority_areas.join(", ")
    };
    let constraints = match request.constraints.trim() {
        "" => "None specified",
        c => c,
    };

    format!(
        "You are an AI life coach helping someone transform into their ideal self.\n\n\
         Based on their answers, create a comprehensive, actionable roadmap broken down into manageable pieces.\n\n\
         USER'S ANSWERS:\n\
         1. Ideal Self Vision: {vision}\n\
         2. Strategic Focus Areas: {priority_areas}\n\
         3. Financial North Star: {financial}\n\
         4. Health & Energy Vision: {health}\n\
         5. Signature Habits (bullets allowed): {habits}\n\
         6. Constraints & Preferences: {constraints}\n\n\
         Create a detailed roadmap with:\n\
         - 2-3 specific, measurable GOALS (related to their ideal self)\n\
         - For each goal, create 2-3 MILESTONES (steps toward the goal)\n\
         - For each milestone, create 3-5 specific TASKS (actionable items)\n\
         - For each task, create 2-4 specific TODOS (daily/weekly actions)\n\
         - 3-5 HABITS that support becoming their ideal self\n\
         - An IDEAL SELF PROFILE with key traits, skills, and lifestyle attributes\n\n\
         {format}\n\n\
         Make it practical, achievable, and inspiring. Focus on small, consistent actions over time.",
        vision = request.ideal_self_vision,
        priority_areas = priority_areas,
        financial = request.financial_vision,
        health = request.health_vision,
        habits = request.signature_habits,
        constraints = constraints,
        format = ROADMAP_FORMAT,
    )
}

/// Remove Markdown code-fence markers the model sometimes adds despite being
/// told not to.
pub fn strip_code_fences(text: &str) -> String {
    static JSON_FENCE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)```json\n?").expect("json fence regex should compile"));
    static FENCE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"```\n?").expect("fence regex should compile"));

    let without_json = JSON_FENCE_RE.replace_all(text, "");
    FENCE_RE.replace_all(&without_json, "").trim().to_string()
}

/// Sends questionnaire answers to the model and parses the returned roadmap.
pub struct RoadmapGenerator {
    provider: Arc<dyn ModelProvider>,
    model: String,
}

impl RoadmapGenerator {
    pub fn new(provider: Arc<dyn ModelProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Generate a roadmap. Every failure is logged with its cause and then
    /// reported as [`GENERATION_FAILED`]; the cause stays in the error chain.
    pub async fn generate(&self, request: &RoadmapRequest) -> anyhow::Result<GeneratedRoadmap> {
        match self.try_generate(request).await {
            Ok(roadmap) => Ok(roadmap),
            Err(e) => {
                error!(model = %self.model, error = %e, "Error generating roadmap");
                Err(e.context(GENERATION_FAILED))
            }
        }
    }

    async fn try_generate(&self, request: &RoadmapRequest) -> anyhow::Result<GeneratedRoadmap> {
        let prompt = build_roadmap_prompt(request);
        let response = self.provider.generate(&self.model, &prompt).await?;
        if let Some(usage) = &response.usage {
            debug!(
                model = %usage.model,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Roadmap generation token usage"
            );
        }

        let Some(text) = response.content.filter(|t| !t.trim().is_empty()) else {
            let note = response
                .response_note
                .map(|n| format!(" ({})", n))
                .unwrap_or_default();
            return Err(ProviderError::empty_response(format!("No response from Gemini AI{}", note)).into());
        };

        let cleaned = strip_code_fences(&text);
        let roadmap: GeneratedRoadmap = serde_json::from_str(&cleaned).map_err(|e| {
            anyhow::anyhow!(
                "Failed to parse roadmap JSON: {}. Text was: {}",
                e,
                truncate_str(&cleaned, 200)
            )
        })?;

        info!(
            goals = roadmap.goals.len(),
            milestones = roadmap.milestone_count(),
            tasks = roadmap.task_count(),
            todos = roadmap.todo_count(),
            habits = roadmap.habits.len(),
            "AI roadmap generated"
        );
        Ok(roadmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderErrorKind;
    use crate::testing::{sample_roadmap_json, MockProvider};

    fn request() -> RoadmapRequest {
        RoadmapRequest {
            ideal_self_vision: "A calm, confident founder".to_string(),
            priority_areas: vec!["finance".to_string(), "health".to_string()],
            financial_vision: "Invest $500/month".to_string(),
            health_vision: "Strength training 3x/week".to_string(),
            signature_habits: "Review finances, Meal prep".to_string(),
            constraints: "  ".to_string(),
        }
    }

    #[test]
    fn test_prompt_labels_every_field() {
        let prompt = build_roadmap_prompt(&request());
        assert!(prompt.contains("1. Ideal Self Vision: A calm, confident founder"));
        assert!(prompt.contains("2. Strategic Focus Areas: finance, health"));
        assert!(prompt.contains("3. Financial North Star: Invest $500/month"));
        assert!(prompt.contains("4. Health & Energy Vision: Strength training 3x/week"));
        assert!(prompt.contains("5. Signature Habits (bullets allowed): Review finances, Meal prep"));
        assert!(prompt.contains("6. Constraints & Preferences: None specified"));
        assert!(prompt.contains("\"idealSelfProfile\""));
    }

    #[test]
    fn test_prompt_without_priority_areas() {
        let mut req = request();
        req.priority_areas.clear();
        req.constraints = " mornings only ".to_string();
        let prompt = build_roadmap_prompt(&req);
        assert!(prompt.contains("2. Strategic Focus Areas: None specified"));
        assert!(prompt.contains("6. Constraints & Preferences: mornings only\n"));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```JSON\n{}```"), "{}");
        assert_eq!(strip_code_fences("```\n[1]\n```\n"), "[1]");
        assert_eq!(strip_code_fences("  {\"plain\":true}  "), "{\"plain\":true}");
    }

    #[tokio::test]
    async fn test_generate_parses_fenced_roadmap() {
        let fenced = format!("```json\n{}\n```", sample_roadmap_json(2, 2, 3, 2, 3));
        let provider = Arc::new(MockProvider::with_texts(vec![fenced]));
        let generator = RoadmapGenerator::new(provider.clone(), "gemini-1.5-flash");

        let roadmap = generator.generate(&request()).await.unwrap();
        assert_eq!(roadmap.goals.len(), 2);
        assert_eq!(roadmap.milestone_count(), 4);
        assert_eq!(roadmap.task_count(), 12);
        assert_eq!(roadmap.todo_count(), 24);
        assert_eq!(roadmap.habits.len(), 3);
        assert_eq!(roadmap.ideal_self_profile.traits, vec!["disciplined", "calm"]);

        let calls = provider.call_log.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "gemini-1.5-flash");
        assert!(calls[0].prompt.contains("A calm, confident founder"));
    }

    #[tokio::test]
    async fn test_empty_response_is_generic_but_keeps_cause() {
        let provider = Arc::new(MockProvider::with_responses(vec![Default::default()]));
        let generator = RoadmapGenerator::new(provider, "m");

        let err = generator.generate(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), GENERATION_FAILED);
        let cause = err.downcast_ref::<ProviderError>().unwrap();
        assert_eq!(cause.kind, ProviderErrorKind::EmptyResponse);
        assert!(cause.message.contains("No response from Gemini AI"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_generic() {
        let provider = Arc::new(MockProvider::with_texts(vec![
            "Here is your roadmap: goals!".to_string()
        ]));
        let generator = RoadmapGenerator::new(provider, "m");

        let err = generator.generate(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), GENERATION_FAILED);
        assert!(format!("{:#}", err).contains("Failed to parse roadmap JSON"));
    }

    #[tokio::test]
    async fn test_provider_error_is_wrapped() {
        let provider = Arc::new(MockProvider::failing(ProviderError::config("no key")));
        let generator = RoadmapGenerator::new(provider, "m");

        let err = generator.generate(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), GENERATION_FAILED);
        assert_eq!(
            err.downcast_ref::<ProviderError>().unwrap().kind,
            ProviderErrorKind::Config
        );
    }
}
