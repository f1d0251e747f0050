use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{iso, require_user_id, DashboardError};
use crate::traits::{Reflection, StateStore};
use crate::utils::non_empty_trimmed;

const REFLECTION_FAILED: &str = "Failed to save reflection. Please try again.";
const REFLECTIONS_FAILED: &str = "Failed to load reflections. Please try again.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionView {
    pub id: String,
    pub content: String,
    pub mood: Option<String>,
    pub sentiment_score: Option<f64>,
    pub created_at: String,
}

impl From<&Reflection> for ReflectionView {
    fn from(r: &Reflection) -> Self {
        Self {
            id: r.id.clone(),
            content: r.content.clone(),
            mood: r.mood.clone(),
            sentiment_score: r.sentiment_score,
            created_at: iso(r.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionSummary {
    pub total: usize,
    pub last_seven_days: usize,
    /// Mean over analyzed entries only.
    pub average_sentiment: Option<f64>,
}

impl ReflectionSummary {
    pub fn from_reflections(reflections: &[Reflection], now: DateTime<Utc>) -> Self {
        let week_ago = now - Duration::days(7);
        let scores: Vec<f64> = reflections.iter().filter_map(|r| r.sentiment_score).collect();
        let average_sentiment = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        };
        Self {
            total: reflections.len(),
            last_seven_days: reflections.iter().filter(|r| r.created_at >= week_ago).count(),
            average_sentiment,
        }
    }
}

pub async fn create_reflection(
    store: &dyn StateStore,
    user_id: &str,
    content: &str,
    mood: Option<&str>,
) -> Result<ReflectionView, DashboardError> {
    let user_id = require_user_id(user_id)?;
    let content = non_empty_trimmed(content)
        .ok_or_else(|| DashboardError::Invalid("Reflection content is required.".to_string()))?;

    let now = Utc::now();
    let reflection = Reflection {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        content,
        sentiment_score: None,
        keywords: None,
        mood: mood.and_then(non_empty_trimmed),
        analyzed_at: None,
        created_at: now,
        updated_at: now,
    };

    store
        .ensure_user(user_id)
        .await
        .map_err(|e| DashboardError::failed(REFLECTION_FAILED, e))?;
    store
        .create_reflection(&reflection)
        .await
        .map_err(|e| DashboardError::failed(REFLECTION_FAILED, e))?;
    Ok(ReflectionView::from(&reflection))
}

/// Newest first, plus the summary over all of them.
pub async fn list_reflections(
    store: &dyn StateStore,
    user_id: &str,
) -> Result<(Vec<ReflectionView>, ReflectionSummary), DashboardError> {
    let user_id = require_user_id(user_id)?;
    let rows = store
        .list_reflections(user_id)
        .await
        .map_err(|e| DashboardError::failed(REFLECTIONS_FAILED, e))?;
    let summary = ReflectionSummary::from_reflections(&rows, Utc::now());
    Ok((rows.iter().map(ReflectionView::from).collect(), summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::temp_store;

    fn reflection(days_ago: i64, score: Option<f64>) -> Reflection {
        let at = Utc::now() - Duration::days(days_ago);
        Reflection {
            id: Uuid::new_v4().to_string(),
            user_id: "u1".to_string(),
            content: "entry".to_string(),
            sentiment_score: score,
            keywords: None,
            mood: None,
            analyzed_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_summary() {
        let rows = vec![
            reflection(1, Some(0.5)),
            reflection(3, None),
            reflection(10, Some(-0.1)),
        ];
        let summary = ReflectionSummary::from_reflections(&rows, Utc::now());
        assert_eq!(summary.total, 3);
        assert_eq!(summary.last_seven_days, 2);
        assert!((summary.average_sentiment.unwrap() - 0.2).abs() < 1e-9);

        let empty = ReflectionSummary::from_reflections(&[], Utc::now());
        assert_eq!(empty.total, 0);
        assert_eq!(empty.average_sentiment, None);
    }

    #[tokio::test]
    async fn test_create_and_list_newest_first() {
        let (store, _db) = temp_store().await;
        create_reflection(store.as_ref(), "u1", "  first  ", Some("calm"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = create_reflection(store.as_ref(), "u1", "second", Some(" "))
            .await
            .unwrap();
        assert_eq!(second.mood, None);

        let (list, summary) = list_reflections(store.as_ref(), "u1").await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].content, "second");
        assert_eq!(list[1].content, "first");
        assert_eq!(list[1].mood.as_deref(), Some("calm"));
        assert_eq!(summary.total, 2);
        assert_eq!(summary.last_seven_days, 2);
        assert_eq!(summary.average_sentiment, None);
    }

    #[tokio::test]
    async fn test_blank_content_rejected() {
        let (store, _db) = temp_store().await;
        let err = create_reflection(store.as_ref(), "u1", "   ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Invalid(_)));
        let (list, _) = list_reflections(store.as_ref(), "u1").await.unwrap();
        assert!(list.is_empty());
    }
}
