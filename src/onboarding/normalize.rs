//! Pure transformations from questionnaire answers plus a generated roadmap
//! into rows ready for the store.

use anyhow::{anyhow, Context};
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use super::OnboardingAnswers;
use crate::traits::{
    GeneratedRoadmap, Goal, Habit, IdealSelf, Milestone, RoadmapRecords, RoadmapRequest, Task,
    Todo,
};
use crate::types::{GoalStatus, Priority, Recurrence};
use crate::utils::non_empty_trimmed;

static LINE_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n|•").expect("line split regex should compile"));
static LEADING_BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s•\-]+").expect("leading bullet regex should compile"));

/// Split free text into list items on newlines or `•`, strip leading
/// bullets, dashes and whitespace, and drop empty items.
pub fn signature_habits_to_list(text: &str) -> Vec<String> {
    LINE_SPLIT_RE
        .split(text)
        .map(|line| LEADING_BULLET_RE.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Trim each area and drop the empty ones.
pub fn sanitize_priority_areas(areas: &[String]) -> Vec<String> {
    areas
        .iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect()
}

/// Parse a model-provided date. `YYYY-MM-DD` maps to midnight UTC; full
/// RFC 3339 timestamps are accepted as-is.
pub fn parse_target_date(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| anyhow!("Invalid target date: {:?}", raw))
}

/// Sanitized inputs shared by the generator request and the profile row.
#[derive(Debug, Clone)]
pub struct NormalizedAnswers {
    pub vision: String,
    pub priority_areas: Vec<String>,
    pub financial_vision: Option<String>,
    pub health_vision: Option<String>,
    pub signature_habits: Vec<String>,
    pub constraints: Option<String>,
}

impl NormalizedAnswers {
    pub fn from_answers(answers: &OnboardingAnswers) -> Self {
        Self {
            vision: answers.ideal_self_vision.trim().to_string(),
            priority_areas: sanitize_priority_areas(&answers.priority_areas),
            financial_vision: non_empty_trimmed(&answers.financial_vision),
            health_vision: non_empty_trimmed(&answers.health_vision),
            signature_habits: signature_habits_to_list(&answers.signature_habits),
            constraints: non_empty_trimmed(&answers.constraints),
        }
    }

    pub fn to_request(&self) -> RoadmapRequest {
        RoadmapRequest {
            ideal_self_vision: self.vision.clone(),
            priority_areas: self.priority_areas.clone(),
            financial_vision: self.financial_vision.clone().unwrap_or_default(),
            health_vision: self.health_vision.clone().unwrap_or_default(),
            signature_habits: self.signature_habits.join(", "),
            constraints: self.constraints.clone().unwrap_or_default(),
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn string_list(items: &[String]) -> Value {
    Value::from(items.to_vec())
}

/// Flatten a generated roadmap into rows with fresh ids, parents first.
///
/// Fails on the first unparseable target date so nothing is written.
pub fn build_records(
    user_id: &str,
    answers: &NormalizedAnswers,
    roadmap: &GeneratedRoadmap,
    now: DateTime<Utc>,
) -> anyhow::Result<RoadmapRecords> {
    let ideal_self_id = new_id();
    let goal_names: Vec<String> = roadmap.goals.iter().map(|g| g.name.clone()).collect();
    let priority_areas = string_list(&answers.priority_areas);

    let ideal_self = IdealSelf {
        id: ideal_self_id.clone(),
        user_id: user_id.to_string(),
        description: answers.vision.clone(),
        traits: Some(string_list(&roadmap.ideal_self_profile.traits)),
        areas_to_improve: Some(priority_areas.clone()),
        priority_areas: Some(priority_areas),
        financial_vision: answers.financial_vision.clone(),
        health_vision: answers.health_vision.clone(),
        signature_habits: Some(string_list(&answers.signature_habits)),
        constraints: answers.constraints.clone(),
        goals: Some(string_list(&goal_names)),
        created_at: now,
        updated_at: now,
    };

    let mut records = RoadmapRecords {
        user_id: user_id.to_string(),
        ideal_self,
        goals: Vec::new(),
        milestones: Vec::new(),
        tasks: Vec::new(),
        todos: Vec::new(),
        habits: Vec::new(),
    };

    for goal in &roadmap.goals {
        let goal_id = new_id();
        records.goals.push(Goal {
            id: goal_id.clone(),
            user_id: user_id.to_string(),
            ideal_self_id: Some(ideal_self_id.clone()),
            name: goal.name.clone(),
            description: goal.description.clone(),
            status: GoalStatus::Active,
            created_at: now,
            updated_at: now,
        });

        for milestone in &goal.milestones {
            let milestone_id = new_id();
            let target_date = parse_target_date(&milestone.target_date)
                .with_context(|| format!("milestone {:?}", milestone.name))?;
            records.milestones.push(Milestone {
                id: milestone_id.clone(),
                user_id: user_id.to_string(),
                goal_id: Some(goal_id.clone()),
                name: milestone.name.clone(),
                description: milestone.description.clone(),
                tasks_total: milestone.tasks.len() as i64,
                tasks_completed: 0,
                completion_rate: 0.0,
                target_date: Some(target_date),
                completed_at: None,
                created_at: now,
                updated_at: now,
            });

            for task in &milestone.tasks {
                let task_id = new_id();
                records.tasks.push(Task {
                    id: task_id.clone(),
                    user_id: user_id.to_string(),
                    milestone_id: Some(milestone_id.clone()),
                    name: task.name.clone(),
                    description: task.description.clone(),
                    priority: Priority::from_str(&task.priority),
                    completed_at: None,
                    target_date: None,
                    created_at: now,
                    updated_at: now,
                });

                for todo in &task.todos {
                    let target_date = parse_target_date(&todo.target_date)
                        .with_context(|| format!("todo {:?}", todo.name))?;
                    records.todos.push(Todo {
                        id: new_id(),
                        user_id: user_id.to_string(),
                        task_id: Some(task_id.clone()),
                        name: todo.name.clone(),
                        description: None,
                        is_completed: Some(false),
                        target_date,
                        completed_at: None,
                        created_at: now,
                        updated_at: now,
                    });
                }
            }
        }
    }

    for habit in &roadmap.habits {
        records.habits.push(Habit {
            id: new_id(),
            user_id: user_id.to_string(),
            milestone_id: None,
            name: habit.name.clone(),
            description: habit.description.clone(),
            recurrence: Recurrence::from_str(&habit.recurrence),
            streak_count: Some(0),
            last_completed: None,
            completion_rate: Some(0.0),
            completion_history: Some(Value::Array(Vec::new())),
            created_at: now,
            updated_at: now,
        });
    }

    Ok(records)
}
