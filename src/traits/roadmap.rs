use serde::{Deserialize, Serialize};

/// The questionnaire fields forwarded to the roadmap generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapRequest {
    pub ideal_self_vision: String,
    pub priority_areas: Vec<String>,
    pub financial_vision: String,
    pub health_vision: String,
    /// Already normalized and joined with ", ".
    pub signature_habits: String,
    pub constraints: String,
}

/// The nested tree the model returns for one onboarding submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRoadmap {
    #[serde(default)]
    pub goals: Vec<GeneratedGoal>,
    #[serde(default)]
    pub habits: Vec<GeneratedHabit>,
    #[serde(default)]
    pub ideal_self_profile: GeneratedIdealSelfProfile,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedGoal {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub milestones: Vec<GeneratedMilestone>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMilestone {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `YYYY-MM-DD`
    pub target_date: String,
    #[serde(default)]
    pub tasks: Vec<GeneratedTask>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTask {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// "high" | "medium" | "low"; anything else is stored as medium.
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub todos: Vec<GeneratedTodo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTodo {
    pub name: String,
    pub target_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedHabit {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub recurrence: String,
    /// "beginner" | "intermediate" | "advanced". Not persisted.
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedIdealSelfProfile {
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub lifestyle: Vec<String>,
}

impl GeneratedRoadmap {
    pub fn milestone_count(&self) -> usize {
        self.goals.iter().map(|g| g.milestones.len()).sum()
    }

    pub fn task_count(&self) -> usize {
        self.goals
            .iter()
            .flat_map(|g| &g.milestones)
            .map(|m| m.tasks.len())
            .sum()
    }

    pub fn todo_count(&self) -> usize {
        self.goals
            .iter()
            .flat_map(|g| &g.milestones)
            .flat_map(|m| &m.tasks)
            .map(|t| t.todos.len())
            .sum()
    }
}
