use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Accepts a JSON string, number, bool or null and keeps it as text.
/// The browser form sends numeric inputs either way.
fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthProfile {
    #[serde(deserialize_with = "loose_string")]
    pub age: String,
    pub gender: String,
    #[serde(deserialize_with = "loose_string")]
    pub weight: String,
    #[serde(deserialize_with = "loose_string")]
    pub height: String,
    pub activity_level: String,
    pub conditions: Vec<String>,
    pub diet_preference: String,
    #[serde(deserialize_with = "loose_string")]
    pub sleep_hours: String,
    pub goals: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_goal: Option<String>,
    pub stress_level: String,
    pub sleep_quality: String,
    pub alcohol_consumption: String,
    pub smoking_habits: String,
    pub work_life_balance: String,
    /// Client-side extras such as `name` or `createdAt`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAdvice {
    pub advice: String,
    pub reasoning: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietAdvice {
    #[serde(flatten)]
    pub base: CategoryAdvice,
    pub macros: Macros,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessPlan {
    pub summary: String,
    pub key_factors: Vec<String>,
    pub diet: DietAdvice,
    pub exercise: CategoryAdvice,
    pub sleep: CategoryAdvice,
    pub stress: CategoryAdvice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeditationType {
    Breathing,
    BodyScan,
    Visualization,
    Mindfulness,
    Sleep,
    #[default]
    Guided,
}

impl MeditationType {
    pub fn label(self) -> &'static str {
        match self {
            MeditationType::Breathing => "Breathing Exercise",
            MeditationType::BodyScan => "Body Scan",
            MeditationType::Visualization => "Visualization",
            MeditationType::Mindfulness => "Mindfulness",
            MeditationType::Sleep => "Sleep Meditation",
            MeditationType::Guided => "Guided Relaxation",
        }
    }
}

impl fmt::Display for MeditationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeditationRequest {
    pub stress_source: String,
    pub current_mood: String,
    pub sleep_quality: String,
    pub meditation_type: MeditationType,
    #[serde(deserialize_with = "loose_string")]
    pub duration: String,
    pub additional_context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathingPattern {
    pub inhale: f64,
    pub hold: f64,
    pub exhale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeditationScript {
    pub title: String,
    pub script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breathing_pattern: Option<BreathingPattern>,
    #[serde(default)]
    pub affirmations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MeditationResponse {
    #[serde(flatten)]
    pub meditation: MeditationScript,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub profile: HealthProfile,
    pub recommendations: Value,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewPlanRecord {
    pub profile: HealthProfile,
    pub recommendations: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub weight: Value,
    pub sleep: Value,
    pub mood: Value,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewProgressEntry {
    pub weight: Value,
    pub sleep: Value,
    #[serde(default)]
    pub mood: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeditationEntry {
    pub title: String,
    pub stress_source: String,
    pub mood: String,
    #[serde(rename = "type")]
    pub meditation_type: MeditationType,
    pub duration: String,
    pub script: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeditationEntry {
    pub title: String,
    #[serde(default)]
    pub stress_source: String,
    #[serde(default)]
    pub mood: String,
    #[serde(rename = "type", default)]
    pub meditation_type: MeditationType,
    #[serde(deserialize_with = "loose_string", default)]
    pub duration: String,
    pub script: String,
}
