//! Tolerant extraction of a structured result from model output.
//!
//! Models wrap JSON in prose or markdown fences inconsistently, so the
//! reader tries, in order:
//! 1. a `` ```json `` fenced block,
//! 2. the span from the first `{` to the last `}`,
//! 3. the whole trimmed text.
//!
//! The first strategy that yields valid JSON wins. That JSON must then match
//! the requested shape exactly, otherwise the whole decode fails.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::models::{BreathingPattern, CategoryAdvice, MeditationScript, WellnessPlan};

const FENCE_OPEN: &str = "```json\n";
const FENCE_CLOSE: &str = "```";

#[derive(Debug, Error)]
pub enum DecodeError {
    /// `raw` is kept for server-side logs only.
    #[error("invalid AI response: {reason}")]
    InvalidAiResponse { reason: String, raw: String },
}

impl DecodeError {
    fn invalid(reason: impl Into<String>, raw: &str) -> Self {
        DecodeError::InvalidAiResponse {
            reason: reason.into(),
            raw: raw.to_owned(),
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            DecodeError::InvalidAiResponse { raw, .. } => raw,
        }
    }
}

/// Value checks that serde's field presence rules can't express.
pub trait Shape: DeserializeOwned {
    fn check(&self) -> Result<(), String>;
}

fn percent(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} must be within 0..=100, got {value}"))
    }
}

fn category(name: &str, advice: &CategoryAdvice) -> Result<(), String> {
    percent(&format!("{name}.confidence"), advice.confidence)
}

impl Shape for WellnessPlan {
    fn check(&self) -> Result<(), String> {
        category("diet", &self.diet.base)?;
        category("exercise", &self.exercise)?;
        category("sleep", &self.sleep)?;
        category("stress", &self.stress)?;

        let m = &self.diet.macros;
        percent("diet.macros.protein", m.protein)?;
        percent("diet.macros.carbs", m.carbs)?;
        percent("diet.macros.fat", m.fat)
    }
}

impl Shape for MeditationScript {
    fn check(&self) -> Result<(), String> {
        if let Some(BreathingPattern { inhale, hold, exhale }) = &self.breathing_pattern {
            for (field, secs) in [("inhale", inhale), ("hold", hold), ("exhale", exhale)] {
                if !secs.is_finite() || *secs < 0.0 {
                    return Err(format!("breathingPattern.{field} must be a non-negative number"));
                }
            }
        }
        Ok(())
    }
}

fn parse(candidate: &str) -> Option<Value> {
    serde_json::from_str(candidate.trim()).ok()
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE_OPEN)? + FENCE_OPEN.len();
    let len = text[start..].find(FENCE_CLOSE)?;
    Some(&text[start..start + len])
}

/// Greedy on purpose: two sibling objects produce one unparseable span.
fn brace_span(text: &str) -> Option<&str> {
    let first = text.find('{')?;
    let last = text.rfind('}')?;
    (first < last).then(|| &text[first..=last])
}

/// Runs the three strategies and returns the first JSON value found.
pub fn extract_json(text: &str) -> Option<Value> {
    fenced_block(text)
        .and_then(parse)
        .or_else(|| brace_span(text).and_then(parse))
        .or_else(|| parse(text))
}

pub fn decode<T: Shape>(raw: &str) -> Result<T, DecodeError> {
    let value = extract_json(raw).ok_or_else(|| DecodeError::invalid("no JSON found", raw))?;
    let decoded: T = serde_json::from_value(value)
        .map_err(|e| DecodeError::invalid(format!("unexpected shape: {e}"), raw))?;
    decoded
        .check()
        .map_err(|reason| DecodeError::invalid(reason, raw))?;
    Ok(decoded)
}

pub fn decode_plan(raw: &str) -> Result<WellnessPlan, DecodeError> {
    decode(raw)
}

pub fn decode_meditation(raw: &str) -> Result<MeditationScript, DecodeError> {
    decode(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DietAdvice, Macros};
    use serde_json::json;

    fn plan_json() -> Value {
        json!({
            "summary": "ok",
            "keyFactors": ["short sleep", "desk job"],
            "diet": {
                "advice": "Eat more fibre.",
                "reasoning": "Supports digestion.",
                "confidence": 82,
                "macros": { "protein": 30, "carbs": 45, "fat": 25 }
            },
            "exercise": { "advice": "Walk daily.", "reasoning": "Low impact.", "confidence": 90 },
            "sleep": { "advice": "Fixed bedtime.", "reasoning": "Rhythm.", "confidence": 75.5 },
            "stress": { "advice": "Breathe.", "reasoning": "Calms.", "confidence": 60 }
        })
    }

    fn expected_plan() -> WellnessPlan {
        let cat = |advice: &str, reasoning: &str, confidence: f64| CategoryAdvice {
            advice: advice.into(),
            reasoning: reasoning.into(),
            confidence,
        };
        WellnessPlan {
            summary: "ok".into(),
            key_factors: vec!["short sleep".into(), "desk job".into()],
            diet: DietAdvice {
                base: cat("Eat more fibre.", "Supports digestion.", 82.0),
                macros: Macros { protein: 30.0, carbs: 45.0, fat: 25.0 },
            },
            exercise: cat("Walk daily.", "Low impact.", 90.0),
            sleep: cat("Fixed bedtime.", "Rhythm.", 75.5),
            stress: cat("Breathe.", "Calms.", 60.0),
        }
    }

    #[test]
    fn fenced_plan_inside_prose() {
        let raw = format!(
            "Sure! Here is your plan:\n```json\n{}\n```\nStay healthy {{:}}",
            serde_json::to_string_pretty(&plan_json()).unwrap()
        );
        assert_eq!(decode_plan(&raw).unwrap(), expected_plan());
    }

    #[test]
    fn brace_span_without_fence() {
        let raw = format!("Here you go: {} Hope it helps.", plan_json());
        assert_eq!(decode_plan(&raw).unwrap(), expected_plan());
    }

    #[test]
    fn whole_text_json() {
        let raw = plan_json().to_string();
        assert_eq!(decode_plan(&raw).unwrap(), expected_plan());
    }

    #[test]
    fn unparseable_fence_falls_back_to_brace_span() {
        let raw = format!("```json\nnot json at all\n``` and then {}", plan_json());
        assert_eq!(decode_plan(&raw).unwrap(), expected_plan());
    }

    #[test]
    fn meditation_without_fence() {
        let raw = r#"{"title":"Calm","script":"Close your eyes.\n\nBreathe in."}"#;
        let script = decode_meditation(raw).unwrap();
        assert_eq!(script.title, "Calm");
        assert_eq!(script.script, "Close your eyes.\n\nBreathe in.");
        assert!(script.breathing_pattern.is_none());
        assert!(script.affirmations.is_empty());
    }

    #[test]
    fn meditation_with_breathing_pattern() {
        let raw = "```json\n{\"title\":\"Box\",\"script\":\"In.\",\"breathingPattern\":{\"inhale\":4,\"hold\":4,\"exhale\":6},\"affirmations\":[\"I am calm\"]}\n```";
        let script = decode_meditation(raw).unwrap();
        assert_eq!(
            script.breathing_pattern,
            Some(BreathingPattern { inhale: 4.0, hold: 4.0, exhale: 6.0 })
        );
        assert_eq!(script.affirmations, vec!["I am calm"]);
    }

    #[test]
    fn plain_refusal_is_invalid_and_keeps_raw() {
        let raw = "I couldn't generate that.";
        let err = decode_plan(raw).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidAiResponse { .. }));
        assert_eq!(err.raw(), raw);
        assert!(!err.to_string().contains(raw));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut value = plan_json();
        value.as_object_mut().unwrap().remove("stress");
        let err = decode_plan(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("unexpected shape"));
    }

    #[test]
    fn missing_macros_is_rejected() {
        let mut value = plan_json();
        value["diet"].as_object_mut().unwrap().remove("macros");
        assert!(decode_plan(&value.to_string()).is_err());
    }

    #[test]
    fn confidence_out_of_range_is_rejected() {
        let mut value = plan_json();
        value["sleep"]["confidence"] = json!(140);
        let err = decode_plan(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("sleep.confidence"));
    }

    #[test]
    fn negative_breathing_is_rejected() {
        let raw = r#"{"title":"x","script":"y","breathingPattern":{"inhale":-1,"hold":0,"exhale":4}}"#;
        assert!(decode_meditation(raw).is_err());
    }

    #[test]
    fn two_sibling_objects_are_not_disambiguated() {
        let raw = r#"{"title":"A","script":"a"} and {"title":"B","script":"b"}"#;
        assert!(extract_json(raw).is_none());
        assert!(decode_meditation(raw).is_err());
    }

    #[test]
    fn reversed_braces_are_ignored() {
        assert!(brace_span("} then {").is_none());
        assert!(extract_json("} then {").is_none());
    }

    #[test]
    fn fence_requires_newline_after_tag() {
        assert!(fenced_block("```json{\"a\":1}```").is_none());
        assert_eq!(fenced_block("x```json\n{\"a\":1}\n```y"), Some("{\"a\":1}\n"));
    }

    #[test]
    fn valid_json_of_wrong_shape_does_not_fall_through() {
        // The fenced value parses, so later strategies are not consulted.
        let raw = format!("```json\n{{\"unrelated\":true}}\n```\n{}", plan_json());
        assert!(decode_plan(&raw).is_err());
    }

    #[test]
    fn empty_input_is_invalid() {
        assert!(decode_plan("").is_err());
        assert!(decode_plan("   \n").is_err());
    }
}
