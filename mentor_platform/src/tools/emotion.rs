//! Emotion analysis over free text.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use super::{preview, timestamp, Classifier, Tool, ToolContext, ToolFinding};
use crate::policy::PolicyTable;
use crate::scoring::{CategoryTable, ScoreVector};

pub const NAME: &str = "emotion";

pub const NEUTRAL: &str = "neutral";

/// A dominant emotion scoring below this is reported as neutral.
const MIN_PRIMARY_SCORE: f64 = 0.2;

#[derive(Debug, Clone, Serialize)]
pub struct EmotionAssessment {
    pub primary_emotion: String,
    pub emotion_scores: ScoreVector,
    pub assessment: String,
    pub recommendations: Vec<String>,
    pub analysis_timestamp: String,
}

pub struct EmotionAnalysisTool {
    table: CategoryTable,
    policy: PolicyTable,
}

impl Default for EmotionAnalysisTool {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionAnalysisTool {
    pub fn new() -> Self {
        Self {
            table: emotion_table(),
            policy: emotion_policy(),
        }
    }

    pub fn analyze(&self, text: &str) -> EmotionAssessment {
        info!("Emotion analysis on '{}'", preview(text));

        let scores = self.classify(text);
        let primary = scores.dominant_or(MIN_PRIMARY_SCORE, NEUTRAL).to_string();

        EmotionAssessment {
            assessment: assessment_for(&primary).to_string(),
            recommendations: self.policy.recommendations_for(&primary).to_vec(),
            primary_emotion: primary,
            emotion_scores: scores,
            analysis_timestamp: timestamp(),
        }
    }
}

impl Classifier for EmotionAnalysisTool {
    fn classify(&self, text: &str) -> ScoreVector {
        self.table.score(text)
    }
}

impl Tool for EmotionAnalysisTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Analyzes emotional content and sentiment in student responses"
    }

    fn run(&self, ctx: &ToolContext) -> Result<ToolFinding> {
        Ok(ToolFinding::Emotion(self.analyze(&ctx.text)))
    }
}

fn emotion_table() -> CategoryTable {
    CategoryTable::uniform(
        0.2,
        &[
            ("joy", &["happy", "excited", "thrilled", "pleased", "delighted", "enjoy", "fun", "great"]),
            ("sadness", &["sad", "down", "depressed", "unhappy", "miserable", "heartbroken", "upset", "disappointed"]),
            ("anxiety", &["anxious", "worried", "nervous", "stress", "panic", "overwhelm", "fear", "dread", "concern"]),
            ("frustration", &["frustrat", "annoyed", "irritated", "angry", "upset", "difficult", "hard", "struggle"]),
            ("motivation", &["motivated", "inspired", "determined", "driven", "eager", "committed", "enthusiastic"]),
            ("exhaustion", &["tired", "exhausted", "fatigue", "drain", "burnout", "sleep", "rest", "overworked"]),
            ("confidence", &["confident", "sure", "certain", "capable", "able", "competent", "mastery"]),
            ("confusion", &["confused", "unclear", "lost", "uncertain", "puzzled", "don't understand", "complex"]),
            ("hope", &["hope", "optimistic", "anticipate", "look forward", "better", "improve", "progress"]),
        ],
    )
}

fn assessment_for(emotion: &str) -> &'static str {
    match emotion {
        "joy" => "The student appears to be in a positive emotional state, showing signs of happiness and satisfaction.",
        "sadness" => "The student shows indicators of sadness or disappointment that may need attention.",
        "anxiety" => "The student is displaying signs of anxiety or stress that should be addressed.",
        "frustration" => "The student appears frustrated, possibly with academic challenges or other issues.",
        "motivation" => "The student shows good motivation and drive toward their goals.",
        "exhaustion" => "The student appears to be experiencing fatigue or exhaustion that may impact performance.",
        "confidence" => "The student demonstrates confidence in their abilities and approach.",
        "confusion" => "The student seems confused or uncertain about concepts or expectations.",
        "hope" => "The student maintains a hopeful outlook despite challenges.",
        NEUTRAL => "The student's emotional state appears relatively neutral or unclear from the text.",
        _ => "The student's emotional state requires further assessment.",
    }
}

fn emotion_policy() -> PolicyTable {
    PolicyTable::new(["Schedule a follow-up assessment", "Maintain regular check-ins"])
        .with_entry("joy", [
            "Encourage the student to mentor others who may be struggling",
            "Suggest more challenging projects to maintain engagement",
            "Discuss long-term goals to channel positive energy",
        ])
        .with_entry("sadness", [
            "Schedule a follow-up counseling session",
            "Provide resources for mental health support",
            "Consider workload adjustments if academic pressure is contributing",
        ])
        .with_entry("anxiety", [
            "Teach stress management techniques",
            "Review time management strategies",
            "Consider exam or assignment accommodations if needed",
        ])
        .with_entry("frustration", [
            "Identify specific sources of frustration",
            "Connect with tutoring for challenging subjects",
            "Break down complex tasks into manageable steps",
        ])
        .with_entry("motivation", [
            "Channel motivation into specific goal-setting",
            "Connect with student leadership opportunities",
            "Suggest research or advanced project opportunities",
        ])
        .with_entry("exhaustion", [
            "Discuss work-life balance strategies",
            "Review sleep habits and self-care",
            "Consider temporary workload adjustments",
        ])
        .with_entry("confidence", [
            "Encourage peer tutoring or mentoring roles",
            "Suggest participation in academic competitions",
            "Discuss advanced courses or accelerated options",
        ])
        .with_entry("confusion", [
            "Schedule additional office hours with instructors",
            "Connect with study groups or tutoring",
            "Provide clarification resources and examples",
        ])
        .with_entry("hope", [
            "Help develop concrete steps toward goals",
            "Connect with mentors in areas of interest",
            "Provide opportunities to build on positive outlook",
        ])
        .with_entry(NEUTRAL, [
            "Continue regular check-ins",
            "Explore interests and motivations more deeply",
            "Monitor for changes in emotional state",
        ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_neutral() {
        let result = EmotionAnalysisTool::new().analyze("");
        assert_eq!(result.primary_emotion, NEUTRAL);
        assert!(result.emotion_scores.is_all_zero());
        assert_eq!(result.recommendations[0], "Continue regular check-ins");
    }

    #[test]
    fn test_anxiety_dominates_overwhelmed_student() {
        let result = EmotionAnalysisTool::new()
            .analyze("I'm so worried and stressed, honestly overwhelmed and nervous");
        assert_eq!(result.primary_emotion, "anxiety");
        assert_eq!(result.emotion_scores.get("anxiety"), Some(0.8));
        assert_eq!(result.recommendations[0], "Teach stress management techniques");
    }

    #[test]
    fn test_shared_phrase_ties_resolve_to_earlier_category() {
        // "upset" belongs to both sadness and frustration.
        let result = EmotionAnalysisTool::new().analyze("upset");
        assert_eq!(result.emotion_scores.get("sadness"), Some(0.2));
        assert_eq!(result.emotion_scores.get("frustration"), Some(0.2));
        assert_eq!(result.primary_emotion, "sadness");
    }

    #[test]
    fn test_scores_cover_every_category_in_order() {
        let scores = EmotionAnalysisTool::new().classify("great");
        let names: Vec<&str> = scores.iter().map(|(name, _)| name).collect();
        assert_eq!(names[0], "joy");
        assert_eq!(names.len(), 9);
    }
}
