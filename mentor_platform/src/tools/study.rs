//! Study habit indicators and learning-style inference from free text.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use super::{preview, timestamp, Tool, ToolContext, ToolFinding};
use crate::policy::PolicyTable;
use crate::scoring::{CategoryTable, PhraseMatch};

pub const NAME: &str = "study";

/// Learning styles in tie-break order.
const STYLES: [LearningStyleKind; 4] = [
    LearningStyleKind::Visual,
    LearningStyleKind::Auditory,
    LearningStyleKind::ReadingWriting,
    LearningStyleKind::Kinesthetic,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LearningStyleKind {
    Visual,
    Auditory,
    #[serde(rename = "Reading/Writing")]
    ReadingWriting,
    Kinesthetic,
}

impl LearningStyleKind {
    /// Indicator table key.
    fn key(&self) -> &'static str {
        match self {
            LearningStyleKind::Visual => "visual",
            LearningStyleKind::Auditory => "auditory",
            LearningStyleKind::ReadingWriting => "reading/writing",
            LearningStyleKind::Kinesthetic => "kinesthetic",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningStyleKind::Visual => "Visual",
            LearningStyleKind::Auditory => "Auditory",
            LearningStyleKind::ReadingWriting => "Reading/Writing",
            LearningStyleKind::Kinesthetic => "Kinesthetic",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LearningStyleKind::Visual => {
                "Learns best through visual aids, diagrams, charts, and seeing information"
            }
            LearningStyleKind::Auditory => {
                "Learns best through listening, discussing, and processing information verbally"
            }
            LearningStyleKind::ReadingWriting => {
                "Learns best through reading materials and writing notes or summaries"
            }
            LearningStyleKind::Kinesthetic => {
                "Learns best through hands-on activities, practice, and physical engagement"
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StudyIndicators {
    pub time_management_indicators: Vec<String>,
    pub environment_indicators: Vec<String>,
    pub technique_indicators: Vec<String>,
    pub challenge_indicators: Vec<String>,
    pub preference_indicators: Vec<String>,
    #[serde(skip)]
    style_counts: BTreeMap<LearningStyleKind, usize>,
    #[serde(skip)]
    good_time_management: bool,
    #[serde(skip)]
    poor_time_management: bool,
    #[serde(skip)]
    active_technique: bool,
    #[serde(skip)]
    passive_technique: bool,
}

impl StudyIndicators {
    pub fn total(&self) -> usize {
        self.time_management_indicators.len()
            + self.environment_indicators.len()
            + self.technique_indicators.len()
            + self.challenge_indicators.len()
            + self.preference_indicators.len()
    }

    pub fn poor_time_management(&self) -> bool {
        self.poor_time_management
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextInsights {
    pub insight_confidence: String,
    pub detailed_indicators: StudyIndicators,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LearningStyle {
    pub primary_style: LearningStyleKind,
    pub primary_description: String,
    pub secondary_style: LearningStyleKind,
    pub secondary_description: String,
    pub style_breakdown: BTreeMap<LearningStyleKind, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudyRecommendations {
    pub learning_style_based: Vec<String>,
    pub time_management: Vec<String>,
    pub study_environment: Vec<String>,
    pub technology_tools: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudyAnalysis {
    pub text_insights: TextInsights,
    pub learning_style: LearningStyle,
    pub recommendations: StudyRecommendations,
    pub analysis_timestamp: String,
}

pub struct StudyPatternTool {
    time_management: CategoryTable,
    environment: CategoryTable,
    technique: CategoryTable,
    challenges: CategoryTable,
    preferences: CategoryTable,
    style_recommendations: PolicyTable,
}

impl Default for StudyPatternTool {
    fn default() -> Self {
        Self::new()
    }
}

impl StudyPatternTool {
    pub fn new() -> Self {
        Self {
            time_management: CategoryTable::uniform(
                1.0,
                &[
                    ("good", &["planner", "schedule", "routine", "organized", "ahead of time", "plan ahead"]),
                    ("poor", &["procrastinate", "last minute", "cram", "rush", "forget to", "run out of time"]),
                ],
            ),
            environment: CategoryTable::uniform(
                1.0,
                &[(
                    "preferences",
                    &["library", "quiet", "music", "home", "dorm", "cafe", "study room", "group", "alone"],
                )],
            ),
            technique: CategoryTable::uniform(
                1.0,
                &[
                    ("active", &["practice problems", "flashcards", "quiz myself", "teach others", "summarize", "discuss"]),
                    ("passive", &["re-read", "highlight", "review notes", "listen to lectures", "watch videos"]),
                ],
            ),
            challenges: CategoryTable::uniform(
                1.0,
                &[(
                    "common",
                    &[
                        "distracted", "focus", "concentrate", "understand", "remember", "confused",
                        "stressed", "overwhelmed", "bored", "tired", "motivation",
                    ],
                )],
            ),
            preferences: CategoryTable::uniform(
                1.0,
                &[
                    ("visual", &["diagram", "chart", "visual", "see", "picture", "draw", "watch"]),
                    ("auditory", &["listen", "discuss", "hear", "talk", "audio", "sound"]),
                    ("reading/writing", &["write", "read", "note", "text", "words"]),
                    ("kinesthetic", &["practice", "hands-on", "do", "experience", "active", "movement"]),
                ],
            ),
            style_recommendations: style_recommendations(),
        }
    }

    pub fn analyze(&self, text: &str) -> StudyAnalysis {
        info!("Study pattern analysis on '{}'", preview(text));

        let text_insights = self.text_insights(text);
        let learning_style = infer_learning_style(&text_insights.detailed_indicators);
        let recommendations = self.recommend(&learning_style, &text_insights.detailed_indicators);

        StudyAnalysis {
            text_insights,
            learning_style,
            recommendations,
            analysis_timestamp: timestamp(),
        }
    }

    pub fn indicators(&self, text: &str) -> StudyIndicators {
        let mut found = StudyIndicators::default();

        for m in self.time_management.matches(text) {
            match m.category {
                "good" => found.good_time_management = true,
                _ => found.poor_time_management = true,
            }
            found.time_management_indicators.push(labelled(&m));
        }
        for m in self.environment.matches(text) {
            found.environment_indicators.push(mentioned(&m));
        }
        for m in self.technique.matches(text) {
            match m.category {
                "active" => found.active_technique = true,
                _ => found.passive_technique = true,
            }
            found.technique_indicators.push(labelled(&m));
        }
        for m in self.challenges.matches(text) {
            found.challenge_indicators.push(mentioned(&m));
        }

        found.style_counts = STYLES.iter().map(|style| (*style, 0)).collect();
        for m in self.preferences.matches(text) {
            if let Some(style) = STYLES.iter().find(|s| s.key() == m.category) {
                *found.style_counts.entry(*style).or_default() += 1;
            }
            found.preference_indicators.push(labelled(&m));
        }

        found
    }

    fn text_insights(&self, text: &str) -> TextInsights {
        if text.trim().is_empty() {
            return TextInsights {
                insight_confidence: "None".to_string(),
                detailed_indicators: self.indicators(""),
                insights: vec!["No text input provided for analysis".to_string()],
            };
        }

        let indicators = self.indicators(text);
        let total = indicators.total();
        let confidence = match total {
            n if n >= 10 => "High",
            n if n >= 5 => "Medium",
            n if n > 0 => "Low",
            _ => "None",
        };

        let mut insights = Vec::new();
        if indicators.good_time_management {
            insights.push("Student appears to have structured time management approach");
        } else if indicators.poor_time_management {
            insights.push("Student may struggle with time management and procrastination");
        }
        if indicators.active_technique {
            insights.push("Student uses active learning techniques");
        } else if indicators.passive_technique {
            insights.push("Student relies primarily on passive study methods");
        }
        match indicators.challenge_indicators.len() {
            0 => {}
            n if n >= 3 => insights.push("Student mentions multiple study challenges that should be addressed"),
            _ => insights.push("Student mentions some specific study challenges"),
        }
        if insights.is_empty() {
            insights.push("Limited study habit information available from text");
        }

        TextInsights {
            insight_confidence: confidence.to_string(),
            insights: insights.into_iter().map(str::to_string).collect(),
            detailed_indicators: indicators,
        }
    }

    fn recommend(&self, style: &LearningStyle, indicators: &StudyIndicators) -> StudyRecommendations {
        let mut learning_style_based = self
            .style_recommendations
            .first_n(style.primary_style.as_str(), 3)
            .to_vec();
        learning_style_based.extend_from_slice(
            self.style_recommendations
                .first_n(style.secondary_style.as_str(), 2),
        );

        let time_count = if indicators.poor_time_management() { 3 } else { 1 };

        StudyRecommendations {
            learning_style_based,
            time_management: take(TIME_MANAGEMENT, time_count),
            study_environment: take(ENVIRONMENT, 2),
            technology_tools: take(TECHNOLOGY, 2),
        }
    }
}

impl Tool for StudyPatternTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Analyzes student study habits and patterns"
    }

    fn run(&self, ctx: &ToolContext) -> Result<ToolFinding> {
        Ok(ToolFinding::Study(self.analyze(&ctx.text)))
    }
}

fn infer_learning_style(indicators: &StudyIndicators) -> LearningStyle {
    let counts = &indicators.style_counts;
    let count = |style: &LearningStyleKind| counts.get(style).copied().unwrap_or(0);

    let primary = strongest(counts, STYLES.iter().copied()).unwrap_or(LearningStyleKind::Visual);
    let secondary = strongest(counts, STYLES.iter().copied().filter(|s| *s != primary))
        .unwrap_or(LearningStyleKind::Auditory);

    LearningStyle {
        primary_style: primary,
        primary_description: primary.description().to_string(),
        secondary_style: secondary,
        secondary_description: secondary.description().to_string(),
        style_breakdown: STYLES.iter().map(|s| (*s, count(s))).collect(),
    }
}

/// Highest count wins; earlier candidates win ties.
fn strongest(
    counts: &BTreeMap<LearningStyleKind, usize>,
    candidates: impl Iterator<Item = LearningStyleKind>,
) -> Option<LearningStyleKind> {
    let count = |style: &LearningStyleKind| counts.get(style).copied().unwrap_or(0);
    candidates.fold(None, |best, style| match best {
        Some(current) if count(&current) >= count(&style) => Some(current),
        _ => Some(style),
    })
}

fn labelled(m: &PhraseMatch<'_>) -> String {
    format!("{}: '{}'", m.category, m.phrase)
}

fn mentioned(m: &PhraseMatch<'_>) -> String {
    format!("Mentioned: '{}'", m.phrase)
}

fn take(items: &[&str], n: usize) -> Vec<String> {
    items.iter().take(n).map(|s| s.to_string()).collect()
}

fn style_recommendations() -> PolicyTable {
    PolicyTable::new(Vec::<String>::new())
        .with_entry("Visual", [
            "Use color-coding in notes to organize information",
            "Create mind maps or diagrams to visualize complex concepts",
            "Watch video tutorials or demonstrations when available",
            "Use flashcards with visual elements or symbols",
            "Draw or sketch concepts to enhance understanding",
        ])
        .with_entry("Auditory", [
            "Record lectures and listen to them during review",
            "Read notes aloud when studying",
            "Participate in study groups with discussion",
            "Explain concepts verbally to others",
            "Use voice memos for quick notes and ideas",
        ])
        .with_entry("Reading/Writing", [
            "Take detailed notes during lectures and readings",
            "Rewrite key information in your own words",
            "Create outlines and summaries of content",
            "Use written flashcards for key terms and concepts",
            "Write practice essays or responses to potential questions",
        ])
        .with_entry("Kinesthetic", [
            "Incorporate movement during study sessions",
            "Use hands-on practice whenever possible",
            "Create physical models or manipulatives",
            "Take short walks between study topics",
            "Apply concepts through labs, projects, or real-world applications",
        ])
}

const TIME_MANAGEMENT: &[&str] = &[
    "Create a weekly study schedule with specific time blocks",
    "Break large assignments into smaller, manageable tasks",
    "Set specific, achievable goals for each study session",
    "Use the Pomodoro Technique (25 min study, 5 min break)",
    "Plan study sessions at times when you're naturally most alert",
    "Schedule buffer time before deadlines to avoid last-minute rushes",
    "Use a digital or physical planner to track assignments and exams",
];

const ENVIRONMENT: &[&str] = &[
    "Find a consistent study location with minimal distractions",
    "Consider if background noise or silence helps your concentration",
    "Ensure proper lighting and comfortable seating",
    "Remove digital distractions during focused study time",
    "Try different study environments to discover what works best",
    "Consider if group or solo studying is more effective for different subjects",
];

const TECHNOLOGY: &[&str] = &[
    "Use apps like Forest or Focus To-Do to manage study sessions",
    "Try digital flashcard tools like Anki or Quizlet",
    "Consider note-taking apps with organization features",
    "Use website blockers during focused study time",
    "Explore subject-specific learning tools and simulations",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_no_confidence() {
        let analysis = StudyPatternTool::new().analyze("");
        assert_eq!(analysis.text_insights.insight_confidence, "None");
        assert_eq!(analysis.text_insights.insights, vec!["No text input provided for analysis"]);
        assert_eq!(analysis.learning_style.primary_style, LearningStyleKind::Visual);
        assert_eq!(analysis.learning_style.secondary_style, LearningStyleKind::Auditory);
        assert_eq!(analysis.recommendations.time_management.len(), 1);
    }

    #[test]
    fn test_procrastination_and_visual_preference() {
        let analysis = StudyPatternTool::new()
            .analyze("I always procrastinate and cram, then I get distracted and can't focus. Diagrams help, and I draw them.");
        let insights = &analysis.text_insights;
        assert_eq!(insights.insight_confidence, "Medium");
        assert_eq!(
            insights.insights,
            vec![
                "Student may struggle with time management and procrastination",
                "Student mentions some specific study challenges",
            ]
        );
        assert_eq!(
            insights.detailed_indicators.time_management_indicators,
            vec!["poor: 'procrastinate'", "poor: 'cram'"]
        );

        assert_eq!(analysis.learning_style.primary_style, LearningStyleKind::Visual);
        let recs = &analysis.recommendations;
        assert_eq!(recs.learning_style_based.len(), 5);
        assert_eq!(recs.learning_style_based[0], "Use color-coding in notes to organize information");
        assert_eq!(recs.time_management.len(), 3);
        assert_eq!(recs.study_environment.len(), 2);
        assert_eq!(recs.technology_tools[1], "Try digital flashcard tools like Anki or Quizlet");
    }

    #[test]
    fn test_good_time_management_wins_over_poor() {
        let insights = StudyPatternTool::new()
            .analyze("I keep a planner but still rush before exams")
            .text_insights;
        assert_eq!(insights.insights[0], "Student appears to have structured time management approach");
    }

    #[test]
    fn test_style_tie_break_follows_table_order() {
        let style = StudyPatternTool::new().analyze("I like to listen and draw").learning_style;
        assert_eq!(style.primary_style, LearningStyleKind::Visual);
        assert_eq!(style.secondary_style, LearningStyleKind::Auditory);
        assert_eq!(style.style_breakdown[&LearningStyleKind::Kinesthetic], 0);
    }
}
