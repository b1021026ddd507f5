//! Rule-based analysis tools used by the mentoring agents.
//!
//! Every tool is a stateless function of a [`ToolContext`] (free text plus an
//! optional student record) and returns a typed [`ToolFinding`]. JSON only
//! appears at the edges: when a context is parsed from raw input and when a
//! finding is serialized for the API or a stored report.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::scoring::ScoreVector;
use crate::student::StudentRecord;

pub mod academic;
pub mod career;
pub mod emotion;
pub mod resources;
pub mod safety;
pub mod student_data;
pub mod study;

pub use academic::{AcademicAnalysis, AcademicProgressTool};
pub use career::{CareerGuidance, CareerGuidanceTool};
pub use emotion::{EmotionAnalysisTool, EmotionAssessment};
pub use resources::{ResourceCatalog, ResourcePlan, ResourceRecommendationTool};
pub use safety::{SafetyAssessment, SafetyAssessmentTool};
pub use student_data::{StudentDataTool, StudentProfile};
pub use study::{StudyAnalysis, StudyPatternTool};

/// A single analysis step.
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn run(&self, ctx: &ToolContext) -> Result<ToolFinding>;
}

/// Tools that reduce free text to per-category scores.
pub trait Classifier {
    fn classify(&self, text: &str) -> ScoreVector;
}

/// What a tool sees: the student's words and, when known, their record.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    pub text: String,
    pub record: Option<StudentRecord>,
}

impl ToolContext {
    pub fn new(text: impl Into<String>, record: Option<StudentRecord>) -> Self {
        Self {
            text: text.into(),
            record,
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    /// Interpret raw tool input.
    ///
    /// A JSON object may carry the message under `"input"` and record sections
    /// (`personal_info`, `academic_info`, `support_history`) beside it. Anything
    /// that is not such an object is taken verbatim as the message body.
    pub fn parse(raw: &str) -> Self {
        let object = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            _ => return Self::from_text(raw),
        };

        let text = object
            .get("input")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let has_record = ["personal_info", "academic_info", "support_history"]
            .iter()
            .any(|key| object.contains_key(*key));
        if !has_record {
            return Self::from_text(text);
        }

        let mut object = object;
        object
            .entry("student_id")
            .or_insert_with(|| Value::String(String::new()));
        match serde_json::from_value::<StudentRecord>(Value::Object(object)) {
            Ok(record) => Self::new(text, Some(record)),
            Err(e) => {
                debug!("Ignoring malformed record in tool input: {}", e);
                Self::from_text(text)
            }
        }
    }

    /// The attached record, or an empty one when none was supplied.
    pub fn record(&self) -> Cow<'_, StudentRecord> {
        match &self.record {
            Some(record) => Cow::Borrowed(record),
            None => Cow::Owned(StudentRecord::default()),
        }
    }
}

/// Result of one tool run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolFinding {
    Emotion(EmotionAssessment),
    Safety(SafetyAssessment),
    Academic(AcademicAnalysis),
    Resources(ResourcePlan),
    Study(StudyAnalysis),
    Career(CareerGuidance),
    StudentData(StudentProfile),
}

impl ToolFinding {
    pub fn tool_name(&self) -> &'static str {
        match self {
            ToolFinding::Emotion(_) => emotion::NAME,
            ToolFinding::Safety(_) => safety::NAME,
            ToolFinding::Academic(_) => academic::NAME,
            ToolFinding::Resources(_) => resources::NAME,
            ToolFinding::Study(_) => study::NAME,
            ToolFinding::Career(_) => career::NAME,
            ToolFinding::StudentData(_) => student_data::NAME,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Named set of tools shared by every agent.
#[derive(Clone)]
pub struct Toolkit {
    tools: BTreeMap<&'static str, Arc<dyn Tool>>,
}

impl Toolkit {
    pub fn empty() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// All built-in tools, with the embedded resource catalog.
    pub fn standard() -> Result<Self> {
        let catalog = Arc::new(ResourceCatalog::embedded()?);
        Ok(Self::empty()
            .with(Arc::new(EmotionAnalysisTool::new()))
            .with(Arc::new(SafetyAssessmentTool::new()))
            .with(Arc::new(AcademicProgressTool))
            .with(Arc::new(ResourceRecommendationTool::new(catalog)))
            .with(Arc::new(StudyPatternTool::new()))
            .with(Arc::new(CareerGuidanceTool::new()))
            .with(Arc::new(StudentDataTool)))
    }

    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.name(), tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }

    /// Subset of this toolkit in the given order; unknown names are an error.
    pub fn select(&self, names: &[&str]) -> Result<Vec<Arc<dyn Tool>>> {
        names
            .iter()
            .map(|name| self.get(name).ok_or_else(|| anyhow!("Unknown tool '{}'", name)))
            .collect()
    }

    pub fn run(&self, name: &str, ctx: &ToolContext) -> Result<ToolFinding> {
        let tool = self.get(name).ok_or_else(|| anyhow!("Unknown tool '{}'", name))?;
        tool.run(ctx)
    }
}

/// Local time in the format every finding carries.
pub(crate) fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// First 50 characters of `text`, for log lines.
pub(crate) fn preview(text: &str) -> &str {
    match text.char_indices().nth(50) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
