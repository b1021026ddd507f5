//! Safety concern screening and risk tiering.

use std::fmt;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use super::{preview, timestamp, Classifier, Tool, ToolContext, ToolFinding};
use crate::policy::PolicyTable;
use crate::scoring::{select_label, CategoryTable, ScoreVector, ThresholdLadder};

pub const NAME: &str = "safety";

/// A concern counts as primary once it reaches this score.
const CONCERN_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub overall_risk_level: RiskTier,
    pub concern_scores: ScoreVector,
    pub primary_concerns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampusResource {
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SafetyAssessment {
    pub risk_assessment: RiskAssessment,
    pub recommended_actions: Vec<String>,
    pub campus_resources: Vec<CampusResource>,
    pub assessment_timestamp: String,
}

impl SafetyAssessment {
    pub fn tier(&self) -> RiskTier {
        self.risk_assessment.overall_risk_level
    }
}

pub struct SafetyAssessmentTool {
    table: CategoryTable,
    ladder: ThresholdLadder<RiskTier>,
    actions: PolicyTable,
}

impl Default for SafetyAssessmentTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyAssessmentTool {
    pub fn new() -> Self {
        Self {
            table: concern_table(),
            ladder: ThresholdLadder::new([(0.6, RiskTier::High), (0.3, RiskTier::Medium)], RiskTier::Low),
            actions: action_plans(),
        }
    }

    pub fn assess(&self, text: &str) -> SafetyAssessment {
        info!("Safety assessment on '{}'", preview(text));

        let scores = self.classify(text);
        let tier = select_label(&scores, &self.ladder);
        let primary_concerns: Vec<String> = scores
            .at_least(CONCERN_THRESHOLD)
            .into_iter()
            .map(str::to_string)
            .collect();

        if tier == RiskTier::High {
            warn!("High safety risk detected: {:?}", primary_concerns);
        }

        SafetyAssessment {
            recommended_actions: self.actions.recommendations_for(tier.as_str()).to_vec(),
            campus_resources: campus_resources(&primary_concerns),
            risk_assessment: RiskAssessment {
                overall_risk_level: tier,
                concern_scores: scores,
                primary_concerns,
            },
            assessment_timestamp: timestamp(),
        }
    }
}

impl Classifier for SafetyAssessmentTool {
    fn classify(&self, text: &str) -> ScoreVector {
        self.table.score(text)
    }
}

impl Tool for SafetyAssessmentTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Evaluates student safety concerns and risk levels"
    }

    fn run(&self, ctx: &ToolContext) -> Result<ToolFinding> {
        Ok(ToolFinding::Safety(self.assess(&ctx.text)))
    }
}

fn concern_table() -> CategoryTable {
    CategoryTable::uniform(
        0.3,
        &[
            ("self_harm", &[
                "hurt myself", "harm myself", "end my life", "suicide", "kill myself",
                "don't want to live", "no point in living", "better off dead",
            ]),
            ("harm_to_others", &[
                "hurt someone", "harm others", "violent thoughts", "revenge",
                "make them pay", "they deserve to suffer", "bring weapon",
            ]),
            ("substance_abuse", &[
                "drunk", "wasted", "high", "using drugs", "addicted",
                "can't stop drinking", "overdose", "blackout",
            ]),
            ("severe_distress", &[
                "can't handle", "breaking down", "falling apart", "crisis",
                "desperate", "hopeless", "unbearable", "trauma",
            ]),
            ("basic_needs", &[
                "homeless", "nowhere to sleep", "can't afford food", "haven't eaten",
                "unsafe housing", "abusive", "kicked out", "no money for",
            ]),
        ],
    )
}

fn action_plans() -> PolicyTable {
    PolicyTable::new([
        "Provide supportive resources appropriate to student needs",
        "Schedule routine follow-up",
    ])
    .with_entry("High", [
        "Immediate referral to campus mental health services",
        "Consider wellness check if student cannot be reached",
        "Notify appropriate campus emergency services",
        "Document all concerns and actions taken",
        "Schedule follow-up within 24 hours",
    ])
    .with_entry("Medium", [
        "Schedule appointment with counseling services within 48 hours",
        "Provide crisis hotline and emergency resources",
        "Check in with student within 24-48 hours",
        "Document concerns and maintain communication",
        "Consider academic accommodations if needed",
    ])
    .with_entry("Low", [
        "Provide supportive resources appropriate to student needs",
        "Schedule routine follow-up",
        "Monitor for changes in behavior or academic performance",
        "Document any concerns for future reference",
    ])
}

fn resources_for(concern: &str) -> &'static [(&'static str, &'static str)] {
    match concern {
        "self_harm" => &[
            ("Campus Counseling Center", "555-123-4567 (24/7 Crisis Line)"),
            ("National Suicide Prevention Lifeline", "988"),
            ("Student Health Services", "555-123-8900"),
        ],
        "harm_to_others" => &[
            ("Campus Police", "555-123-9111"),
            ("Student Conduct Office", "555-123-4444"),
            ("Violence Prevention Program", "555-123-5555"),
        ],
        "substance_abuse" => &[
            ("Substance Abuse Services", "555-123-6666"),
            ("Recovery Support Group", "555-123-7777"),
            ("Student Health Services", "555-123-8900"),
        ],
        "severe_distress" => &[
            ("Campus Counseling Center", "555-123-4567"),
            ("Peer Support Program", "555-123-9999"),
            ("Student Support Services", "555-123-0000"),
        ],
        "basic_needs" => &[
            ("Student Emergency Fund", "555-123-1111"),
            ("Campus Food Pantry", "555-123-2222"),
            ("Housing Services", "555-123-3333"),
            ("Financial Aid Office", "555-123-4444"),
        ],
        _ => &[],
    }
}

const GENERAL_RESOURCES: &[(&str, &str)] = &[
    ("Campus Counseling Center", "555-123-4567"),
    ("Student Support Services", "555-123-0000"),
    ("Student Health Services", "555-123-8900"),
];

/// Union of the resource lists of `concerns`, in concern order. A name seen
/// again keeps its first position and takes the later contact.
fn campus_resources(concerns: &[String]) -> Vec<CampusResource> {
    let source: Vec<(&str, &str)> = if concerns.is_empty() {
        GENERAL_RESOURCES.to_vec()
    } else {
        concerns
            .iter()
            .flat_map(|concern| resources_for(concern).iter().copied())
            .collect()
    };

    let mut merged: Vec<CampusResource> = Vec::new();
    for (name, contact) in source {
        match merged.iter_mut().find(|r| r.name == name) {
            Some(existing) => existing.contact = contact.to_string(),
            None => merged.push(CampusResource {
                name: name.to_string(),
                contact: contact.to_string(),
            }),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_self_harm_phrase_is_high_risk() {
        let result = SafetyAssessmentTool::new()
            .assess("Sometimes I want to hurt myself. I think I will hurt myself.");
        let scores = &result.risk_assessment.concern_scores;
        assert_eq!(scores.get("self_harm"), Some(0.6));
        assert_eq!(scores.get("harm_to_others"), Some(0.0));
        assert_eq!(scores.get("basic_needs"), Some(0.0));
        assert_eq!(result.tier(), RiskTier::High);
        assert_eq!(result.recommended_actions.len(), 5);
        assert_eq!(result.campus_resources[1].name, "National Suicide Prevention Lifeline");
    }

    #[test]
    fn test_empty_text_is_low_risk_with_general_resources() {
        let result = SafetyAssessmentTool::new().assess("");
        assert_eq!(result.tier(), RiskTier::Low);
        assert!(result.risk_assessment.primary_concerns.is_empty());
        assert_eq!(result.campus_resources.len(), 3);
        assert_eq!(result.recommended_actions[0], "Provide supportive resources appropriate to student needs");
    }

    #[test]
    fn test_single_concern_is_medium() {
        let result = SafetyAssessmentTool::new().assess("Everything feels hopeless lately");
        assert_eq!(result.tier(), RiskTier::Medium);
        assert_eq!(result.risk_assessment.primary_concerns, vec!["severe_distress"]);
    }

    #[test]
    fn test_resource_union_keeps_first_position_and_last_contact() {
        let merged = campus_resources(&["self_harm".to_string(), "severe_distress".to_string()]);
        let names: Vec<&str> = merged.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Campus Counseling Center",
                "National Suicide Prevention Lifeline",
                "Student Health Services",
                "Peer Support Program",
                "Student Support Services",
            ]
        );
        assert_eq!(merged[0].contact, "555-123-4567");
    }
}
