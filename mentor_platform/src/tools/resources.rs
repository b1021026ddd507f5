//! Need identification and campus resource recommendation.
//!
//! The catalog is data, not code: it ships as `data/resources.toml`, is
//! parsed once when the toolkit is built, and is shared read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{preview, timestamp, Tool, ToolContext, ToolFinding};
use crate::scoring::CategoryTable;
use crate::student::{ClassYear, StudentRecord};

pub const NAME: &str = "resources";

const EMBEDDED_CATALOG: &str = include_str!("../../data/resources.toml");

/// Wellness keywords that point at stress and lifestyle rather than mental health.
const STRESS_KEYWORDS: &[&str] = &["stress", "overwhelm", "sleep", "tired", "exhausted"];

/// Technology keywords that point at access problems.
const ACCESS_KEYWORDS: &[&str] = &["internet", "access", "device", "laptop"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub description: String,
    pub contact: String,
    pub location: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AcademicCatalog {
    general: Vec<Resource>,
    #[serde(default)]
    by_major: HashMap<String, Vec<Resource>>,
}

#[derive(Debug, Clone, Deserialize)]
struct WellnessCatalog {
    general: Vec<Resource>,
    mental_health: Vec<Resource>,
    lifestyle: Vec<Resource>,
}

#[derive(Debug, Clone, Deserialize)]
struct CareerCatalog {
    general: Vec<Resource>,
    #[serde(default)]
    by_year: HashMap<String, Vec<Resource>>,
    #[serde(default)]
    by_major: HashMap<String, Vec<Resource>>,
}

#[derive(Debug, Clone, Deserialize)]
struct CommunityCatalog {
    general: Vec<Resource>,
    interest: Vec<Resource>,
    first_year: Vec<Resource>,
}

#[derive(Debug, Clone, Deserialize)]
struct TechnologyCatalog {
    general: Vec<Resource>,
    advanced: Vec<Resource>,
    access: Vec<Resource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceCatalog {
    academic: AcademicCatalog,
    wellness: WellnessCatalog,
    career: CareerCatalog,
    community: CommunityCatalog,
    technology: TechnologyCatalog,
}

impl ResourceCatalog {
    pub fn embedded() -> Result<Self> {
        Self::from_toml(EMBEDDED_CATALOG).context("embedded resource catalog is invalid")
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Need {
    pub need: String,
    pub confidence: String,
    pub source: String,
    #[serde(skip)]
    keyword: Option<String>,
}

impl Need {
    fn new(need: &str, confidence: &str, source: impl Into<String>) -> Self {
        Self {
            need: need.to_string(),
            confidence: confidence.to_string(),
            source: source.into(),
            keyword: None,
        }
    }

    fn from_keyword(need: &str, keyword: &str) -> Self {
        Self {
            keyword: Some(keyword.to_string()),
            ..Self::new(need, "Medium", format!("Mentioned '{}' in input", keyword))
        }
    }

    fn keyword_in(&self, list: &[&str]) -> bool {
        self.keyword.as_deref().is_some_and(|k| list.contains(&k))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IdentifiedNeeds {
    pub academic_needs: Vec<Need>,
    pub wellness_needs: Vec<Need>,
    pub career_needs: Vec<Need>,
    pub community_needs: Vec<Need>,
    pub technology_needs: Vec<Need>,
}

impl IdentifiedNeeds {
    pub fn is_empty(&self) -> bool {
        self.academic_needs.is_empty()
            && self.wellness_needs.is_empty()
            && self.career_needs.is_empty()
            && self.community_needs.is_empty()
            && self.technology_needs.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceGroups {
    pub academic_support: Vec<Resource>,
    pub wellness_support: Vec<Resource>,
    pub career_development: Vec<Resource>,
    pub community_engagement: Vec<Resource>,
    pub technology_tools: Vec<Resource>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourcePlan {
    pub identified_needs: IdentifiedNeeds,
    pub resources: ResourceGroups,
    pub personalized_recommendations: Vec<String>,
    pub recommendation_timestamp: String,
}

pub struct ResourceRecommendationTool {
    catalog: Arc<ResourceCatalog>,
    keywords: CategoryTable,
}

impl ResourceRecommendationTool {
    pub fn new(catalog: Arc<ResourceCatalog>) -> Self {
        Self {
            catalog,
            keywords: need_keywords(),
        }
    }

    pub fn recommend(&self, text: &str, record: &StudentRecord) -> ResourcePlan {
        info!("Resource recommendation on '{}'", preview(text));

        let needs = self.identify_needs(text, record);
        let resources = ResourceGroups {
            academic_support: self.academic_resources(&needs, record),
            wellness_support: self.wellness_resources(&needs),
            career_development: self.career_resources(&needs, record),
            community_engagement: self.community_resources(&needs, record),
            technology_tools: self.technology_resources(&needs),
        };

        ResourcePlan {
            personalized_recommendations: personalized_recommendations(&needs, record),
            identified_needs: needs,
            resources,
            recommendation_timestamp: timestamp(),
        }
    }

    pub fn identify_needs(&self, text: &str, record: &StudentRecord) -> IdentifiedNeeds {
        let mut needs = IdentifiedNeeds::default();

        if record.academic_info.overall_gpa.is_some_and(|gpa| gpa < 2.5) {
            needs.academic_needs.push(Need::new(
                "Academic performance improvement",
                "High",
                "GPA below 2.5",
            ));
        }
        if record.support_history.academic_flags() > 0 {
            needs.academic_needs.push(Need::new(
                "Address academic concerns",
                "High",
                "Academic flags in record",
            ));
        }
        if record.support_history.wellbeing_flags() > 0 {
            needs.wellness_needs.push(Need::new(
                "Well-being support",
                "High",
                "Well-being flags in record",
            ));
        }

        if !text.is_empty() {
            if let Some(keyword) = self.keywords.first_match("academic", text) {
                needs
                    .academic_needs
                    .push(Need::from_keyword("Academic support and resources", keyword));
            }
            if let Some(keyword) = self.keywords.first_match("wellness", text) {
                let need = if STRESS_KEYWORDS.contains(&keyword) {
                    "Stress and workload management support"
                } else {
                    "Wellness and mental health support"
                };
                needs.wellness_needs.push(Need::from_keyword(need, keyword));
            }
            if let Some(keyword) = self.keywords.first_match("career", text) {
                needs.career_needs.push(Need::from_keyword(
                    "Career guidance and professional development",
                    keyword,
                ));
            }
            if let Some(keyword) = self.keywords.first_match("community", text) {
                needs.community_needs.push(Need::from_keyword(
                    "Community engagement and social connection",
                    keyword,
                ));
            }
            if let Some(keyword) = self.keywords.first_match("technology", text) {
                needs
                    .technology_needs
                    .push(Need::from_keyword("Technology tools and resources", keyword));
            }
        }

        if record.is_first_year() && needs.community_needs.is_empty() {
            needs.community_needs.push(Need::new(
                "First-year student community integration",
                "Medium",
                "First-year student status",
            ));
        }

        if needs.is_empty() {
            needs
                .academic_needs
                .push(Need::new("General academic resources", "Low", "Default recommendation"));
            needs
                .wellness_needs
                .push(Need::new("General wellness resources", "Low", "Default recommendation"));
        }

        needs
    }

    fn academic_resources(&self, needs: &IdentifiedNeeds, record: &StudentRecord) -> Vec<Resource> {
        let catalog = &self.catalog.academic;
        let performance_need = needs
            .academic_needs
            .iter()
            .any(|n| n.need.to_lowercase().contains("performance"));

        let general_count = if performance_need { catalog.general.len() } else { 2 };
        let mut selected = first(&catalog.general, general_count);
        if let Some(major) = catalog.by_major.get(&record.personal_info.major) {
            selected.extend(major.iter().cloned());
        }
        tagged(selected, "academic")
    }

    fn wellness_resources(&self, needs: &IdentifiedNeeds) -> Vec<Resource> {
        let catalog = &self.catalog.wellness;
        let mental_health = needs
            .wellness_needs
            .iter()
            .any(|n| n.need.to_lowercase().contains("mental health"));
        let stress = needs
            .wellness_needs
            .iter()
            .any(|n| n.keyword_in(STRESS_KEYWORDS));

        let mut selected = Vec::new();
        if mental_health {
            selected.extend(catalog.mental_health.iter().cloned());
            selected.extend(catalog.general.first().cloned());
        }
        if stress {
            selected.extend(catalog.lifestyle.iter().cloned());
            if let Some(mindfulness) = catalog.general.get(2) {
                push_unique(&mut selected, mindfulness.clone());
            }
        }
        if !needs.wellness_needs.is_empty() && !(mental_health || stress) {
            selected.extend(catalog.general.iter().cloned());
        }
        tagged(selected, "wellness")
    }

    fn career_resources(&self, needs: &IdentifiedNeeds, record: &StudentRecord) -> Vec<Resource> {
        let catalog = &self.catalog.career;
        let mut selected = first(&catalog.general, 1);

        if !needs.career_needs.is_empty() {
            if let Some(year) = catalog.by_year.get(record.personal_info.year.as_str()) {
                selected.extend(year.iter().cloned());
            }
            if let Some(major) = catalog.by_major.get(&record.personal_info.major) {
                selected.extend(first(major, 1));
            }
        }
        tagged(selected, "career")
    }

    fn community_resources(&self, needs: &IdentifiedNeeds, record: &StudentRecord) -> Vec<Resource> {
        let catalog = &self.catalog.community;
        let mut selected = Vec::new();

        if !needs.community_needs.is_empty() {
            selected.extend(first(&catalog.general, 2));
            selected.extend(first(&catalog.interest, 2));
        }
        if record.is_first_year() {
            selected.extend(first(&catalog.first_year, 2));
        }
        if selected.is_empty() {
            selected = first(&catalog.general, 1);
        }
        tagged(selected, "community")
    }

    fn technology_resources(&self, needs: &IdentifiedNeeds) -> Vec<Resource> {
        let catalog = &self.catalog.technology;

        let selected = if needs.technology_needs.is_empty() {
            first(&catalog.general, 1)
        } else {
            let mut selected = first(&catalog.general, 2);
            selected.extend(first(&catalog.advanced, 1));
            if needs.technology_needs.iter().any(|n| n.keyword_in(ACCESS_KEYWORDS)) {
                selected.extend(catalog.access.iter().cloned());
            }
            selected
        };
        tagged(selected, "technology")
    }
}

impl Tool for ResourceRecommendationTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Recommends relevant academic and support resources"
    }

    fn run(&self, ctx: &ToolContext) -> Result<ToolFinding> {
        Ok(ToolFinding::Resources(self.recommend(&ctx.text, &ctx.record())))
    }
}

fn need_keywords() -> CategoryTable {
    CategoryTable::uniform(
        0.2,
        &[
            ("academic", &[
                "struggle", "difficult", "confused", "fail", "behind", "trouble",
                "understand", "study", "homework", "assignment", "tutor", "help with",
            ]),
            ("wellness", &[
                "stress", "anxiety", "overwhelm", "depress", "sleep", "tired",
                "exhausted", "worry", "lonely", "sad", "upset", "mental health",
            ]),
            ("career", &[
                "career", "job", "internship", "resume", "interview", "future",
                "profession", "work", "employment", "major", "graduate",
            ]),
            ("community", &[
                "friend", "connect", "involved", "belong", "club",
                "organization", "activity", "event", "social", "network",
            ]),
            ("technology", &[
                "computer", "software", "online", "digital", "internet",
                "access", "technology", "device", "laptop", "app",
            ]),
        ],
    )
}

fn first(list: &[Resource], n: usize) -> Vec<Resource> {
    list.iter().take(n).cloned().collect()
}

fn push_unique(list: &mut Vec<Resource>, resource: Resource) {
    if !list.iter().any(|r| r.name == resource.name) {
        list.push(resource);
    }
}

fn tagged(resources: Vec<Resource>, kind: &str) -> Vec<Resource> {
    resources
        .into_iter()
        .map(|r| Resource {
            kind: kind.to_string(),
            ..r
        })
        .collect()
}

fn personalized_recommendations(needs: &IdentifiedNeeds, record: &StudentRecord) -> Vec<String> {
    let mut recs: Vec<String> = Vec::new();

    if !needs.academic_needs.is_empty() {
        if record.academic_info.overall_gpa.is_some_and(|gpa| gpa < 2.5) {
            recs.push("Schedule an appointment with an academic advisor to develop a performance improvement plan".into());
            recs.push("Visit the Academic Success Center for personalized tutoring and study strategy development".into());
        } else {
            recs.push("Consider connecting with the Academic Success Center to maintain and enhance your academic performance".into());
        }
    }

    for need in &needs.wellness_needs {
        if need.need.to_lowercase().contains("mental health") {
            recs.push("Schedule an initial consultation with the University Counseling Center for personalized support".into());
        } else if need.keyword_in(STRESS_KEYWORDS) {
            recs.push("Try the weekly mindfulness sessions to develop stress management techniques".into());
        }
    }

    let year = record.personal_info.year;
    if year == ClassYear::Freshman {
        recs.push("Join the First-Year Experience Program to connect with other new students and build your campus network".into());
        if !recs.iter().any(|r| r.to_lowercase().contains("academic advisor")) {
            recs.push("Meet with your academic advisor to review your first-semester progress and plan for upcoming terms".into());
        }
    }

    match year {
        ClassYear::Junior | ClassYear::Senior => {
            recs.push("Visit the Career Center to develop your job search strategy and review your resume".into());
        }
        ClassYear::Sophomore => {
            recs.push("Explore internship opportunities through the Career Center's Sophomore Career Planning program".into());
        }
        _ => {}
    }

    if recs.is_empty() {
        recs.push("Schedule a meeting with your academic advisor to discuss your specific needs and goals".into());
    }
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::Intake;

    fn tool() -> ResourceRecommendationTool {
        ResourceRecommendationTool::new(Arc::new(ResourceCatalog::embedded().unwrap()))
    }

    fn record(year: ClassYear, major: &str, gpa: Option<f64>) -> StudentRecord {
        StudentRecord::from_intake(&Intake {
            student_id: "R1".into(),
            year,
            major: major.into(),
            gpa,
        })
    }

    #[test]
    fn test_embedded_catalog_parses() {
        let catalog = ResourceCatalog::embedded().unwrap();
        assert_eq!(catalog.academic.general.len(), 3);
        assert_eq!(catalog.career.by_year.len(), 4);
        assert_eq!(catalog.technology.access.len(), 2);
    }

    #[test]
    fn test_no_signals_falls_back_to_general_needs() {
        let plan = tool().recommend("", &record(ClassYear::Graduate, "History", Some(3.4)));
        let needs = &plan.identified_needs;
        assert_eq!(needs.academic_needs[0].need, "General academic resources");
        assert_eq!(needs.wellness_needs[0].need, "General wellness resources");
        assert_eq!(plan.resources.wellness_support.len(), 3);
        assert_eq!(plan.resources.academic_support.len(), 2);
    }

    #[test]
    fn test_keyword_sources_name_the_first_match() {
        let plan = tool().recommend(
            "I'm overwhelmed, I struggle with homework, and my laptop broke",
            &record(ClassYear::Sophomore, "Computer Science", Some(3.1)),
        );
        let needs = &plan.identified_needs;
        assert_eq!(needs.academic_needs[0].source, "Mentioned 'struggle' in input");
        assert_eq!(needs.wellness_needs[0].source, "Mentioned 'overwhelm' in input");
        assert_eq!(needs.technology_needs[0].source, "Mentioned 'laptop' in input");

        let wellness: Vec<&str> = plan.resources.wellness_support.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(wellness[0], "Sleep Improvement Program");
        assert!(wellness.contains(&"Mindfulness and Meditation Sessions"));
        assert!(plan.resources.technology_tools.iter().any(|r| r.name == "Internet Access Program"));
        assert!(plan.resources.technology_tools.iter().all(|r| r.kind == "technology"));
    }

    #[test]
    fn test_low_gpa_gets_all_general_academic_and_major_resources() {
        let plan = tool().recommend("", &record(ClassYear::Junior, "Biology", Some(2.1)));
        let academic = &plan.resources.academic_support;
        assert_eq!(academic.len(), 5);
        assert_eq!(academic[3].name, "Biology Study Center");
        assert!(plan.personalized_recommendations[0].contains("performance improvement plan"));
    }

    #[test]
    fn test_first_year_student_gets_community_integration() {
        let plan = tool().recommend("", &record(ClassYear::Freshman, "Psychology", Some(3.5)));
        assert_eq!(
            plan.identified_needs.community_needs[0].need,
            "First-year student community integration"
        );
        let community: Vec<&str> = plan.resources.community_engagement.iter().map(|r| r.name.as_str()).collect();
        assert!(community.contains(&"First-Year Experience Program"));
        assert!(plan
            .personalized_recommendations
            .iter()
            .any(|r| r.contains("First-Year Experience Program")));
    }

    #[test]
    fn test_career_need_adds_year_and_major_resources() {
        let plan = tool().recommend(
            "Worried about finding an internship",
            &record(ClassYear::Senior, "Engineering", Some(3.0)),
        );
        let career: Vec<&str> = plan.resources.career_development.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            career,
            vec![
                "University Career Center",
                "Senior Job Search Support",
                "Graduate School Application Support",
                "Engineering Industry Connections",
            ]
        );
    }
}
