//! Career guidance: path suggestions, major/goal alignment, preparedness,
//! an action plan (skills, experiences, timeline) and field resources.
//!
//! Every list is drawn from static tables in table order, so the same
//! record always yields the same guidance.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use super::{timestamp, Tool, ToolContext, ToolFinding};
use crate::policy::PolicyTable;
use crate::scoring::{clamp_score, ThresholdLadder};
use crate::student::{ClassYear, StudentRecord};

pub const NAME: &str = "career";

const MAX_CAREER_PATHS: usize = 5;
const MAX_COURSES: usize = 5;
const MAX_CERTIFICATIONS: usize = 3;
const MAX_EXPERIENCES: usize = 3;
const MAJOR_CERTIFICATIONS: usize = 2;
const MAJOR_COURSES: usize = 2;

const CAREER_GOAL_WEIGHT: f64 = 0.6;
const INTEREST_WEIGHT: f64 = 0.4;

const MIN_PREPAREDNESS: f64 = 0.1;

type PathRow = (&'static str, &'static str, &'static str);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CareerPath {
    pub title: String,
    pub outlook: String,
    pub median_salary: String,
}

impl From<&PathRow> for CareerPath {
    fn from((title, outlook, salary): &PathRow) -> Self {
        Self {
            title: title.to_string(),
            outlook: outlook.to_string(),
            median_salary: salary.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlignmentLevel {
    Excellent,
    Good,
    Moderate,
    Low,
}

#[derive(Debug, Clone, Serialize)]
pub struct MajorAlignment {
    pub alignment_level: AlignmentLevel,
    pub alignment_score: f64,
    pub alignment_factors: Vec<String>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PreparednessLevel {
    High,
    Good,
    Moderate,
    #[serde(rename = "Early Stage")]
    EarlyStage,
}

impl PreparednessLevel {
    fn assessment(&self) -> &'static str {
        match self {
            PreparednessLevel::High => "Well-prepared for career entry with current trajectory",
            PreparednessLevel::Good => "On track for career readiness with continued progress",
            PreparednessLevel::Moderate => {
                "Making progress toward career readiness, with opportunities for improvement"
            }
            PreparednessLevel::EarlyStage => {
                "Beginning career preparation journey with significant development ahead"
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Preparedness {
    pub preparedness_level: PreparednessLevel,
    pub preparedness_score: f64,
    pub assessment: String,
    pub preparedness_factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CareerAssessment {
    pub major_alignment: MajorAlignment,
    pub current_preparedness: Preparedness,
    pub recommended_career_paths: Vec<CareerPath>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SkillPlan {
    pub priority_skills: Vec<String>,
    pub secondary_skills: Vec<String>,
    pub future_skills: Vec<String>,
    pub recommended_courses: Vec<String>,
    pub recommended_certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExperiencePlan {
    pub internships: Vec<String>,
    pub activities: Vec<String>,
    pub events: Vec<String>,
    pub projects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub timeframe: String,
    pub milestone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionPlan {
    pub skill_development: SkillPlan,
    pub experience_recommendations: ExperiencePlan,
    pub timeline: Vec<Milestone>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CareerResources {
    pub campus_resources: Vec<String>,
    pub online_platforms: Vec<String>,
    pub professional_organizations: Vec<String>,
    pub field_specific_resources: Vec<String>,
    pub publications: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CareerGuidance {
    pub major: String,
    pub career_assessment: CareerAssessment,
    pub action_plan: ActionPlan,
    pub resources: CareerResources,
    pub guidance_timestamp: String,
}

/// Major-keyed resource lists; unknown majors get a generic pointer.
struct FieldResources {
    organizations: PolicyTable,
    websites: PolicyTable,
    publications: PolicyTable,
}

pub struct CareerGuidanceTool {
    alignment: ThresholdLadder<AlignmentLevel>,
    preparedness: ThresholdLadder<PreparednessLevel>,
    core_skills: PolicyTable,
    field: FieldResources,
}

impl Default for CareerGuidanceTool {
    fn default() -> Self {
        Self::new()
    }
}

impl CareerGuidanceTool {
    pub fn new() -> Self {
        Self {
            alignment: ThresholdLadder::new(
                [
                    (0.8, AlignmentLevel::Excellent),
                    (0.6, AlignmentLevel::Good),
                    (0.4, AlignmentLevel::Moderate),
                ],
                AlignmentLevel::Low,
            ),
            preparedness: ThresholdLadder::new(
                [
                    (0.8, PreparednessLevel::High),
                    (0.6, PreparednessLevel::Good),
                    (0.4, PreparednessLevel::Moderate),
                ],
                PreparednessLevel::EarlyStage,
            ),
            core_skills: keyed_table(
                &["Problem Solving", "Critical Thinking", "Communication"],
                CORE_SKILLS,
            ),
            field: FieldResources {
                organizations: keyed_table(&["Professional association in your field"], ORGANIZATIONS),
                websites: keyed_table(&["Industry-specific websites and job boards"], FIELD_WEBSITES),
                publications: keyed_table(&["Field-specific journals and publications"], PUBLICATIONS),
            },
        }
    }

    pub fn guide(&self, record: &StudentRecord) -> CareerGuidance {
        let personal = &record.personal_info;
        info!("Career guidance for major '{}'", personal.major);

        let skill_development = self.skill_plan(&personal.major, personal.year, &personal.career_goals);
        debug!(
            priority = skill_development.priority_skills.len(),
            courses = skill_development.recommended_courses.len(),
            "Skill plan built"
        );

        CareerGuidance {
            major: personal.major.clone(),
            career_assessment: CareerAssessment {
                major_alignment: self.assess_alignment(
                    &personal.major,
                    &personal.career_goals,
                    &personal.interests,
                ),
                current_preparedness: self
                    .assess_preparedness(personal.year, record.academic_info.overall_gpa),
                recommended_career_paths: recommend_paths(&personal.major, &personal.interests),
            },
            action_plan: ActionPlan {
                skill_development,
                experience_recommendations: experience_plan(
                    &personal.major,
                    personal.year,
                    &personal.interests,
                ),
                timeline: career_timeline(personal.year, &personal.major),
            },
            resources: self.resources(&personal.major),
            guidance_timestamp: timestamp(),
        }
    }

    fn assess_alignment(&self, major: &str, goals: &[String], interests: &[String]) -> MajorAlignment {
        let mut score = 0.0;
        let mut factors = Vec::new();

        let paths = typical_careers(major);
        if goals.is_empty() {
            score += 0.3;
            factors.push(format!(
                "No specific career goals provided to assess alignment with {}",
                major
            ));
        } else {
            let mut aligned = 0;
            for goal in goals {
                let lowered = goal.to_lowercase();
                if paths.iter().any(|p| lowered.contains(&p.to_lowercase())) {
                    aligned += 1;
                    factors.push(format!("Career goal '{}' aligns well with {} degree", goal, major));
                }
            }
            score += (aligned as f64 / goals.len() as f64).min(1.0) * CAREER_GOAL_WEIGHT;
        }

        let keywords = interest_keywords(major);
        if interests.is_empty() {
            score += 0.2;
            factors.push("No specific interests provided to assess alignment with major".to_string());
        } else {
            let mut matched = 0;
            for interest in interests {
                let lowered = interest.to_lowercase();
                if keywords
                    .iter()
                    .any(|k| lowered.contains(k) || k.contains(lowered.as_str()))
                {
                    matched += 1;
                    factors.push(format!("Interest in '{}' complements {} studies", interest, major));
                }
            }
            score += (matched as f64 / interests.len() as f64).min(1.0) * INTEREST_WEIGHT;
        }

        let score = clamp_score(score);
        let level = self.alignment.label_for(score);
        if factors.is_empty() {
            factors.push("Insufficient information to identify specific alignment factors".to_string());
        }

        MajorAlignment {
            alignment_level: level,
            alignment_score: score,
            alignment_factors: factors,
            recommendation: alignment_recommendation(level, major),
        }
    }

    /// Year sets the base score and GPA nudges it; an unreported GPA
    /// leaves the base untouched.
    fn assess_preparedness(&self, year: ClassYear, gpa: Option<f64>) -> Preparedness {
        let base: f64 = match year {
            ClassYear::Freshman => 0.2,
            ClassYear::Sophomore => 0.4,
            ClassYear::Junior => 0.6,
            ClassYear::Senior => 0.8,
            ClassYear::Graduate => 0.9,
            ClassYear::Unknown => 0.5,
        };
        let (modifier, gpa_factor) = match gpa {
            Some(g) if g >= 3.5 => (0.1, "Strong academic performance demonstrates mastery of material"),
            Some(g) if g >= 3.0 => (0.05, "Solid academic record shows competence in field"),
            Some(g) if g >= 2.5 => (0.0, "Academic performance shows room for strengthening in some areas"),
            Some(_) => (
                -0.05,
                "Academic performance suggests need for additional support and improvement",
            ),
            None => (0.0, "No GPA on record to gauge academic preparation"),
        };

        let score = clamp_score((base + modifier).max(MIN_PREPAREDNESS));
        let level = self.preparedness.label_for(score);

        let mut factors: Vec<String> = year_factors(year).iter().map(|f| f.to_string()).collect();
        factors.push(gpa_factor.to_string());

        Preparedness {
            preparedness_level: level,
            preparedness_score: score,
            assessment: level.assessment().to_string(),
            preparedness_factors: factors,
        }
    }

    fn skill_plan(&self, major: &str, year: ClassYear, goals: &[String]) -> SkillPlan {
        let major_skills = self.core_skills.recommendations_for(major);
        let technical = unique(goals.iter().flat_map(|goal| {
            let lowered = goal.to_lowercase();
            TECHNICAL_SKILLS
                .iter()
                .filter(move |(career, _)| lowered.contains(&career.to_lowercase()))
                .flat_map(|(_, skills)| skills.iter().copied())
        }));

        let (priority, secondary, future) = match year {
            ClassYear::Freshman | ClassYear::Sophomore => {
                let (early, later) = major_skills.split_at(major_skills.len().min(2));
                let (soft_early, soft_later) = SOFT_SKILLS.split_at(2);
                (
                    unique(early.iter().map(String::as_str).chain(soft_early.iter().copied())),
                    unique(later.iter().map(String::as_str).chain(soft_later.iter().copied())),
                    technical,
                )
            }
            _ => {
                let priority = unique(
                    technical
                        .iter()
                        .take(3)
                        .chain(major_skills.iter().take(1))
                        .map(String::as_str),
                );
                let future = technical
                    .into_iter()
                    .filter(|skill| !priority.contains(skill))
                    .collect();
                (priority, unique(SOFT_SKILLS[..3].iter().copied()), future)
            }
        };

        SkillPlan {
            recommended_courses: recommend_courses(major, &priority),
            recommended_certifications: recommend_certifications(major, goals),
            priority_skills: priority,
            secondary_skills: secondary,
            future_skills: future,
        }
    }

    fn resources(&self, major: &str) -> CareerResources {
        CareerResources {
            campus_resources: to_strings(CAMPUS_RESOURCES),
            online_platforms: to_strings(ONLINE_PLATFORMS),
            professional_organizations: self.field.organizations.recommendations_for(major).to_vec(),
            field_specific_resources: self.field.websites.recommendations_for(major).to_vec(),
            publications: self.field.publications.recommendations_for(major).to_vec(),
        }
    }
}

impl Tool for CareerGuidanceTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Provides career path recommendations and resources"
    }

    fn run(&self, ctx: &ToolContext) -> Result<ToolFinding> {
        Ok(ToolFinding::Career(self.guide(&ctx.record())))
    }
}

/// Major paths first, then careers for each interest, capped.
fn recommend_paths(major: &str, interests: &[String]) -> Vec<CareerPath> {
    major_paths(major)
        .iter()
        .chain(interests.iter().flat_map(|i| interest_paths(i).iter()))
        .take(MAX_CAREER_PATHS)
        .map(CareerPath::from)
        .collect()
}

fn alignment_recommendation(level: AlignmentLevel, major: &str) -> String {
    match level {
        AlignmentLevel::Excellent => format!(
            "Current major ({}) is very well-aligned with career goals and interests",
            major
        ),
        AlignmentLevel::Good => format!(
            "Current major ({}) is generally well-aligned with career goals and interests",
            major
        ),
        AlignmentLevel::Moderate => format!(
            "Current major ({}) has some alignment with goals and interests, but consider complementary coursework",
            major
        ),
        AlignmentLevel::Low => format!(
            "Consider exploring whether current major ({}) is the best fit for stated goals and interests",
            major
        ),
    }
}

/// One course per priority skill that has any, then the major's first two.
fn recommend_courses(major: &str, priority: &[String]) -> Vec<String> {
    let per_skill = priority.iter().filter_map(|skill| {
        SKILL_COURSES
            .iter()
            .find(|(name, _)| *name == skill.as_str())
            .and_then(|(_, courses)| courses.first().copied())
    });
    let major_courses = lookup(MAJOR_COURSES_TABLE, major)
        .iter()
        .take(MAJOR_COURSES)
        .copied();
    let mut courses = unique(per_skill.chain(major_courses));
    courses.truncate(MAX_COURSES);
    courses
}

/// The major's first two certifications, then those of the first career
/// each goal names.
fn recommend_certifications(major: &str, goals: &[String]) -> Vec<String> {
    let per_goal = goals.iter().flat_map(|goal| {
        let lowered = goal.to_lowercase();
        CAREER_CERTIFICATIONS
            .iter()
            .find(|(career, _)| lowered.contains(&career.to_lowercase()))
            .map(|(_, certs)| *certs)
            .unwrap_or(&[])
            .iter()
            .copied()
    });
    let major_certs = lookup(MAJOR_CERTIFICATIONS_TABLE, major)
        .iter()
        .take(MAJOR_CERTIFICATIONS)
        .copied();
    let mut certs = unique(major_certs.chain(per_goal));
    certs.truncate(MAX_CERTIFICATIONS);
    certs
}

fn experience_plan(major: &str, year: ClassYear, interests: &[String]) -> ExperiencePlan {
    let base = match year {
        ClassYear::Freshman | ClassYear::Sophomore => &EARLY_EXPERIENCES,
        _ => &LATE_EXPERIENCES,
    };
    let major_rows = MAJOR_EXPERIENCES
        .iter()
        .find(|(name, _)| *name == major)
        .map(|(_, rows)| rows)
        .unwrap_or(&Experiences::NONE);
    let matched: Vec<&Experiences> = interests
        .iter()
        .filter_map(|interest| match_interest(INTEREST_EXPERIENCES, interest))
        .collect();

    let capped = |items: Vec<String>| items.into_iter().take(MAX_EXPERIENCES).collect::<Vec<_>>();
    let from_interests = |pick: fn(&Experiences) -> &'static [&'static str]| {
        matched.iter().flat_map(move |rows| pick(rows).iter().copied())
    };

    let mut projects = capped(unique(from_interests(|e| e.projects)));
    if projects.is_empty() {
        projects = to_strings(&["Portfolio development", "Independent research"]);
    }

    ExperiencePlan {
        internships: capped(unique(
            base.internships.iter().chain(major_rows.internships).copied(),
        )),
        activities: capped(unique(
            base.activities
                .iter()
                .chain(major_rows.activities)
                .copied()
                .chain(from_interests(|e| e.activities)),
        )),
        events: capped(unique(
            base.events
                .iter()
                .chain(major_rows.events)
                .copied()
                .chain(from_interests(|e| e.events)),
        )),
        projects,
    }
}

const YEARS: [ClassYear; 4] = [
    ClassYear::Freshman,
    ClassYear::Sophomore,
    ClassYear::Junior,
    ClassYear::Senior,
];

const POST_GRADUATION: &str = "Post-Graduation";

/// Standard milestones from the student's year onward plus the major's
/// milestones for the same years, ordered by year. Graduate students start
/// at the senior milestones and an unknown year starts at the beginning.
fn career_timeline(year: ClassYear, major: &str) -> Vec<Milestone> {
    let start = match year {
        ClassYear::Graduate => 3,
        other => YEARS.iter().position(|y| *y == other).unwrap_or(0),
    };

    let mut ranked: Vec<(usize, Milestone)> = Vec::new();
    for (index, stage) in YEARS.iter().enumerate().skip(start) {
        for (timeframe, milestone) in standard_milestones(*stage) {
            let (rank, timeframe) = if *timeframe == POST_GRADUATION {
                (YEARS.len(), timeframe.to_string())
            } else {
                (index, format!("{}: {}", stage, timeframe))
            };
            ranked.push((rank, Milestone { timeframe, milestone: milestone.to_string() }));
        }
    }
    for (stage, timeframe, milestone) in lookup(MAJOR_MILESTONES, major) {
        if let Some(index) = YEARS.iter().position(|y| y == stage).filter(|i| *i >= start) {
            ranked.push((
                index,
                Milestone {
                    timeframe: format!("{}: {}", stage, timeframe),
                    milestone: milestone.to_string(),
                },
            ));
        }
    }

    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, milestone)| milestone).collect()
}

/// Order-preserving dedupe.
fn unique<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.iter().any(|seen| seen == item) {
            out.push(item.to_string());
        }
    }
    out
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn lookup<T: 'static>(table: &'static [(&'static str, &'static [T])], key: &str) -> &'static [T] {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, rows)| *rows)
        .unwrap_or(&[])
}

fn keyed_table(default: &[&str], rows: &[(&str, &[&str])]) -> PolicyTable {
    rows.iter().fold(PolicyTable::new(default.iter().copied()), |table, (key, items)| {
        table.with_entry(*key, items.iter().copied())
    })
}

/// Row for the first key that contains, or is contained in, `interest`.
fn match_interest<'t, T>(table: &'t [(&str, T)], interest: &str) -> Option<&'t T> {
    let lowered = interest.to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    table
        .iter()
        .find(|(key, _)| key.contains(lowered.as_str()) || lowered.contains(key))
        .map(|(_, row)| row)
}

fn interest_paths(interest: &str) -> &'static [PathRow] {
    match_interest(INTEREST_CAREERS, interest).copied().unwrap_or(&[])
}

fn major_paths(major: &str) -> &'static [PathRow] {
    match major {
        "Computer Science" => &[
            ("Software Engineer", "Excellent", "$110,000"),
            ("Data Scientist", "Excellent", "$122,000"),
            ("Machine Learning Engineer", "Excellent", "$135,000"),
            ("Web Developer", "Good", "$77,000"),
            ("Cybersecurity Analyst", "Excellent", "$103,000"),
            ("DevOps Engineer", "Excellent", "$115,000"),
        ],
        "Psychology" => &[
            ("Clinical Psychologist", "Good", "$82,000"),
            ("HR Specialist", "Good", "$65,000"),
            ("Market Research Analyst", "Good", "$71,000"),
            ("Social Worker", "Moderate", "$55,000"),
            ("School Counselor", "Moderate", "$58,000"),
            ("UX Researcher", "Good", "$90,000"),
        ],
        "Business Administration" => &[
            ("Financial Analyst", "Good", "$83,000"),
            ("Marketing Manager", "Good", "$100,000"),
            ("Management Consultant", "Good", "$115,000"),
            ("Operations Manager", "Moderate", "$95,000"),
            ("Human Resources Manager", "Moderate", "$90,000"),
            ("Entrepreneur", "Variable", "Variable"),
        ],
        "Engineering" => &[
            ("Mechanical Engineer", "Good", "$95,000"),
            ("Civil Engineer", "Good", "$93,000"),
            ("Electrical Engineer", "Good", "$100,000"),
            ("Aerospace Engineer", "Moderate", "$116,000"),
            ("Biomedical Engineer", "Good", "$92,000"),
            ("Environmental Engineer", "Good", "$88,000"),
        ],
        "Biology" => &[
            ("Research Scientist", "Moderate", "$85,000"),
            ("Healthcare Administrator", "Good", "$75,000"),
            ("Biotechnologist", "Good", "$92,000"),
            ("Pharmaceutical Sales", "Moderate", "$86,000"),
            ("Environmental Scientist", "Moderate", "$71,000"),
            ("Medical Writer", "Good", "$78,000"),
        ],
        _ => &[
            ("Business Analyst", "Good", "$85,000"),
            ("Technical Writer", "Moderate", "$74,000"),
            ("Project Manager", "Good", "$95,000"),
        ],
    }
}

const INTEREST_CAREERS: &[(&str, &[PathRow])] = &[
    ("art", &[("UX/UI Designer", "Good", "$85,000"), ("Graphic Designer", "Moderate", "$53,000")]),
    ("music", &[("Music Producer", "Competitive", "$68,000"), ("Audio Engineer", "Moderate", "$62,000")]),
    ("writing", &[("Content Strategist", "Good", "$72,000"), ("Technical Writer", "Moderate", "$74,000")]),
    ("gaming", &[("Game Designer", "Competitive", "$85,000"), ("QA Tester", "Moderate", "$55,000")]),
    ("sustainability", &[
        ("Sustainability Consultant", "Growing", "$78,000"),
        ("Environmental Planner", "Moderate", "$75,000"),
    ]),
    ("robotics", &[("Robotics Engineer", "Excellent", "$110,000"), ("Automation Specialist", "Good", "$92,000")]),
    ("entrepreneurship", &[("Startup Founder", "Variable", "Variable"), ("Business Development", "Good", "$85,000")]),
    ("travel", &[("International Business", "Moderate", "$80,000"), ("Tourism Management", "Moderate", "$65,000")]),
    ("cooking", &[("Food Scientist", "Moderate", "$73,000"), ("Nutritionist", "Good", "$63,000")]),
];

fn typical_careers(major: &str) -> &'static [&'static str] {
    match major {
        "Computer Science" => &["Software Engineer", "Data Scientist", "IT Specialist", "Web Developer", "Cybersecurity"],
        "Psychology" => &["Counselor", "Therapist", "HR Specialist", "Researcher", "Social Worker"],
        "Business Administration" => &["Manager", "Analyst", "Consultant", "Marketing", "Finance"],
        "Engineering" => &["Engineer", "Designer", "Developer", "Project Manager", "Researcher"],
        "Biology" => &["Researcher", "Healthcare", "Scientist", "Environmental", "Pharmaceutical"],
        _ => &[],
    }
}

fn interest_keywords(major: &str) -> &'static [&'static str] {
    match major {
        "Computer Science" => &["technology", "programming", "computing", "software", "gaming", "data", "robotics"],
        "Psychology" => &["people", "behavior", "mental", "counseling", "social", "research", "development"],
        "Business Administration" => &["business", "management", "entrepreneurship", "marketing", "finance", "leadership"],
        "Engineering" => &["design", "building", "mechanics", "systems", "robotics", "technology"],
        "Biology" => &["science", "health", "environment", "research", "nature", "medicine", "laboratory"],
        _ => &[],
    }
}

fn year_factors(year: ClassYear) -> &'static [&'static str] {
    match year {
        ClassYear::Freshman => &["Early in academic journey with time to explore", "Building foundational knowledge"],
        ClassYear::Sophomore => &["Developing core academic skills", "Beginning to specialize in major"],
        ClassYear::Junior => &["Advancing in specialized knowledge", "Time to pursue internships and experience"],
        ClassYear::Senior => &["Finalizing academic requirements", "Transitioning to job search and career entry"],
        ClassYear::Graduate => &["Advanced specialized knowledge", "Research or professional focus"],
        ClassYear::Unknown => &[],
    }
}

// Skills

const CORE_SKILLS: &[(&str, &[&str])] = &[
    ("Computer Science", &["Programming", "Algorithms", "Data Structures", "Problem Solving"]),
    ("Psychology", &["Research Methods", "Critical Thinking", "Communication", "Analytical Skills"]),
    ("Business Administration", &["Financial Analysis", "Management", "Marketing", "Strategic Planning"]),
    ("Engineering", &["Technical Design", "Mathematics", "Problem Solving", "Technical Writing"]),
    ("Biology", &["Lab Techniques", "Research Methods", "Scientific Writing", "Data Analysis"]),
];

const SOFT_SKILLS: &[&str] = &["Communication", "Teamwork", "Time Management", "Leadership", "Adaptability"];

const TECHNICAL_SKILLS: &[(&str, &[&str])] = &[
    ("Software Engineer", &["Java", "Python", "JavaScript", "Cloud Services", "Git"]),
    ("Data Scientist", &["Python", "R", "Machine Learning", "Statistics", "SQL"]),
    ("Researcher", &["Research Methods", "Statistics", "Data Analysis", "Technical Writing"]),
    ("Marketing", &["Digital Marketing", "Social Media", "Analytics", "Content Creation"]),
    ("Finance", &["Financial Modeling", "Excel", "Accounting", "Data Analysis"]),
    ("Healthcare", &["Medical Terminology", "Patient Care", "Electronic Health Records"]),
];

const SKILL_COURSES: &[(&str, &[&str])] = &[
    ("Programming", &["Advanced Programming Techniques", "Web Development", "Mobile App Development"]),
    ("Data Structures", &["Advanced Data Structures", "Algorithm Design"]),
    ("Machine Learning", &["Introduction to Machine Learning", "Data Mining", "Neural Networks"]),
    ("Statistics", &["Applied Statistics", "Statistical Methods", "Data Analysis"]),
    ("Communication", &["Professional Communication", "Technical Writing", "Public Speaking"]),
    ("Research Methods", &["Research Design", "Qualitative Research Methods", "Quantitative Analysis"]),
    ("Leadership", &["Leadership Theory", "Organizational Behavior", "Team Management"]),
    ("Financial Analysis", &["Corporate Finance", "Financial Statement Analysis", "Investment Analysis"]),
    ("Technical Design", &["Engineering Design", "CAD Fundamentals", "Product Development"]),
    ("Problem Solving", &["Critical Thinking", "Design Thinking", "Creative Problem Solving"]),
];

const MAJOR_COURSES_TABLE: &[(&str, &[&str])] = &[
    ("Computer Science", &["Software Engineering", "Database Systems", "Computer Networks"]),
    ("Psychology", &["Cognitive Psychology", "Social Psychology", "Developmental Psychology"]),
    ("Business Administration", &["Strategic Management", "Marketing Research", "Business Analytics"]),
    ("Engineering", &["Thermodynamics", "Fluid Mechanics", "Materials Science"]),
    ("Biology", &["Molecular Biology", "Genetics", "Physiology"]),
];

const MAJOR_CERTIFICATIONS_TABLE: &[(&str, &[&str])] = &[
    ("Computer Science", &[
        "AWS Certified Developer",
        "Google Cloud Professional Developer",
        "Microsoft Certified: Azure Developer",
        "Certified Information Systems Security Professional (CISSP)",
    ]),
    ("Psychology", &[
        "Board Certified Behavior Analyst (BCBA)",
        "Certified Clinical Mental Health Counselor (CCMHC)",
        "National Certified Counselor (NCC)",
    ]),
    ("Business Administration", &[
        "Project Management Professional (PMP)",
        "Certified Public Accountant (CPA)",
        "Certified Business Analysis Professional (CBAP)",
        "Chartered Financial Analyst (CFA)",
    ]),
    ("Engineering", &[
        "Professional Engineer (PE)",
        "Certified SolidWorks Professional (CSWP)",
        "Leadership in Energy and Environmental Design (LEED)",
    ]),
    ("Biology", &[
        "Clinical Laboratory Scientist/Medical Technologist",
        "Medical Laboratory Technician (MLT)",
        "Registered Environmental Health Specialist",
    ]),
];

const CAREER_CERTIFICATIONS: &[(&str, &[&str])] = &[
    ("Software Engineer", &["Oracle Certified Professional Java Programmer", "Certified Kubernetes Administrator"]),
    ("Data Scientist", &["IBM Data Science Professional", "Microsoft Certified: Data Analyst Associate"]),
    ("Cybersecurity", &["Certified Ethical Hacker (CEH)", "CompTIA Security+"]),
    ("Marketing", &["Google Analytics Certification", "HubSpot Content Marketing Certification"]),
    ("Finance", &["Financial Risk Manager (FRM)", "Certified Financial Planner (CFP)"]),
    ("Healthcare", &["Certified Health Education Specialist (CHES)", "Certified in Public Health (CPH)"]),
];

// Experiences

struct Experiences {
    internships: &'static [&'static str],
    activities: &'static [&'static str],
    events: &'static [&'static str],
    projects: &'static [&'static str],
}

impl Experiences {
    const NONE: Experiences = Experiences {
        internships: &[],
        activities: &[],
        events: &[],
        projects: &[],
    };
}

const EARLY_EXPERIENCES: Experiences = Experiences {
    internships: &["Entry-level internship", "On-campus research assistant"],
    activities: &["Join relevant student organizations", "Volunteer in related field"],
    events: &["Career fair", "Freshman/Sophomore specific networking events"],
    projects: &[],
};

const LATE_EXPERIENCES: Experiences = Experiences {
    internships: &["Industry internship", "Research position"],
    activities: &["Leadership role in student organization", "Industry-related projects"],
    events: &["Industry conferences", "Career fair", "Networking events with professionals"],
    projects: &[],
};

const MAJOR_EXPERIENCES: &[(&str, Experiences)] = &[
    ("Computer Science", Experiences {
        internships: &["Software development internship", "QA testing internship"],
        activities: &["Hackathons", "Open source contributions", "Coding competitions"],
        events: &["Tech meetups", "Developer conferences"],
        projects: &[],
    }),
    ("Psychology", Experiences {
        internships: &["Research lab assistant", "Mental health organization intern"],
        activities: &["Psychology club", "Volunteer at counseling center"],
        events: &["Psychology conferences", "Mental health awareness events"],
        projects: &[],
    }),
    ("Business Administration", Experiences {
        internships: &["Business analyst internship", "Marketing assistant"],
        activities: &["Case competitions", "Entrepreneurship club"],
        events: &["Business networking events", "Industry panels"],
        projects: &[],
    }),
    ("Engineering", Experiences {
        internships: &["Engineering firm internship", "Research and development"],
        activities: &["Engineering projects", "Design competitions"],
        events: &["Industry expositions", "Engineering society events"],
        projects: &[],
    }),
    ("Biology", Experiences {
        internships: &["Laboratory research assistant", "Field research aide"],
        activities: &["Biology club", "Conservation volunteer work"],
        events: &["Research symposiums", "Scientific conferences"],
        projects: &[],
    }),
];

const INTEREST_EXPERIENCES: &[(&str, Experiences)] = &[
    ("art", Experiences {
        internships: &[],
        activities: &["Art club", "Design portfolio development"],
        events: &["Art exhibitions", "Design workshops"],
        projects: &["Visual design project", "Digital portfolio creation"],
    }),
    ("music", Experiences {
        internships: &[],
        activities: &["Music ensemble", "Production club"],
        events: &["Music festivals", "Industry workshops"],
        projects: &["Music production portfolio", "Recording project"],
    }),
    ("writing", Experiences {
        internships: &[],
        activities: &["Student publication", "Writing workshop"],
        events: &["Literary events", "Writing competitions"],
        projects: &["Blog development", "Content creation portfolio"],
    }),
    ("gaming", Experiences {
        internships: &[],
        activities: &["Game development club", "Esports team"],
        events: &["Gaming conventions", "Game jams"],
        projects: &["Game mod development", "Simple game creation"],
    }),
    ("sustainability", Experiences {
        internships: &[],
        activities: &["Environmental club", "Sustainability initiatives"],
        events: &["Environmental conferences", "Sustainability summits"],
        projects: &["Campus sustainability project", "Environmental impact study"],
    }),
    ("robotics", Experiences {
        internships: &[],
        activities: &["Robotics club", "Engineering competitions"],
        events: &["Robotics competitions", "Tech showcases"],
        projects: &["Robotics project", "Automation system development"],
    }),
];

// Timeline

fn standard_milestones(year: ClassYear) -> &'static [(&'static str, &'static str)] {
    match year {
        ClassYear::Freshman => &[
            ("First Semester", "Explore introductory courses and student organizations"),
            ("Second Semester", "Meet with academic advisor to discuss major and career interests"),
            ("Summer", "Volunteer or part-time job to build basic work experience"),
        ],
        ClassYear::Sophomore => &[
            ("First Semester", "Join major-specific student organizations"),
            ("Second Semester", "Prepare resume and LinkedIn profile"),
            ("Summer", "Seek entry-level internship or research opportunity"),
        ],
        ClassYear::Junior => &[
            ("First Semester", "Attend career fairs and networking events"),
            ("Second Semester", "Apply for summer internships and research positions"),
            ("Summer", "Complete career-focused internship"),
        ],
        ClassYear::Senior => &[
            ("First Semester", "Begin job search or graduate school applications"),
            ("Second Semester", "Interview for full-time positions or finalize post-graduation plans"),
            (POST_GRADUATION, "Transition to career or advanced education"),
        ],
        ClassYear::Graduate | ClassYear::Unknown => &[],
    }
}

type MilestoneRow = (ClassYear, &'static str, &'static str);

const MAJOR_MILESTONES: &[(&str, &[MilestoneRow])] = &[
    ("Computer Science", &[
        (ClassYear::Freshman, "Second Semester", "Build first programming portfolio project"),
        (ClassYear::Sophomore, "Summer", "Contribute to open source projects"),
        (ClassYear::Junior, "First Semester", "Prepare for technical interviews"),
        (ClassYear::Senior, "First Semester", "Complete capstone project for portfolio"),
    ]),
    ("Psychology", &[
        (ClassYear::Freshman, "Second Semester", "Begin exploring research opportunities"),
        (ClassYear::Sophomore, "Summer", "Volunteer at mental health organization"),
        (ClassYear::Junior, "Second Semester", "Prepare for GRE if considering graduate school"),
        (ClassYear::Senior, "First Semester", "Complete independent research project"),
    ]),
    ("Business Administration", &[
        (ClassYear::Freshman, "Second Semester", "Job shadow a professional in your field"),
        (ClassYear::Sophomore, "First Semester", "Participate in case competition"),
        (ClassYear::Junior, "Summer", "Internship with business in target industry"),
        (ClassYear::Senior, "Second Semester", "Network with alumni in desired field"),
    ]),
    ("Engineering", &[
        (ClassYear::Freshman, "Summer", "Complete relevant certification or workshop"),
        (ClassYear::Sophomore, "Second Semester", "Join engineering project team"),
        (ClassYear::Junior, "First Semester", "Prepare for FE exam if applicable"),
        (ClassYear::Senior, "First Semester", "Complete senior design project"),
    ]),
    ("Biology", &[
        (ClassYear::Freshman, "Second Semester", "Explore research lab opportunities"),
        (ClassYear::Sophomore, "Summer", "Field or laboratory research experience"),
        (ClassYear::Junior, "Second Semester", "Prepare for MCAT/GRE if applicable"),
        (ClassYear::Senior, "First Semester", "Complete thesis or capstone research"),
    ]),
];

// Resources

const CAMPUS_RESOURCES: &[&str] = &[
    "Career Services Center - Resume reviews, interview preparation, job search assistance",
    "Academic Advising - Course selection aligned with career goals",
    "Alumni Network - Connect with graduates in your field",
];

const ONLINE_PLATFORMS: &[&str] = &[
    "LinkedIn Learning - Skills development courses",
    "Coursera and edX - Specialized certificates and courses",
    "Handshake - Job and internship platform",
];

const ORGANIZATIONS: &[(&str, &[&str])] = &[
    ("Computer Science", &["Association for Computing Machinery (ACM)", "IEEE Computer Society"]),
    ("Psychology", &["American Psychological Association", "Psi Chi"]),
    ("Business Administration", &["American Management Association", "National Business Association"]),
    ("Engineering", &["National Society of Professional Engineers", "American Society of Civil Engineers"]),
    ("Biology", &[
        "American Society for Biochemistry and Molecular Biology",
        "American Institute of Biological Sciences",
    ]),
];

const FIELD_WEBSITES: &[(&str, &[&str])] = &[
    ("Computer Science", &["GitHub", "Stack Overflow", "LeetCode", "HackerRank"]),
    ("Psychology", &["PsychINFO", "Psychology Today", "APA PsycNet"]),
    ("Business Administration", &["Harvard Business Review", "Wall Street Journal", "Bloomberg"]),
    ("Engineering", &["Engineering.com", "IEEE Spectrum", "Engineering Toolbox"]),
    ("Biology", &["Nature.com", "PubMed", "Cell Press"]),
];

const PUBLICATIONS: &[(&str, &[&str])] = &[
    ("Computer Science", &["Communications of the ACM", "IEEE Software"]),
    ("Psychology", &["Journal of Applied Psychology", "Psychological Science"]),
    ("Business Administration", &["Harvard Business Review", "Forbes", "Business Insider"]),
    ("Engineering", &["Engineering News-Record", "IEEE Spectrum"]),
    ("Biology", &["Nature", "Science", "Cell"]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::Intake;

    fn record_for(major: &str, year: ClassYear, gpa: Option<f64>) -> StudentRecord {
        StudentRecord::from_intake(&Intake {
            student_id: "C1".into(),
            year,
            major: major.into(),
            gpa,
        })
    }

    fn record(major: &str) -> StudentRecord {
        record_for(major, ClassYear::Junior, Some(3.2))
    }

    fn titles(guidance: &CareerGuidance) -> Vec<&str> {
        guidance
            .career_assessment
            .recommended_career_paths
            .iter()
            .map(|p| p.title.as_str())
            .collect()
    }

    #[test]
    fn test_paths_are_capped_at_five() {
        let guidance = CareerGuidanceTool::new().guide(&record("Computer Science"));
        let titles = titles(&guidance);
        assert_eq!(titles.len(), 5);
        assert_eq!(titles[0], "Software Engineer");
        assert!(!titles.contains(&"DevOps Engineer"));
    }

    #[test]
    fn test_unknown_major_gets_default_paths_plus_interests() {
        let mut record = record("History");
        record.personal_info.interests = vec!["Music".into(), "Cooking".into()];
        let guidance = CareerGuidanceTool::new().guide(&record);
        assert_eq!(
            titles(&guidance),
            vec!["Business Analyst", "Technical Writer", "Project Manager", "Music Producer", "Audio Engineer"]
        );
    }

    #[test]
    fn test_matching_goals_without_interests_is_excellent() {
        let alignment = CareerGuidanceTool::new()
            .guide(&record("Computer Science"))
            .career_assessment
            .major_alignment;
        assert_eq!(alignment.alignment_score, 0.8);
        assert_eq!(alignment.alignment_level, AlignmentLevel::Excellent);
        assert!(alignment.recommendation.contains("(Computer Science)"));
        assert_eq!(alignment.alignment_factors.len(), 3);
    }

    #[test]
    fn test_partial_goal_match_is_moderate() {
        let alignment = CareerGuidanceTool::new()
            .guide(&record("Psychology"))
            .career_assessment
            .major_alignment;
        assert_eq!(alignment.alignment_score, 0.5);
        assert_eq!(alignment.alignment_level, AlignmentLevel::Moderate);
    }

    #[test]
    fn test_no_goals_no_interests_is_moderate() {
        let mut record = record("Biology");
        record.personal_info.career_goals.clear();
        let alignment = CareerGuidanceTool::new().guide(&record).career_assessment.major_alignment;
        assert_eq!(alignment.alignment_score, 0.5);
        assert_eq!(alignment.alignment_factors.len(), 2);
    }

    #[test]
    fn test_unknown_major_falls_back_to_generic_plan() {
        let guidance = CareerGuidanceTool::new().guide(&record("History"));
        let skills = &guidance.action_plan.skill_development;

        assert_eq!(skills.priority_skills, vec!["Problem Solving"]);
        assert_eq!(skills.secondary_skills, vec!["Communication", "Teamwork", "Time Management"]);
        assert!(skills.future_skills.is_empty());
        assert_eq!(skills.recommended_courses, vec!["Critical Thinking"]);
        assert!(skills.recommended_certifications.is_empty());

        let resources = &guidance.resources;
        assert_eq!(resources.professional_organizations, vec!["Professional association in your field"]);
        assert_eq!(resources.field_specific_resources, vec!["Industry-specific websites and job boards"]);
        assert_eq!(resources.publications, vec!["Field-specific journals and publications"]);
        assert_eq!(resources.campus_resources.len(), 3);
        assert_eq!(resources.online_platforms.len(), 3);

        let experiences = &guidance.action_plan.experience_recommendations;
        assert_eq!(experiences.internships, vec!["Industry internship", "Research position"]);
        assert_eq!(experiences.projects, vec!["Portfolio development", "Independent research"]);
    }

    #[test]
    fn test_timeline_starts_at_the_students_year() {
        let timeline = CareerGuidanceTool::new().guide(&record("Computer Science")).action_plan.timeline;

        assert_eq!(timeline.len(), 8);
        assert_eq!(
            timeline[0],
            Milestone {
                timeframe: "Junior: First Semester".into(),
                milestone: "Attend career fairs and networking events".into(),
            }
        );
        assert!(timeline.iter().any(|m| m.timeframe == "Junior: First Semester"
            && m.milestone == "Prepare for technical interviews"));
        assert!(!timeline
            .iter()
            .any(|m| m.timeframe.starts_with("Freshman") || m.timeframe.starts_with("Sophomore")));
        assert_eq!(timeline.last().map(|m| m.timeframe.as_str()), Some(POST_GRADUATION));

        let senior_from = timeline
            .iter()
            .position(|m| m.timeframe.starts_with("Senior"))
            .unwrap();
        assert!(timeline[..senior_from].iter().all(|m| m.timeframe.starts_with("Junior")));
    }

    #[test]
    fn test_unknown_year_timeline_covers_every_year() {
        let timeline = CareerGuidanceTool::new()
            .guide(&record_for("Biology", ClassYear::Unknown, None))
            .action_plan
            .timeline;
        assert_eq!(timeline.len(), 16);
        assert_eq!(timeline[0].timeframe, "Freshman: First Semester");

        let graduate = CareerGuidanceTool::new()
            .guide(&record_for("Biology", ClassYear::Graduate, None))
            .action_plan
            .timeline;
        assert_eq!(graduate[0].timeframe, "Senior: First Semester");
        assert_eq!(graduate.len(), 4);
    }

    #[test]
    fn test_preparedness_follows_year_and_gpa() {
        let tool = CareerGuidanceTool::new();

        let senior = tool.assess_preparedness(ClassYear::Senior, Some(3.8));
        assert_eq!(senior.preparedness_score, 0.9);
        assert_eq!(senior.preparedness_level, PreparednessLevel::High);
        assert_eq!(senior.preparedness_factors.len(), 3);

        let junior = tool.assess_preparedness(ClassYear::Junior, Some(3.2));
        assert_eq!(junior.preparedness_score, 0.65);
        assert_eq!(junior.preparedness_level, PreparednessLevel::Good);

        let freshman = tool.assess_preparedness(ClassYear::Freshman, Some(2.0));
        assert_eq!(freshman.preparedness_score, 0.15);
        assert_eq!(freshman.preparedness_level, PreparednessLevel::EarlyStage);
        assert_eq!(
            freshman.assessment,
            "Beginning career preparation journey with significant development ahead"
        );
    }

    #[test]
    fn test_unknown_gpa_leaves_preparedness_at_year_base() {
        let prep = CareerGuidanceTool::new().assess_preparedness(ClassYear::Sophomore, None);
        assert_eq!(prep.preparedness_score, 0.4);
        assert_eq!(prep.preparedness_level, PreparednessLevel::Moderate);
        assert!(prep
            .preparedness_factors
            .iter()
            .any(|f| f.starts_with("No GPA on record")));
    }

    #[test]
    fn test_early_plan_for_computer_science() {
        let mut record = record_for("Computer Science", ClassYear::Freshman, Some(3.6));
        record.personal_info.interests = vec!["Gaming".into(), "Robotics".into()];
        let plan = CareerGuidanceTool::new().guide(&record).action_plan;

        let skills = &plan.skill_development;
        assert_eq!(skills.priority_skills, vec!["Programming", "Algorithms", "Communication", "Teamwork"]);
        assert_eq!(skills.future_skills.iter().filter(|s| *s == "Python").count(), 1);
        assert_eq!(
            skills.recommended_courses,
            vec![
                "Advanced Programming Techniques",
                "Professional Communication",
                "Software Engineering",
                "Database Systems",
            ]
        );
        assert_eq!(
            skills.recommended_certifications,
            vec![
                "AWS Certified Developer",
                "Google Cloud Professional Developer",
                "Oracle Certified Professional Java Programmer",
            ]
        );

        let experiences = &plan.experience_recommendations;
        assert_eq!(
            experiences.internships,
            vec!["Entry-level internship", "On-campus research assistant", "Software development internship"]
        );
        assert_eq!(experiences.activities.len(), MAX_EXPERIENCES);
        assert_eq!(experiences.events.len(), MAX_EXPERIENCES);
        assert_eq!(
            experiences.projects,
            vec!["Game mod development", "Simple game creation", "Robotics project"]
        );
    }

    #[test]
    fn test_late_plan_puts_technical_skills_first() {
        let skills = CareerGuidanceTool::new()
            .guide(&record("Computer Science"))
            .action_plan
            .skill_development;
        assert_eq!(skills.priority_skills, vec!["Java", "Python", "JavaScript", "Programming"]);
        assert_eq!(skills.secondary_skills, vec!["Communication", "Teamwork", "Time Management"]);
        assert!(!skills.future_skills.contains(&"Java".to_string()));
        assert!(skills.future_skills.contains(&"SQL".to_string()));
    }
}
