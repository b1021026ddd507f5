//! Academic progress analysis of a student record.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use super::safety::RiskTier;
use super::{timestamp, Tool, ToolContext, ToolFinding};
use crate::policy::PolicyTable;
use crate::scoring::{clamp_score, CategoryTable, ThresholdLadder};
use crate::student::{Course, StudentRecord};

pub const NAME: &str = "academic";

pub const TOTAL_CREDITS_NEEDED: u32 = 120;
const CREDITS_PER_SEMESTER: f64 = 15.0;

const GOOD_GRADES: &[&str] = &["A", "A-", "B+", "B"];
const STRONG_GRADES: &[&str] = &["A", "A-", "B+"];
const POOR_GRADES: &[&str] = &["C-", "D+", "D", "F"];
const FAILING_GRADES: &[&str] = &["D", "F"];
const CHALLENGING_KEYWORDS: &[&str] = &["advanced", "calculus", "physics", "organic", "quantum", "theory"];

#[derive(Debug, Clone, Serialize)]
pub struct AcademicSummary {
    pub overall_gpa: Option<f64>,
    pub academic_standing: String,
    pub total_credits_completed: u32,
    pub current_course_load: usize,
    pub risk_level: RiskTier,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceTrend {
    pub grade_distribution: BTreeMap<String, usize>,
    pub trend: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrengthsWeaknesses {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraduationProgress {
    pub completed_credits: u32,
    pub total_credits_needed: u32,
    pub percent_complete: f64,
    pub status: String,
    pub estimated_semesters_remaining: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SemesterProjection {
    pub likely_outcome: String,
    pub projected_semester_gpa: Option<f64>,
    pub potential_challenging_courses: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcademicRisk {
    pub risk_level: RiskTier,
    pub risk_score: f64,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcademicAnalysis {
    pub summary: AcademicSummary,
    pub performance_trends: PerformanceTrend,
    pub strengths_and_weaknesses: StrengthsWeaknesses,
    pub graduation_progress: GraduationProgress,
    pub current_semester_projection: SemesterProjection,
    pub risk_assessment: AcademicRisk,
    pub recommendations: Vec<String>,
    pub analysis_timestamp: String,
}

pub struct AcademicProgressTool;

impl AcademicProgressTool {
    pub fn analyze(&self, record: &StudentRecord) -> AcademicAnalysis {
        info!("Academic progress analysis for '{}'", record.student_id);

        let academic = &record.academic_info;
        let risk = assess_risk(record);

        AcademicAnalysis {
            summary: AcademicSummary {
                overall_gpa: academic.overall_gpa,
                academic_standing: if academic.academic_standing.is_empty() {
                    "Unknown".to_string()
                } else {
                    academic.academic_standing.clone()
                },
                total_credits_completed: academic.completed_credits(),
                current_course_load: academic.current_courses.len(),
                risk_level: risk.risk_level,
            },
            performance_trends: performance_trend(&academic.completed_courses),
            strengths_and_weaknesses: strengths_and_weaknesses(&academic.completed_courses),
            graduation_progress: graduation_progress(record),
            current_semester_projection: project_semester(&academic.current_courses, academic.overall_gpa),
            recommendations: recommendations(record, risk.risk_level),
            risk_assessment: risk,
            analysis_timestamp: timestamp(),
        }
    }
}

impl Tool for AcademicProgressTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Analyzes academic performance trends and progress"
    }

    fn run(&self, ctx: &ToolContext) -> Result<ToolFinding> {
        Ok(ToolFinding::Academic(self.analyze(&ctx.record())))
    }
}

fn grade_of(course: &Course) -> &str {
    course.grade.as_deref().unwrap_or_default()
}

fn performance_trend(completed: &[Course]) -> PerformanceTrend {
    let mut grade_distribution = BTreeMap::new();
    for course in completed {
        let grade = grade_of(course);
        if !grade.is_empty() {
            *grade_distribution.entry(grade.to_string()).or_insert(0) += 1;
        }
    }

    if completed.is_empty() {
        return PerformanceTrend {
            grade_distribution,
            trend: "Not enough data for trend analysis".to_string(),
        };
    }

    let count = |grades: &[&str]| -> usize {
        grades.iter().map(|g| grade_distribution.get(*g).copied().unwrap_or(0)).sum()
    };
    let good = count(GOOD_GRADES);
    let poor = count(POOR_GRADES);

    let trend = if good as f64 > completed.len() as f64 * 0.7 {
        "Strong performance across most courses"
    } else if good > poor {
        "Mixed performance with more strengths than weaknesses"
    } else if poor > good {
        "Struggling in multiple courses, needs academic support"
    } else {
        "Consistent average performance"
    };

    PerformanceTrend {
        grade_distribution,
        trend: trend.to_string(),
    }
}

fn subject_table() -> CategoryTable {
    CategoryTable::uniform(
        1.0,
        &[
            ("Math", &["calculus", "algebra", "statistics", "mathematics", "computational"]),
            ("Programming", &["programming", "coding", "software", "development", "algorithm"]),
            ("Science", &["physics", "chemistry", "biology", "science", "laboratory"]),
            ("Writing", &["writing", "composition", "literature", "essay", "communications"]),
            ("Business", &["business", "management", "marketing", "finance", "accounting"]),
            ("Social Sciences", &["psychology", "sociology", "anthropology", "economics", "political"]),
            ("Arts", &["art", "music", "theater", "design", "creative"]),
            ("Engineering", &["engineering", "mechanical", "electrical", "systems", "materials"]),
        ],
    )
}

/// Subject areas, in table order, that any of `course_names` falls under.
fn subject_areas(table: &CategoryTable, course_names: &[&str]) -> Vec<String> {
    table
        .names()
        .filter(|subject| {
            course_names
                .iter()
                .any(|course| table.first_match(subject, course).is_some())
        })
        .map(str::to_string)
        .collect()
}

fn has_grade(course: &Course, grades: &[&str]) -> bool {
    let grade = grade_of(course);
    grades.iter().any(|g| *g == grade)
}

fn names_with_grades<'a>(courses: &'a [Course], grades: &[&str]) -> Vec<&'a str> {
    courses
        .iter()
        .filter(|c| has_grade(c, grades))
        .map(|c| c.name.as_str())
        .collect()
}

fn strengths_and_weaknesses(completed: &[Course]) -> StrengthsWeaknesses {
    if completed.is_empty() {
        return StrengthsWeaknesses {
            strengths: vec!["Not enough data to determine strengths".to_string()],
            weaknesses: vec!["Not enough data to determine weaknesses".to_string()],
        };
    }

    let table = subject_table();
    let strengths = subject_areas(&table, &names_with_grades(completed, STRONG_GRADES));
    let weaknesses = subject_areas(&table, &names_with_grades(completed, POOR_GRADES));

    StrengthsWeaknesses {
        strengths: if strengths.is_empty() {
            vec!["No clear strengths identified".to_string()]
        } else {
            strengths
        },
        weaknesses: if weaknesses.is_empty() {
            vec!["No clear weaknesses identified".to_string()]
        } else {
            weaknesses
        },
    }
}

fn graduation_progress(record: &StudentRecord) -> GraduationProgress {
    let completed_credits = record.academic_info.completed_credits();
    let expected = record.personal_info.year.expected_progress();
    let actual = completed_credits as f64 / TOTAL_CREDITS_NEEDED as f64;

    let status = if actual < expected - 0.1 {
        "Behind expected progress"
    } else if actual > expected + 0.1 {
        "Ahead of expected progress"
    } else {
        "On track with expected progress"
    };

    let remaining = (TOTAL_CREDITS_NEEDED as f64 - completed_credits as f64) / CREDITS_PER_SEMESTER;

    GraduationProgress {
        completed_credits,
        total_credits_needed: TOTAL_CREDITS_NEEDED,
        percent_complete: (actual * 1000.0).round() / 10.0,
        status: status.to_string(),
        estimated_semesters_remaining: remaining.round().max(1.0) as u32,
    }
}

fn project_semester(current: &[Course], overall_gpa: Option<f64>) -> SemesterProjection {
    if current.is_empty() {
        return SemesterProjection {
            likely_outcome: "No current courses to project".to_string(),
            projected_semester_gpa: None,
            potential_challenging_courses: Vec::new(),
        };
    }

    // Offsets sit at the middle of each band's expected swing.
    let (likely_outcome, projected_semester_gpa) = match overall_gpa {
        None => ("No GPA on record to project from", None),
        Some(gpa) => {
            let (outcome, offset) = if gpa >= 3.5 {
                ("Strong performance expected to continue", -0.05)
            } else if gpa >= 3.0 {
                ("Solid performance expected to continue", -0.05)
            } else if gpa >= 2.5 {
                ("Moderate performance with potential for improvement", 0.05)
            } else {
                ("At risk for continued academic difficulties", 0.15)
            };
            let projected = ((gpa + offset).min(4.0) * 100.0).round() / 100.0;
            (outcome, Some(projected))
        }
    };

    let challenging: Vec<String> = current
        .iter()
        .filter(|c| {
            let name = c.name.to_lowercase();
            CHALLENGING_KEYWORDS.iter().any(|k| name.contains(k))
        })
        .map(|c| c.name.clone())
        .collect();

    SemesterProjection {
        likely_outcome: likely_outcome.to_string(),
        projected_semester_gpa,
        potential_challenging_courses: if challenging.is_empty() {
            vec!["No specific courses identified as challenging".to_string()]
        } else {
            challenging
        },
    }
}

/// Additive risk factors; the sum is clamped to `[0, 1]` before tiering.
fn assess_risk(record: &StudentRecord) -> AcademicRisk {
    let academic = &record.academic_info;
    let mut factors = Vec::new();
    let mut score = 0.0;

    // An unreported GPA adds no factor; it is not read as 0.0.
    match academic.overall_gpa {
        Some(gpa) if gpa < 2.0 => {
            factors.push("GPA below academic probation threshold".to_string());
            score += 0.4;
        }
        Some(gpa) if gpa < 2.5 => {
            factors.push("GPA in warning range".to_string());
            score += 0.2;
        }
        _ => {}
    }

    if academic.academic_standing.contains("Academic Probation") {
        factors.push("Currently on academic probation".to_string());
        score += 0.3;
    } else if academic.academic_standing.contains("Academic Warning") {
        factors.push("Currently on academic warning".to_string());
        score += 0.2;
    }

    let failing = academic
        .completed_courses
        .iter()
        .filter(|c| has_grade(c, FAILING_GRADES))
        .count();
    if failing > 0 {
        factors.push(format!("Failed {} course(s) in academic history", failing));
        score += 0.1 * failing.min(3) as f64;
    }

    let flags = record.support_history.academic_flags();
    if flags > 0 {
        factors.push(format!("{} academic concern flag(s) in record", flags));
        score += 0.1 * flags.min(3) as f64;
    }

    if factors.is_empty() {
        factors.push("No significant academic risk factors identified".to_string());
    }

    let risk_score = clamp_score(score);
    let ladder = ThresholdLadder::new([(0.5, RiskTier::High), (0.2, RiskTier::Medium)], RiskTier::Low);

    AcademicRisk {
        risk_level: ladder.label_for(risk_score),
        risk_score,
        risk_factors: factors,
    }
}

fn tier_recommendations() -> PolicyTable {
    PolicyTable::new(["Maintain regular academic advising each semester"])
        .with_entry("High", [
            "Schedule weekly academic advising appointments",
            "Connect with tutoring services for all challenging courses",
            "Consider reduced course load for next semester",
            "Develop structured study plan with academic support staff",
            "Utilize campus learning center for study skills development",
        ])
        .with_entry("Medium", [
            "Schedule bi-weekly academic advising check-ins",
            "Connect with tutoring for specific challenging courses",
            "Join study groups for collaborative learning",
            "Attend professor office hours regularly",
            "Consider time management workshop or resources",
        ])
        .with_entry("Low", [
            "Maintain regular academic advising each semester",
            "Continue current successful study strategies",
            "Consider mentoring other students or becoming a tutor",
            "Explore research or internship opportunities",
        ])
}

fn recommendations(record: &StudentRecord, tier: RiskTier) -> Vec<String> {
    let mut recs = tier_recommendations().recommendations_for(tier.as_str()).to_vec();

    let goals = &record.personal_info.career_goals;
    if !goals.is_empty() {
        recs.push(format!(
            "Explore courses that align with career goals in {}",
            goals.join(", ")
        ));
        recs.push("Schedule appointment with career services to discuss academic-career alignment".to_string());
    }
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::{ClassYear, Intake};

    fn course(name: &str, credits: u32, grade: Option<&str>) -> Course {
        Course {
            name: name.to_string(),
            credits,
            grade: grade.map(str::to_string),
        }
    }

    fn struggling_record() -> StudentRecord {
        let mut record = StudentRecord::from_intake(&Intake {
            student_id: "S5".into(),
            year: ClassYear::Junior,
            major: "Engineering".into(),
            gpa: Some(1.8),
        });
        record.academic_info.completed_courses = vec![
            course("Calculus I", 4, Some("F")),
            course("Technical Writing", 3, Some("A")),
            course("Statics", 3, Some("D")),
        ];
        record.academic_info.current_courses = vec![course("Advanced Thermodynamics", 3, None)];
        record
    }

    #[test]
    fn test_risk_is_clamped_and_tiered() {
        let risk = assess_risk(&struggling_record());
        // 0.4 (gpa) + 0.3 (probation) + 0.2 (two failures) + 0.1 (flag) = 1.0
        assert_eq!(risk.risk_score, 1.0);
        assert_eq!(risk.risk_level, RiskTier::High);
        assert_eq!(risk.risk_factors.len(), 4);

        let mut record = struggling_record();
        record.academic_info.completed_courses.push(course("Physics", 4, Some("F")));
        record.support_history.flags.extend(record.support_history.flags.clone());
        assert!(assess_risk(&record).risk_score <= 1.0);
    }

    #[test]
    fn test_unknown_gpa_adds_no_gpa_factor() {
        let record = StudentRecord::from_intake(&Intake {
            student_id: "S8".into(),
            year: ClassYear::Sophomore,
            gpa: None,
            ..Intake::default()
        });
        let risk = assess_risk(&record);
        assert_eq!(risk.risk_score, 0.0);
        assert_eq!(risk.risk_level, RiskTier::Low);
        assert!(risk.risk_factors.iter().all(|f| !f.contains("GPA")));

        let mut failing = record.clone();
        failing.academic_info.completed_courses = vec![course("Chemistry", 4, Some("F"))];
        let risk = assess_risk(&failing);
        assert_eq!(risk.risk_score, 0.1);
        assert_eq!(risk.risk_factors.len(), 1);
    }

    #[test]
    fn test_clean_record_is_low_risk() {
        let record = StudentRecord::from_intake(&Intake {
            student_id: "S6".into(),
            gpa: Some(3.7),
            ..Intake::default()
        });
        let analysis = AcademicProgressTool.analyze(&record);
        assert_eq!(analysis.risk_assessment.risk_level, RiskTier::Low);
        assert_eq!(analysis.risk_assessment.risk_score, 0.0);
        assert_eq!(analysis.performance_trends.trend, "Not enough data for trend analysis");
        assert_eq!(analysis.current_semester_projection.likely_outcome, "No current courses to project");
    }

    #[test]
    fn test_strengths_and_weaknesses_by_subject() {
        let analysis = AcademicProgressTool.analyze(&struggling_record());
        assert_eq!(analysis.strengths_and_weaknesses.strengths, vec!["Writing"]);
        assert_eq!(analysis.strengths_and_weaknesses.weaknesses, vec!["Math"]);
        assert_eq!(
            analysis.performance_trends.trend,
            "Struggling in multiple courses, needs academic support"
        );
    }

    #[test]
    fn test_graduation_progress_for_junior_behind() {
        let progress = graduation_progress(&struggling_record());
        assert_eq!(progress.completed_credits, 10);
        assert_eq!(progress.percent_complete, 8.3);
        assert_eq!(progress.status, "Behind expected progress");
        assert_eq!(progress.estimated_semesters_remaining, 7);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let record = struggling_record();
        let first = project_semester(&record.academic_info.current_courses, Some(1.8));
        let second = project_semester(&record.academic_info.current_courses, Some(1.8));
        assert_eq!(first.projected_semester_gpa, Some(1.95));
        assert_eq!(first.projected_semester_gpa, second.projected_semester_gpa);
        assert_eq!(first.potential_challenging_courses, vec!["Advanced Thermodynamics"]);
    }

    #[test]
    fn test_recommendations_include_career_lines() {
        let analysis = AcademicProgressTool.analyze(&struggling_record());
        let last = analysis.recommendations.last().unwrap();
        assert!(last.contains("career services"));
        assert_eq!(analysis.recommendations[0], "Schedule weekly academic advising appointments");
    }
}
