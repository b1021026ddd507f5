//! Student record model.
//!
//! The JSON layout (`personal_info`, `academic_info`, `support_history`)
//! matches the per-student `student_data.json` files kept by the report
//! store. Records built from an intake carry only what the intake states
//! plus values derived from it deterministically.

use std::fmt;
use std::str::FromStr;

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Class year as selected on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ClassYear {
    Freshman,
    Sophomore,
    Junior,
    Senior,
    Graduate,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ClassYear {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassYear::Freshman => "Freshman",
            ClassYear::Sophomore => "Sophomore",
            ClassYear::Junior => "Junior",
            ClassYear::Senior => "Senior",
            ClassYear::Graduate => "Graduate",
            ClassYear::Unknown => "Unknown",
        }
    }

    /// Share of a degree a student in this year is expected to have completed.
    pub fn expected_progress(&self) -> f64 {
        match self {
            ClassYear::Freshman => 0.25,
            ClassYear::Sophomore => 0.5,
            ClassYear::Junior => 0.75,
            ClassYear::Senior => 0.9,
            ClassYear::Graduate | ClassYear::Unknown => 0.5,
        }
    }
}

impl fmt::Display for ClassYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassYear {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "freshman" | "first-year" | "first year" => ClassYear::Freshman,
            "sophomore" => ClassYear::Sophomore,
            "junior" => ClassYear::Junior,
            "senior" => ClassYear::Senior,
            "graduate" | "grad" => ClassYear::Graduate,
            _ => ClassYear::Unknown,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    #[serde(default)]
    pub credits: u32,
    #[serde(default)]
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub description: String,
    #[serde(default)]
    pub date_flagged: Option<String>,
}

impl Flag {
    pub fn is_academic(&self) -> bool {
        self.kind == "Academic"
    }

    pub fn is_wellbeing(&self) -> bool {
        self.kind == "Well-being"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub follow_up_items: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub major: String,
    pub year: ClassYear,
    pub interests: Vec<String>,
    pub extracurricular_activities: Vec<String>,
    pub career_goals: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcademicInfo {
    pub overall_gpa: Option<f64>,
    pub completed_courses: Vec<Course>,
    pub current_courses: Vec<Course>,
    pub academic_standing: String,
}

impl AcademicInfo {
    pub fn completed_credits(&self) -> u32 {
        self.completed_courses.iter().map(|c| c.credits).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportHistory {
    pub previous_meetings: Vec<Meeting>,
    pub academic_accommodations: bool,
    pub flags: Vec<Flag>,
}

impl SupportHistory {
    pub fn academic_flags(&self) -> usize {
        self.flags.iter().filter(|f| f.is_academic()).count()
    }

    pub fn wellbeing_flags(&self) -> usize {
        self.flags.iter().filter(|f| f.is_wellbeing()).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub student_id: String,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub academic_info: AcademicInfo,
    #[serde(default)]
    pub support_history: SupportHistory,
}

/// The self-reported profile fields collected with a session request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intake {
    pub student_id: String,
    #[serde(default)]
    pub year: ClassYear,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub gpa: Option<f64>,
}

impl StudentRecord {
    /// Build a record from intake fields alone.
    pub fn from_intake(intake: &Intake) -> Self {
        let today = Local::now().format("%Y-%m-%d").to_string();
        Self {
            student_id: intake.student_id.clone(),
            personal_info: PersonalInfo {
                major: intake.major.clone(),
                year: intake.year,
                career_goals: default_career_goals(&intake.major),
                ..PersonalInfo::default()
            },
            academic_info: AcademicInfo {
                overall_gpa: intake.gpa,
                academic_standing: intake
                    .gpa
                    .map(standing_for_gpa)
                    .unwrap_or("Unknown")
                    .to_string(),
                ..AcademicInfo::default()
            },
            support_history: SupportHistory {
                flags: intake
                    .gpa
                    .and_then(|gpa| academic_flag_for_gpa(gpa, &today))
                    .into_iter()
                    .collect(),
                ..SupportHistory::default()
            },
        }
    }

    /// Refresh profile fields from a newer intake, keeping history and courses.
    pub fn apply_intake(&mut self, intake: &Intake) {
        if !intake.major.is_empty() {
            if self.personal_info.major != intake.major {
                self.personal_info.career_goals = default_career_goals(&intake.major);
            }
            self.personal_info.major = intake.major.clone();
        }
        if intake.year != ClassYear::Unknown {
            self.personal_info.year = intake.year;
        }
        if let Some(gpa) = intake.gpa {
            self.academic_info.overall_gpa = Some(gpa);
            self.academic_info.academic_standing = standing_for_gpa(gpa).to_string();
        }
    }

    pub fn is_first_year(&self) -> bool {
        self.personal_info.year == ClassYear::Freshman
    }
}

/// Academic standing band for a GPA.
pub fn standing_for_gpa(gpa: f64) -> &'static str {
    if gpa >= 3.5 {
        "Dean's List"
    } else if gpa >= 3.0 {
        "Good Standing"
    } else if gpa >= 2.0 {
        "Academic Warning"
    } else {
        "Academic Probation"
    }
}

fn academic_flag_for_gpa(gpa: f64, today: &str) -> Option<Flag> {
    let (severity, description) = if gpa < 2.0 {
        ("High", "Student at risk of academic probation")
    } else if gpa < 2.5 {
        ("Medium", "Struggling in multiple courses")
    } else {
        return None;
    };
    Some(Flag {
        kind: "Academic".to_string(),
        severity: severity.to_string(),
        description: description.to_string(),
        date_flagged: Some(today.to_string()),
    })
}

fn default_career_goals(major: &str) -> Vec<String> {
    let goals: &[&str] = match major {
        "Computer Science" => &["Software Engineer", "Data Scientist"],
        "Psychology" => &["Clinical Psychologist", "Counselor"],
        "Business Administration" => &["Marketing Manager", "Financial Analyst"],
        "Engineering" => &["Mechanical Engineer", "Civil Engineer"],
        "Biology" => &["Physician", "Research Scientist"],
        "" => &[],
        _ => &["Professional in field", "Graduate studies"],
    };
    goals.iter().map(|g| g.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_intake_derives_standing_and_flags() {
        let record = StudentRecord::from_intake(&Intake {
            student_id: "S1".into(),
            year: ClassYear::Sophomore,
            major: "Psychology".into(),
            gpa: Some(2.3),
        });

        assert_eq!(record.academic_info.academic_standing, "Academic Warning");
        assert_eq!(record.support_history.academic_flags(), 1);
        assert_eq!(record.support_history.flags[0].severity, "Medium");
        assert_eq!(record.personal_info.career_goals, vec!["Clinical Psychologist", "Counselor"]);
    }

    #[test]
    fn test_unknown_gpa_leaves_standing_unknown() {
        let record = StudentRecord::from_intake(&Intake {
            student_id: "S2".into(),
            ..Intake::default()
        });
        assert_eq!(record.academic_info.overall_gpa, None);
        assert_eq!(record.academic_info.academic_standing, "Unknown");
        assert!(record.support_history.flags.is_empty());
    }

    #[test]
    fn test_record_json_layout() {
        let json = r#"{
            "student_id": "S3",
            "personal_info": {"major": "Biology", "year": "Junior", "interests": ["Music"]},
            "academic_info": {
                "overall_gpa": 3.1,
                "completed_courses": [{"name": "Genetics", "credits": 4, "grade": "A"}]
            },
            "support_history": {"flags": [{"type": "Well-being", "severity": "Medium", "description": "stress"}]}
        }"#;
        let record: StudentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.personal_info.year, ClassYear::Junior);
        assert_eq!(record.academic_info.completed_credits(), 4);
        assert_eq!(record.support_history.wellbeing_flags(), 1);
    }

    #[test]
    fn test_unrecognized_year_is_unknown() {
        assert_eq!("Postdoc".parse::<ClassYear>().unwrap(), ClassYear::Unknown);
        assert_eq!(" junior ".parse::<ClassYear>().unwrap(), ClassYear::Junior);
        let year: ClassYear = serde_json::from_str("\"Fifth-year\"").unwrap();
        assert_eq!(year, ClassYear::Unknown);
    }
}
