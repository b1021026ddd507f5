//! Profile summary of the student record under discussion.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use super::{timestamp, Tool, ToolContext, ToolFinding};
use crate::student::{Flag, StudentRecord};

pub const NAME: &str = "student_data";

#[derive(Debug, Clone, Serialize)]
pub struct StudentProfile {
    pub student_id: String,
    pub major: String,
    pub year: String,
    pub overall_gpa: Option<f64>,
    pub academic_standing: String,
    pub completed_credits: u32,
    pub current_course_load: usize,
    pub interests: Vec<String>,
    pub career_goals: Vec<String>,
    pub previous_meetings: usize,
    pub flags: Vec<Flag>,
    pub retrieved_at: String,
}

impl StudentProfile {
    pub fn from_record(record: &StudentRecord) -> Self {
        let personal = &record.personal_info;
        let academic = &record.academic_info;
        Self {
            student_id: record.student_id.clone(),
            major: personal.major.clone(),
            year: personal.year.to_string(),
            overall_gpa: academic.overall_gpa,
            academic_standing: academic.academic_standing.clone(),
            completed_credits: academic.completed_credits(),
            current_course_load: academic.current_courses.len(),
            interests: personal.interests.clone(),
            career_goals: personal.career_goals.clone(),
            previous_meetings: record.support_history.previous_meetings.len(),
            flags: record.support_history.flags.clone(),
            retrieved_at: timestamp(),
        }
    }
}

pub struct StudentDataTool;

impl Tool for StudentDataTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Summarizes the student's academic and personal record"
    }

    fn run(&self, ctx: &ToolContext) -> Result<ToolFinding> {
        let record = ctx.record();
        info!("Student data lookup for '{}'", record.student_id);
        Ok(ToolFinding::StudentData(StudentProfile::from_record(&record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::{ClassYear, Intake};

    #[test]
    fn test_profile_reflects_record() {
        let record = StudentRecord::from_intake(&Intake {
            student_id: "S42".into(),
            year: ClassYear::Freshman,
            major: "Computer Science".into(),
            gpa: Some(1.8),
        });
        let ctx = ToolContext::new("", Some(record));
        let ToolFinding::StudentData(profile) = StudentDataTool.run(&ctx).unwrap() else {
            panic!("wrong finding");
        };
        assert_eq!(profile.student_id, "S42");
        assert_eq!(profile.year, "Freshman");
        assert_eq!(profile.academic_standing, "Academic Probation");
        assert_eq!(profile.flags.len(), 1);
    }

    #[test]
    fn test_missing_record_yields_empty_profile() {
        let ToolFinding::StudentData(profile) = StudentDataTool.run(&ToolContext::default()).unwrap() else {
            panic!("wrong finding");
        };
        assert_eq!(profile.year, "Unknown");
        assert_eq!(profile.overall_gpa, None);
    }
}
