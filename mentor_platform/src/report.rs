//! Markdown rendering of a finished session.
//!
//! A tool that more than one agent runs is rendered once, under the first
//! agent that ran it; later agents point back to it.

use std::collections::HashSet;

use crate::agent::AgentReport;
use crate::session::SessionReport;
use crate::tools::academic::AcademicAnalysis;
use crate::tools::career::CareerGuidance;
use crate::tools::emotion::EmotionAssessment;
use crate::tools::resources::{Resource, ResourcePlan};
use crate::tools::safety::{RiskTier, SafetyAssessment};
use crate::tools::student_data::StudentProfile;
use crate::tools::study::StudyAnalysis;
use crate::tools::ToolFinding;

#[derive(Debug, Default)]
struct Markdown {
    out: String,
}

impl Markdown {
    fn heading(&mut self, level: usize, text: &str) {
        self.out.push_str(&"#".repeat(level));
        self.out.push(' ');
        self.out.push_str(text);
        self.out.push_str("\n\n");
    }

    fn para(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push_str("\n\n");
    }

    fn field(&mut self, label: &str, value: impl std::fmt::Display) {
        self.out.push_str(&format!("- **{}:** {}\n", label, value));
    }

    fn bullets<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut any = false;
        for item in items {
            self.out.push_str("- ");
            self.out.push_str(item.as_ref());
            self.out.push('\n');
            any = true;
        }
        if !any {
            self.out.push_str("- _None_\n");
        }
        self.out.push('\n');
    }

    fn end_block(&mut self) {
        self.out.push('\n');
    }

    fn finish(self) -> String {
        self.out
    }
}

pub fn render(session: &SessionReport) -> String {
    let mut md = Markdown::default();
    let student = &session.student;
    let personal = &student.personal_info;

    md.heading(1, &format!("{} Report", session.session_type.label()));
    md.field("Student ID", &student.student_id);
    md.field("Major", or_unknown(&personal.major));
    md.field("Year", personal.year);
    md.field("GPA", gpa_text(student.academic_info.overall_gpa));
    md.field("Session ID", session.session_id);
    md.field("Started", &session.started_at);
    md.field("Completed", &session.completed_at);
    md.end_block();

    md.heading(2, "Student Message");
    if session.input.trim().is_empty() {
        md.para("_No message provided._");
    } else {
        let quoted: Vec<String> = session.input.lines().map(|l| format!("> {}", l)).collect();
        md.para(&quoted.join("\n"));
    }

    md.heading(2, "Summary");
    md.bullets(summary_lines(&session.agent_reports));

    let mut rendered: HashSet<&'static str> = HashSet::new();
    for agent in &session.agent_reports {
        md.heading(2, &format!("{} ({})", agent.role, agent.agent));
        for finding in &agent.findings {
            let tool = finding.tool_name();
            if !rendered.insert(tool) {
                md.para(&format!("_{} findings appear above._", section_title(tool)));
                continue;
            }
            md.heading(3, section_title(tool));
            render_finding(&mut md, finding);
        }
    }

    md.finish()
}

fn section_title(tool: &str) -> &'static str {
    match tool {
        "emotion" => "Emotional Assessment",
        "safety" => "Safety Assessment",
        "academic" => "Academic Progress",
        "resources" => "Recommended Resources",
        "study" => "Study Patterns",
        "career" => "Career Guidance",
        "student_data" => "Student Profile",
        _ => "Findings",
    }
}

/// One line per headline signal, safety first.
fn summary_lines(reports: &[AgentReport]) -> Vec<String> {
    let find = |tool: &str| reports.iter().find_map(|r| r.finding(tool));
    let mut lines = Vec::new();

    if let Some(ToolFinding::Safety(safety)) = find("safety") {
        let tier = safety.tier();
        lines.push(match tier {
            RiskTier::High => "**Safety risk: High.** Follow the escalation actions below immediately.".to_string(),
            _ => format!("Safety risk: {}", tier),
        });
    }
    if let Some(ToolFinding::Emotion(emotion)) = find("emotion") {
        lines.push(format!("Primary emotion: {}", emotion.primary_emotion));
    }
    if let Some(ToolFinding::Academic(academic)) = find("academic") {
        lines.push(format!(
            "Academic risk: {} (score {:.2})",
            academic.risk_assessment.risk_level, academic.risk_assessment.risk_score
        ));
    }
    if let Some(ToolFinding::Study(study)) = find("study") {
        lines.push(format!("Learning style: {}", study.learning_style.primary_style.as_str()));
    }
    if let Some(ToolFinding::Career(career)) = find("career") {
        lines.push(format!(
            "Major alignment: {:?}",
            career.career_assessment.major_alignment.alignment_level
        ));
    }
    lines
}

fn render_finding(md: &mut Markdown, finding: &ToolFinding) {
    match finding {
        ToolFinding::Emotion(e) => render_emotion(md, e),
        ToolFinding::Safety(s) => render_safety(md, s),
        ToolFinding::Academic(a) => render_academic(md, a),
        ToolFinding::Resources(r) => render_resources(md, r),
        ToolFinding::Study(s) => render_study(md, s),
        ToolFinding::Career(c) => render_career(md, c),
        ToolFinding::StudentData(p) => render_profile(md, p),
    }
}

fn render_emotion(md: &mut Markdown, e: &EmotionAssessment) {
    md.field("Primary emotion", &e.primary_emotion);
    md.field("Assessment", &e.assessment);
    let detected: Vec<String> = e
        .emotion_scores
        .iter()
        .filter(|(_, score)| *score > 0.0)
        .map(|(name, score)| format!("{} {:.2}", name, score))
        .collect();
    if !detected.is_empty() {
        md.field("Detected", detected.join(", "));
    }
    md.end_block();
    md.para("**Recommendations**");
    md.bullets(&e.recommendations);
}

fn render_safety(md: &mut Markdown, s: &SafetyAssessment) {
    let risk = &s.risk_assessment;
    md.field("Risk level", risk.overall_risk_level);
    if risk.primary_concerns.is_empty() {
        md.field("Primary concerns", "none identified");
    } else {
        md.field("Primary concerns", risk.primary_concerns.join(", "));
    }
    md.end_block();
    md.para("**Recommended actions**");
    md.bullets(&s.recommended_actions);
    md.para("**Campus resources**");
    md.bullets(s.campus_resources.iter().map(|r| format!("{}: {}", r.name, r.contact)));
}

fn render_academic(md: &mut Markdown, a: &AcademicAnalysis) {
    let summary = &a.summary;
    let progress = &a.graduation_progress;
    let projection = &a.current_semester_projection;

    md.field("GPA", gpa_text(summary.overall_gpa));
    md.field("Standing", &summary.academic_standing);
    md.field("Credits completed", summary.total_credits_completed);
    md.field("Current courses", summary.current_course_load);
    md.field("Performance trend", &a.performance_trends.trend);
    md.field(
        "Graduation progress",
        format!(
            "{}/{} credits ({:.1}%), {}; about {} semesters remaining",
            progress.completed_credits,
            progress.total_credits_needed,
            progress.percent_complete,
            progress.status,
            progress.estimated_semesters_remaining
        ),
    );
    md.field("This semester", &projection.likely_outcome);
    md.field(
        "Risk",
        format!("{} ({:.2})", a.risk_assessment.risk_level, a.risk_assessment.risk_score),
    );
    md.end_block();

    if !a.strengths_and_weaknesses.strengths.is_empty() {
        md.field("Strengths", a.strengths_and_weaknesses.strengths.join(", "));
    }
    if !a.strengths_and_weaknesses.weaknesses.is_empty() {
        md.field("Areas to strengthen", a.strengths_and_weaknesses.weaknesses.join(", "));
    }
    if !a.risk_assessment.risk_factors.is_empty() {
        md.para("**Risk factors**");
        md.bullets(&a.risk_assessment.risk_factors);
    }
    md.para("**Recommendations**");
    md.bullets(&a.recommendations);
}

fn render_resources(md: &mut Markdown, r: &ResourcePlan) {
    let needs = &r.identified_needs;
    let all_needs = needs
        .academic_needs
        .iter()
        .chain(&needs.wellness_needs)
        .chain(&needs.career_needs)
        .chain(&needs.community_needs)
        .chain(&needs.technology_needs);
    md.para("**Identified needs**");
    md.bullets(all_needs.map(|n| format!("{} ({}; {})", n.need, n.confidence, n.source)));

    let groups: [(&str, &[Resource]); 5] = [
        ("Academic support", &r.resources.academic_support),
        ("Wellness support", &r.resources.wellness_support),
        ("Career development", &r.resources.career_development),
        ("Community engagement", &r.resources.community_engagement),
        ("Technology tools", &r.resources.technology_tools),
    ];
    for (title, resources) in groups {
        if resources.is_empty() {
            continue;
        }
        md.para(&format!("**{}**", title));
        md.bullets(resources.iter().map(|res| {
            format!("{}: {} ({}, {})", res.name, res.description, res.contact, res.location)
        }));
    }

    md.para("**Next steps**");
    md.bullets(&r.personalized_recommendations);
}

fn render_study(md: &mut Markdown, s: &StudyAnalysis) {
    let style = &s.learning_style;
    md.field("Insight confidence", &s.text_insights.insight_confidence);
    md.field(
        "Learning style",
        format!("{} (secondary: {})", style.primary_style.as_str(), style.secondary_style.as_str()),
    );
    md.end_block();
    md.bullets(&s.text_insights.insights);

    let recs = &s.recommendations;
    md.para("**Study recommendations**");
    md.bullets(
        recs.learning_style_based
            .iter()
            .chain(&recs.time_management)
            .chain(&recs.study_environment)
            .chain(&recs.technology_tools),
    );
}

fn render_career(md: &mut Markdown, c: &CareerGuidance) {
    let assessment = &c.career_assessment;
    md.para("**Career paths**");
    md.bullets(
        assessment
            .recommended_career_paths
            .iter()
            .map(|p| format!("{} (outlook: {}, median salary: {})", p.title, p.outlook, p.median_salary)),
    );
    let alignment = &assessment.major_alignment;
    md.field(
        "Major alignment",
        format!("{:?} ({:.2})", alignment.alignment_level, alignment.alignment_score),
    );
    md.field("Recommendation", &alignment.recommendation);
    md.end_block();
    md.bullets(&alignment.alignment_factors);

    let prep = &assessment.current_preparedness;
    md.field(
        "Preparedness",
        format!("{:?} ({:.2}): {}", prep.preparedness_level, prep.preparedness_score, prep.assessment),
    );
    md.end_block();
    md.bullets(&prep.preparedness_factors);

    let skills = &c.action_plan.skill_development;
    md.field("Priority skills", skills.priority_skills.join(", "));
    if !skills.future_skills.is_empty() {
        md.field("Later skills", skills.future_skills.join(", "));
    }
    md.end_block();
    md.para("**Courses and certifications**");
    md.bullets(
        skills
            .recommended_courses
            .iter()
            .chain(&skills.recommended_certifications),
    );

    let exp = &c.action_plan.experience_recommendations;
    md.para("**Experiences**");
    md.bullets(
        exp.internships
            .iter()
            .chain(&exp.activities)
            .chain(&exp.events)
            .chain(&exp.projects),
    );

    md.para("**Timeline**");
    md.bullets(
        c.action_plan
            .timeline
            .iter()
            .map(|m| format!("{}: {}", m.timeframe, m.milestone)),
    );

    md.para("**Resources**");
    md.bullets(
        c.resources
            .campus_resources
            .iter()
            .chain(&c.resources.professional_organizations)
            .chain(&c.resources.online_platforms),
    );
}

fn render_profile(md: &mut Markdown, p: &StudentProfile) {
    md.field("Major", or_unknown(&p.major));
    md.field("Year", &p.year);
    md.field("Standing", &p.academic_standing);
    md.field("Completed credits", p.completed_credits);
    if !p.interests.is_empty() {
        md.field("Interests", p.interests.join(", "));
    }
    if !p.career_goals.is_empty() {
        md.field("Career goals", p.career_goals.join(", "));
    }
    md.field("Previous meetings", p.previous_meetings);
    md.end_block();
    if !p.flags.is_empty() {
        md.para("**Flags**");
        md.bullets(
            p.flags
                .iter()
                .map(|f| format!("{} ({}): {}", f.kind, f.severity, f.description)),
        );
    }
}

fn gpa_text(gpa: Option<f64>) -> String {
    gpa.map(|g| format!("{:.2}", g))
        .unwrap_or_else(|| "not on record".to_string())
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "Unknown"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentFactory, AgentRole};
    use crate::session::SessionType;
    use crate::student::{ClassYear, Intake, StudentRecord};
    use crate::tools::{ToolContext, Toolkit};
    use uuid::Uuid;

    async fn session(input: &str) -> SessionReport {
        let record = StudentRecord::from_intake(&Intake {
            student_id: "M1".into(),
            year: ClassYear::Freshman,
            major: "Psychology".into(),
            gpa: Some(2.2),
        });
        let toolkit = Toolkit::standard().unwrap();
        let ctx = ToolContext::new(input, Some(record.clone()));
        let mut reports = Vec::new();
        for role in [AgentRole::Counselor, AgentRole::Mentor] {
            let agent = AgentFactory::create_agent(role.name(), &toolkit).unwrap();
            reports.push(agent.handle(&ctx).await.unwrap());
        }
        SessionReport {
            session_id: Uuid::nil(),
            session_type: SessionType::WellBeingCheck,
            student: record,
            input: input.to_string(),
            started_at: "2024-01-01 10:00:00".into(),
            completed_at: "2024-01-01 10:00:01".into(),
            agent_reports: reports,
            markdown: String::new(),
            report_path: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_report_has_header_and_sections() {
        let md = render(&session("I feel hopeless and can't handle this").await);
        assert!(md.starts_with("# Well-being Check Report\n"));
        assert!(md.contains("- **Student ID:** M1"));
        assert!(md.contains("> I feel hopeless and can't handle this"));
        assert!(md.contains("### Safety Assessment"));
        assert!(md.contains("### Study Patterns"));
        assert!(md.contains("## Student Mentor (mentor)"));
    }

    #[tokio::test]
    async fn test_shared_tools_render_once() {
        let md = render(&session("").await);
        assert_eq!(md.matches("### Emotional Assessment").count(), 1);
        assert!(md.contains("_Emotional Assessment findings appear above._"));
        assert!(md.contains("_No message provided._"));
    }

    #[tokio::test]
    async fn test_career_section_lists_plan_and_timeline() {
        let md = render(&session("Thinking about what comes after college").await);
        assert!(md.contains("### Career Guidance"));
        assert!(md.contains("- **Preparedness:** EarlyStage (0.15)"));
        assert!(md.contains("- Freshman: First Semester: Explore introductory courses and student organizations"));
        assert!(md.contains("- Psi Chi"));
    }

    #[tokio::test]
    async fn test_high_risk_is_called_out_in_summary() {
        let md = render(&session("I want to hurt myself, I will hurt myself").await);
        assert!(md.contains("**Safety risk: High.**"));
    }
}
