//! End-to-end mentoring flows: sessions through the service, stored reports,
//! and single tool runs through the toolkit.

use std::sync::Arc;
use std::time::Duration;

use mentor_platform::{
    orchestrator::Orchestrator,
    session::{
        SessionRequest, SessionResponse, SessionService, SessionStatus, SessionType, TIMEOUT_MESSAGE,
    },
    settings::Settings,
    student::{ClassYear, Intake},
    tools::{ToolContext, ToolFinding, Toolkit},
    wait::{BoundedWait, WaitOutcome},
};
use tempfile::tempdir;
use tracing_test::traced_test;

async fn service(base_dir: &std::path::Path) -> SessionService {
    let mut settings = Settings::default();
    settings.storage.base_dir = base_dir.to_path_buf();
    let orchestrator = Arc::new(Orchestrator::from_settings(&settings).await.unwrap());
    SessionService::new(
        orchestrator,
        BoundedWait::new(Duration::from_secs(30), Duration::from_millis(25)),
    )
}

fn intake(student_id: &str, gpa: Option<f64>) -> Intake {
    Intake {
        student_id: student_id.to_string(),
        year: ClassYear::Freshman,
        major: "Computer Science".to_string(),
        gpa,
    }
}

#[tokio::test]
#[traced_test]
async fn test_initial_assessment_produces_stored_report() {
    let dir = tempdir().unwrap();
    let service = service(dir.path()).await;

    let request = SessionRequest::new(
        intake("S12345", Some(3.5)),
        SessionType::InitialAssessment,
        "I'm feeling overwhelmed with my coursework and struggling to balance academics with extracurricular activities.",
    );
    let response = service.run(request).await;

    assert_eq!(response.status, SessionStatus::Completed);
    let report = response.report.unwrap();
    assert!(report.starts_with("# Initial Assessment Report"));
    assert!(report.contains("## Student Mentor (mentor)"));
    assert!(report.contains("## Well-being Counselor (counselor)"));
    assert!(report.contains("## Academic Advisor (academic_advisor)"));

    let stored = dir.path().join("S12345").join("initial_assessment.md");
    assert_eq!(std::fs::read_to_string(stored).unwrap(), report);
    assert!(dir.path().join("S12345").join("student_data.json").exists());
    assert!(logs_contain("Starting initial_assessment session"));
}

#[tokio::test]
async fn test_emergency_session_escalates_high_risk() {
    let dir = tempdir().unwrap();
    let service = service(dir.path()).await;

    let request = SessionRequest::new(
        intake("E1", None),
        SessionType::Emergency,
        "I want to hurt myself. I keep thinking I will hurt myself tonight.",
    );
    let response = service.run(request).await;

    let report = response.report.unwrap();
    assert!(report.contains("**Safety risk: High.**"));
    assert!(dir.path().join("E1").join("emergency_response.md").exists());
}

#[tokio::test]
async fn test_repeat_session_reuses_record() {
    let dir = tempdir().unwrap();
    let service = service(dir.path()).await;

    for gpa in [Some(3.9), Some(1.8)] {
        let request = SessionRequest::new(intake("R7", gpa), SessionType::FollowUp, "checking in");
        assert_eq!(service.run(request).await.status, SessionStatus::Completed);
    }

    let record = service
        .orchestrator()
        .store()
        .load_record("R7")
        .unwrap()
        .unwrap();
    assert_eq!(record.academic_info.overall_gpa, Some(1.8));
}

#[tokio::test]
async fn test_invalid_request_fails_without_report() {
    let dir = tempdir().unwrap();
    let service = service(dir.path()).await;

    let request = SessionRequest::new(intake("  ", None), SessionType::FollowUp, "hello");
    let response = service.run(request).await;
    assert_eq!(response.status, SessionStatus::Failed);
    assert!(response
        .message
        .unwrap()
        .starts_with("Error during execution:"));
    assert!(response.report.is_none());
}

#[tokio::test]
async fn test_zero_wait_reports_still_running() {
    let dir = tempdir().unwrap();
    let service = service(dir.path()).await;

    let request = SessionRequest::new(intake("T1", None), SessionType::WellBeingCheck, "tired");
    let outcome = service
        .run_with(request, BoundedWait::new(Duration::ZERO, Duration::from_millis(5)))
        .await;
    assert!(matches!(outcome, WaitOutcome::TimedOut { .. }));

    let response = SessionResponse::from_outcome(outcome);
    assert_eq!(response.status, SessionStatus::Running);
    assert_eq!(response.message.as_deref(), Some(TIMEOUT_MESSAGE));
    assert!(response.report.is_none());
}

#[test]
fn test_toolkit_runs_tools_on_json_payload() {
    let toolkit = Toolkit::standard().unwrap();
    let ctx = ToolContext::parse(r#"{"input": "I am so happy and excited about my project"}"#);

    match toolkit.run("emotion", &ctx).unwrap() {
        ToolFinding::Emotion(assessment) => assert_eq!(assessment.primary_emotion, "joy"),
        other => panic!("unexpected finding: {}", other.tool_name()),
    }
    assert!(toolkit.run("astrology", &ctx).is_err());
}

#[test]
fn test_safety_without_concerns_is_low_risk() {
    let toolkit = Toolkit::standard().unwrap();
    let ctx = ToolContext::from_text("Looking forward to the weekend");

    match toolkit.run("safety", &ctx).unwrap() {
        ToolFinding::Safety(assessment) => {
            assert_eq!(assessment.tier().as_str(), "Low");
            assert!(assessment.risk_assessment.primary_concerns.is_empty());
            assert!(!assessment.campus_resources.is_empty());
        }
        other => panic!("unexpected finding: {}", other.tool_name()),
    }
}
