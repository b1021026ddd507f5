//! Mentoring sessions: what a caller asks for, what comes back, and the
//! service that runs a session under the bounded wait.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::agent::AgentReport;
use crate::orchestrator::Orchestrator;
use crate::student::{Intake, StudentRecord};
use crate::wait::{BoundedWait, WaitOutcome};

pub const TIMEOUT_MESSAGE: &str = "The session is taking longer than expected and is still running in the background. \
Check the server logs, then fetch the stored report once it has been written.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum SessionType {
    #[default]
    InitialAssessment,
    AcademicPlanning,
    WellBeingCheck,
    FollowUp,
    Emergency,
}

impl SessionType {
    pub const ALL: [SessionType; 5] = [
        SessionType::InitialAssessment,
        SessionType::AcademicPlanning,
        SessionType::WellBeingCheck,
        SessionType::FollowUp,
        SessionType::Emergency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::InitialAssessment => "initial_assessment",
            SessionType::AcademicPlanning => "academic_planning",
            SessionType::WellBeingCheck => "well_being_check",
            SessionType::FollowUp => "follow_up",
            SessionType::Emergency => "emergency",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionType::InitialAssessment => "Initial Assessment",
            SessionType::AcademicPlanning => "Academic Planning",
            SessionType::WellBeingCheck => "Well-being Check",
            SessionType::FollowUp => "Follow-up",
            SessionType::Emergency => "Emergency",
        }
    }

    /// Markdown file the session's report is stored under.
    pub fn report_file(&self) -> &'static str {
        match self {
            SessionType::InitialAssessment => "initial_assessment.md",
            SessionType::AcademicPlanning => "academic_plan.md",
            SessionType::WellBeingCheck => "wellbeing_assessment.md",
            SessionType::FollowUp => "progress_report.md",
            SessionType::Emergency => "emergency_response.md",
        }
    }

    /// Agents that run for this session, in order.
    pub fn plan(&self) -> &'static [&'static str] {
        match self {
            SessionType::InitialAssessment => &["mentor", "counselor", "academic_advisor"],
            SessionType::AcademicPlanning => &["academic_advisor", "mentor"],
            SessionType::WellBeingCheck => &["counselor", "mentor"],
            SessionType::FollowUp => &["mentor", "academic_advisor"],
            SessionType::Emergency => &["counselor", "mentor"],
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized names fall back to an initial assessment.
impl FromStr for SessionType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Ok(Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .unwrap_or_default())
    }
}

impl From<String> for SessionType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(session_type) => session_type,
            Err(never) => match never {},
        }
    }
}

/// Everything needed to run one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    #[serde(flatten)]
    pub intake: Intake,
    #[serde(default)]
    pub session_type: SessionType,
    #[serde(default)]
    pub input: String,
}

impl SessionRequest {
    pub fn new(intake: Intake, session_type: SessionType, input: impl Into<String>) -> Self {
        Self {
            intake,
            session_type,
            input: input.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let id = &self.intake.student_id;
        if id.trim().is_empty() {
            bail!("student_id is required");
        }
        if let Some(gpa) = self.intake.gpa {
            if !(0.0..=4.0).contains(&gpa) {
                bail!("gpa must be between 0.0 and 4.0, got {}", gpa);
            }
        }
        Ok(())
    }
}

/// Structured outcome of a finished session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub session_type: SessionType,
    pub student: StudentRecord,
    pub input: String,
    pub started_at: String,
    pub completed_at: String,
    pub agent_reports: Vec<AgentReport>,
    pub markdown: String,
    pub report_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Completed,
    Failed,
    Running,
}

/// What a user sees for a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SessionResponse {
    pub fn from_outcome(outcome: WaitOutcome<SessionReport>) -> Self {
        match outcome {
            WaitOutcome::Completed(report) => Self {
                status: SessionStatus::Completed,
                report: Some(report.markdown),
                message: None,
            },
            WaitOutcome::Failed(error) => Self {
                status: SessionStatus::Failed,
                report: None,
                message: Some(format!("Error during execution: {}", error)),
            },
            WaitOutcome::TimedOut { .. } => Self {
                status: SessionStatus::Running,
                report: None,
                message: Some(TIMEOUT_MESSAGE.to_string()),
            },
        }
    }
}

/// Runs sessions on their own task and waits for them within a bound.
#[derive(Clone)]
pub struct SessionService {
    orchestrator: Arc<Orchestrator>,
    wait: BoundedWait,
}

impl SessionService {
    pub fn new(orchestrator: Arc<Orchestrator>, wait: BoundedWait) -> Self {
        Self { orchestrator, wait }
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    pub fn wait_policy(&self) -> BoundedWait {
        self.wait
    }

    #[instrument(skip(self, request), fields(student_id = %request.intake.student_id, session_type = %request.session_type))]
    pub async fn run(&self, request: SessionRequest) -> SessionResponse {
        SessionResponse::from_outcome(self.run_with(request, self.wait).await)
    }

    /// Run under an explicit wait policy, returning the raw outcome.
    pub async fn run_with(&self, request: SessionRequest, wait: BoundedWait) -> WaitOutcome<SessionReport> {
        info!("Starting {} session", request.session_type);
        let orchestrator = Arc::clone(&self.orchestrator);
        let outcome = wait
            .run(
                async move { orchestrator.run_session(request).await },
                |elapsed| debug!("Session still running after {:?}", elapsed),
            )
            .await;

        match &outcome {
            WaitOutcome::Completed(report) => {
                info!("Session {} completed", report.session_id);
            }
            WaitOutcome::Failed(message) => warn!("Session failed: {}", message),
            WaitOutcome::TimedOut { waited } => warn!("Session still running after {:?}", waited),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::ClassYear;

    #[test]
    fn test_unknown_session_type_falls_back() {
        assert_eq!("follow_up".parse::<SessionType>().unwrap(), SessionType::FollowUp);
        assert_eq!(" Emergency ".parse::<SessionType>().unwrap(), SessionType::Emergency);
        assert_eq!("tea_break".parse::<SessionType>().unwrap(), SessionType::InitialAssessment);
    }

    #[test]
    fn test_report_files_and_plans() {
        assert_eq!(SessionType::AcademicPlanning.report_file(), "academic_plan.md");
        assert_eq!(SessionType::WellBeingCheck.report_file(), "wellbeing_assessment.md");
        assert_eq!(SessionType::InitialAssessment.plan(), &["mentor", "counselor", "academic_advisor"]);
        assert_eq!(SessionType::Emergency.plan(), &["counselor", "mentor"]);
    }

    #[test]
    fn test_request_deserializes_flat_with_lenient_type() {
        let request: SessionRequest = serde_json::from_str(
            r#"{"student_id": "S1", "year": "Junior", "major": "Biology", "gpa": 3.1,
                "session_type": "something_else", "input": "hi"}"#,
        )
        .unwrap();
        assert_eq!(request.intake.year, ClassYear::Junior);
        assert_eq!(request.session_type, SessionType::InitialAssessment);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_validation() {
        let mut request = SessionRequest::new(Intake::default(), SessionType::FollowUp, "");
        assert!(request.validate().is_err());
        request.intake.student_id = "S2".into();
        request.intake.gpa = Some(4.7);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_response_messages() {
        let failed = SessionResponse::from_outcome(WaitOutcome::Failed("disk full".into()));
        assert_eq!(failed.status, SessionStatus::Failed);
        assert_eq!(failed.message.as_deref(), Some("Error during execution: disk full"));

        let running = SessionResponse::from_outcome(WaitOutcome::TimedOut {
            waited: std::time::Duration::from_secs(120),
        });
        assert_eq!(running.status, SessionStatus::Running);
        assert!(running.report.is_none());
    }
}
