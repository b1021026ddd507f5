//! Core coordinator that routes work to the registered agents and runs
//! sessions as sequential agent plans.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    agent::{Agent, AgentFactory, AgentHealth, AgentReport, AgentRole},
    report,
    session::{SessionReport, SessionRequest},
    settings::Settings,
    storage::ReportStore,
    student::StudentRecord,
    tools::{ToolContext, Toolkit},
};

type Task = (String, Arc<ToolContext>, mpsc::Sender<Result<AgentReport>>);

pub struct Orchestrator {
    agents: Arc<Mutex<HashMap<String, Arc<dyn Agent>>>>,
    store: ReportStore,
    agent_timeout: Duration,
}

impl Orchestrator {
    pub fn new(store: ReportStore, agent_timeout: Duration) -> Self {
        Self {
            agents: Arc::new(Mutex::new(HashMap::new())),
            store,
            agent_timeout,
        }
    }

    /// Orchestrator with the storage root initialized and every built-in agent registered.
    #[instrument(skip(settings))]
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let store = ReportStore::init(&settings.storage.base_dir)?;
        let orchestrator = Self::new(
            store,
            Duration::from_secs(settings.session.agent_timeout_seconds),
        );

        let toolkit = Toolkit::standard()?;
        for role in AgentRole::ALL {
            let agent = AgentFactory::create_agent(role.name(), &toolkit)?;
            orchestrator
                .register_agent(role.name().to_string(), Arc::from(agent))
                .await?;
        }
        Ok(orchestrator)
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// Dispatch a task `(agent_name, context)`; send the result via `resp_tx`.
    #[instrument(skip(self, task), fields(agent_name))]
    pub async fn dispatch(&self, task: Task) -> Result<()> {
        let (name, ctx, resp_tx) = task;
        tracing::Span::current().record("agent_name", name.as_str());

        let agent = {
            let map = self.agents.lock().await;
            match map.get(&name) {
                Some(agent) => agent.clone(),
                None => {
                    let _ = resp_tx.send(Err(anyhow!("Unknown agent '{}'", name))).await;
                    return Ok(());
                }
            }
        };

        let result = tokio::time::timeout(self.agent_timeout, agent.handle(&ctx)).await;

        let response = match result {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(e)) => {
                error!("Agent '{}' execution failed: {:#}", name, e);
                Err(e)
            }
            Err(_) => {
                error!("Agent '{}' execution timed out after {:?}", name, self.agent_timeout);
                Err(anyhow!("Agent '{}' timed out after {:?}", name, self.agent_timeout))
            }
        };

        let _ = resp_tx.send(response).await;
        Ok(())
    }

    /// Dispatch to one agent and wait for its reply.
    pub async fn run_agent(&self, name: &str, ctx: Arc<ToolContext>) -> Result<AgentReport> {
        let (tx, mut rx) = mpsc::channel(1);
        self.dispatch((name.to_string(), ctx, tx)).await?;
        rx.recv()
            .await
            .ok_or_else(|| anyhow!("Agent '{}' dropped its reply", name))?
    }

    /// Load or create the student's record, run the session plan, then
    /// render and store the report.
    #[instrument(skip(self, request), fields(student_id = %request.intake.student_id, session_type = %request.session_type))]
    pub async fn run_session(&self, request: SessionRequest) -> Result<SessionReport> {
        request.validate()?;
        let started_at = now();
        let intake = &request.intake;

        let record = match self.store.load_record(&intake.student_id)? {
            Some(mut record) => {
                record.apply_intake(intake);
                record
            }
            None => {
                info!("No stored record for '{}', creating one from intake", intake.student_id);
                StudentRecord::from_intake(intake)
            }
        };
        self.store.save_record(&record)?;

        let ctx = Arc::new(ToolContext::new(request.input.clone(), Some(record.clone())));
        let mut agent_reports = Vec::new();
        for name in request.session_type.plan() {
            let report = self
                .run_agent(name, Arc::clone(&ctx))
                .await
                .with_context(|| format!("{} session aborted", request.session_type.label()))?;
            agent_reports.push(report);
        }

        let mut session = SessionReport {
            session_id: Uuid::new_v4(),
            session_type: request.session_type,
            student: record,
            input: request.input,
            started_at,
            completed_at: now(),
            agent_reports,
            markdown: String::new(),
            report_path: Default::default(),
        };
        session.markdown = report::render(&session);
        session.report_path = self.store.write_report(
            &session.student.student_id,
            session.session_type.report_file(),
            &session.markdown,
        )?;

        info!("Session {} stored at {}", session.session_id, session.report_path.display());
        Ok(session)
    }

    /// Register an agent under `name`, replacing any previous one.
    #[instrument(skip(self, agent))]
    pub async fn register_agent(&self, name: String, agent: Arc<dyn Agent>) -> Result<()> {
        info!("Registering agent: {}", name);
        self.agents.lock().await.insert(name, agent);
        Ok(())
    }

    /// Registered agent names, sorted.
    pub async fn list_agents(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.lock().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn agent_health(&self) -> Vec<(String, AgentHealth)> {
        let agents: Vec<(String, Arc<dyn Agent>)> = {
            let map = self.agents.lock().await;
            map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        };

        let mut health = Vec::with_capacity(agents.len());
        for (name, agent) in agents {
            match agent.health_check().await {
                Ok(h) => health.push((name, h)),
                Err(e) => error!("Health check for '{}' failed: {}", name, e),
            }
        }
        health.sort_by(|a, b| a.0.cmp(&b.0));
        health
    }
}

fn now() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionType;
    use crate::student::{ClassYear, Intake};
    use async_trait::async_trait;

    struct SlowAgent;

    #[async_trait]
    impl Agent for SlowAgent {
        fn name(&self) -> &str {
            "slow"
        }

        fn agent_type(&self) -> &str {
            "test"
        }

        fn capabilities(&self) -> Vec<String> {
            Vec::new()
        }

        async fn handle(&self, _ctx: &ToolContext) -> Result<AgentReport> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(anyhow!("unreachable"))
        }

        async fn health_check(&self) -> Result<AgentHealth> {
            Err(anyhow!("no health"))
        }
    }

    fn orchestrator(dir: &std::path::Path) -> Orchestrator {
        Orchestrator::new(ReportStore::init(dir).unwrap(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_dispatch_to_unknown_agent_replies_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(dir.path());

        let (tx, mut rx) = mpsc::channel(1);
        let task = ("nonexistent".to_string(), Arc::new(ToolContext::default()), tx);
        orchestrator.dispatch(task).await.unwrap();

        let result = rx.recv().await.unwrap();
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_times_out_slow_agent() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(dir.path());
        orchestrator
            .register_agent("slow".to_string(), Arc::new(SlowAgent))
            .await
            .unwrap();

        let err = orchestrator
            .run_agent("slow", Arc::new(ToolContext::default()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_run_session_writes_report_and_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.storage.base_dir = dir.path().to_path_buf();
        let orchestrator = Orchestrator::from_settings(&settings).await.unwrap();
        assert_eq!(
            orchestrator.list_agents().await,
            vec!["academic_advisor", "counselor", "mentor"]
        );

        let request = SessionRequest::new(
            Intake {
                student_id: "S100".into(),
                year: ClassYear::Senior,
                major: "Business Administration".into(),
                gpa: Some(3.6),
            },
            SessionType::AcademicPlanning,
            "Thinking about my career after graduation",
        );
        let session = orchestrator.run_session(request).await.unwrap();

        let agents: Vec<&str> = session.agent_reports.iter().map(|r| r.agent.as_str()).collect();
        assert_eq!(agents, vec!["academic_advisor", "mentor"]);
        assert!(session.report_path.ends_with("S100/academic_plan.md"));
        assert!(session.report_path.exists());

        let stored = orchestrator.store().load_record("S100").unwrap().unwrap();
        assert_eq!(stored.academic_info.academic_standing, "Dean's List");

        let health = orchestrator.agent_health().await;
        let mentor = health.iter().find(|(name, _)| name == "mentor").unwrap();
        assert_eq!(mentor.1.total_requests, 1);
    }

    #[tokio::test]
    async fn test_invalid_student_id_is_rejected_before_any_work() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(dir.path());
        let request = SessionRequest::new(
            Intake {
                student_id: "../escape".into(),
                ..Intake::default()
            },
            SessionType::FollowUp,
            "",
        );
        assert!(orchestrator.run_session(request).await.is_err());
        assert!(!dir.path().join("..").join("escape").exists());
    }
}
