use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::tools::{Tool, ToolContext, ToolFinding, Toolkit};

/// A mentoring role that turns one context into a set of findings.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;
    fn agent_type(&self) -> &str;
    fn capabilities(&self) -> Vec<String>;
    async fn handle(&self, ctx: &ToolContext) -> Result<AgentReport>;
    async fn health_check(&self) -> Result<AgentHealth>;
}

/// Agent health information
#[derive(Debug, Clone, Serialize)]
pub struct AgentHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub error_count: u64,
    pub average_response_time_ms: f64,
}

/// Findings of one agent, in tool order.
#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub agent: String,
    pub role: String,
    pub findings: Vec<ToolFinding>,
}

impl AgentReport {
    pub fn finding(&self, tool: &str) -> Option<&ToolFinding> {
        self.findings.iter().find(|f| f.tool_name() == tool)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    Mentor,
    Counselor,
    AcademicAdvisor,
}

impl AgentRole {
    pub const ALL: [AgentRole; 3] = [AgentRole::Mentor, AgentRole::Counselor, AgentRole::AcademicAdvisor];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AgentRole::Mentor => "mentor",
            AgentRole::Counselor => "counselor",
            AgentRole::AcademicAdvisor => "academic_advisor",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AgentRole::Mentor => "Student Mentor",
            AgentRole::Counselor => "Well-being Counselor",
            AgentRole::AcademicAdvisor => "Academic Advisor",
        }
    }

    pub fn tools(&self) -> &'static [&'static str] {
        match self {
            AgentRole::Mentor => &["emotion", "student_data", "safety", "academic", "career"],
            AgentRole::Counselor => &["emotion", "safety", "student_data", "study"],
            AgentRole::AcademicAdvisor => &["academic", "student_data", "career", "resources"],
        }
    }
}

/// Runs its role's tools in order over the shared context.
pub struct MentorAgent {
    role: AgentRole,
    tools: Vec<Arc<dyn Tool>>,
    request_count: AtomicU64,
    error_count: AtomicU64,
    total_response_ms: AtomicU64,
    start_time: Instant,
}

impl MentorAgent {
    pub fn new(role: AgentRole, toolkit: &Toolkit) -> Result<Self> {
        let tools = toolkit
            .select(role.tools())
            .with_context(|| format!("toolkit cannot serve agent '{}'", role.name()))?;
        Ok(Self {
            role,
            tools,
            request_count: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            total_response_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        })
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    fn run_tools(&self, ctx: &ToolContext) -> Result<Vec<ToolFinding>> {
        self.tools
            .iter()
            .map(|tool| {
                tool.run(ctx)
                    .with_context(|| format!("tool '{}' failed", tool.name()))
            })
            .collect()
    }
}

#[async_trait]
impl Agent for MentorAgent {
    fn name(&self) -> &str {
        self.role.name()
    }

    fn agent_type(&self) -> &str {
        self.role.title()
    }

    fn capabilities(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.description().to_string()).collect()
    }

    #[instrument(skip(self, ctx), fields(agent = self.role.name()))]
    async fn handle(&self, ctx: &ToolContext) -> Result<AgentReport> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        let result = self.run_tools(ctx);
        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.total_response_ms.fetch_add(elapsed_ms, Ordering::Relaxed);

        match result {
            Ok(findings) => {
                info!("Agent '{}' produced {} findings", self.role.name(), findings.len());
                Ok(AgentReport {
                    agent: self.role.name().to_string(),
                    role: self.role.title().to_string(),
                    findings,
                })
            }
            Err(e) => {
                self.error_count.fetch_add(1, Ordering::Relaxed);
                error!("Agent '{}' failed: {:#}", self.role.name(), e);
                Err(e)
            }
        }
    }

    async fn health_check(&self) -> Result<AgentHealth> {
        let requests = self.request_count.load(Ordering::Relaxed);
        let errors = self.error_count.load(Ordering::Relaxed);
        let total_ms = self.total_response_ms.load(Ordering::Relaxed);

        let degraded = requests > 0 && errors * 2 > requests;
        Ok(AgentHealth {
            status: if degraded { "degraded" } else { "healthy" }.to_string(),
            details: degraded.then(|| format!("{} of {} requests failed", errors, requests)),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            total_requests: requests,
            error_count: errors,
            average_response_time_ms: if requests == 0 {
                0.0
            } else {
                total_ms as f64 / requests as f64
            },
        })
    }
}

/// Agent factory for creating agents by role name
pub struct AgentFactory;

impl AgentFactory {
    pub fn create_agent(agent_type: &str, toolkit: &Toolkit) -> Result<Box<dyn Agent>> {
        let role = AgentRole::from_name(agent_type)
            .ok_or_else(|| anyhow!("Unknown agent type: {}", agent_type))?;
        Ok(Box::new(MentorAgent::new(role, toolkit)?))
    }
}
