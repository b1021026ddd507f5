//! Student Mentoring Platform - Core Library
//!
//! Keyword-driven mentoring sessions: lexical classifiers score free text
//! and student records, agents combine their findings, and every session
//! ends in a Markdown report stored per student.

pub mod agent;
pub mod batch;
pub mod cli;
pub mod middleware;
pub mod orchestrator;
pub mod policy;
pub mod report;
pub mod scoring;
pub mod server;
pub mod session;
pub mod settings;
pub mod storage;
pub mod student;
pub mod telemetry;
pub mod tools;
pub mod wait;

pub use agent::Agent;
pub use orchestrator::Orchestrator;
pub use session::{SessionRequest, SessionResponse, SessionService, SessionType};
