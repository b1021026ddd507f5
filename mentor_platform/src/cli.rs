//! Command-line interface definitions using clap derive API.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::session::{SessionRequest, SessionType};
use crate::student::{ClassYear, Intake};

/// Student mentoring platform CLI
#[derive(Parser)]
#[command(name = "mentor-cli")]
#[command(about = "Keyword-driven student mentoring sessions and reports")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind to (defaults to the configured server address)
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Run a single mentoring session and print its report
    Session {
        #[arg(long)]
        student_id: String,
        #[arg(long, default_value = "Freshman")]
        year: ClassYear,
        #[arg(long, default_value = "")]
        major: String,
        #[arg(long)]
        gpa: Option<f64>,
        #[arg(long, default_value = "initial_assessment")]
        session_type: SessionType,
        /// What the student wants to talk about
        #[arg(long, default_value = "")]
        input: String,
    },
    /// Run one tool on raw text or a JSON payload
    Analyze {
        /// Tool name (emotion, safety, academic, resources, study, career, student_data)
        #[arg(long)]
        tool: String,
        input: String,
    },
    /// Run a batch job from configuration file
    Batch {
        /// Path to the batch configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

impl Commands {
    /// Session request for the `session` subcommand.
    pub fn session_request(&self) -> Option<SessionRequest> {
        match self {
            Commands::Session {
                student_id,
                year,
                major,
                gpa,
                session_type,
                input,
            } => Some(SessionRequest::new(
                Intake {
                    student_id: student_id.clone(),
                    year: *year,
                    major: major.clone(),
                    gpa: *gpa,
                },
                *session_type,
                input.clone(),
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_arguments() {
        let cli = Cli::try_parse_from([
            "mentor-cli",
            "session",
            "--student-id",
            "S5",
            "--year",
            "junior",
            "--gpa",
            "2.4",
            "--session-type",
            "well_being_check",
            "--input",
            "so stressed",
        ])
        .unwrap();

        let request = cli.command.session_request().unwrap();
        assert_eq!(request.intake.student_id, "S5");
        assert_eq!(request.intake.year, ClassYear::Junior);
        assert_eq!(request.intake.gpa, Some(2.4));
        assert_eq!(request.session_type, SessionType::WellBeingCheck);
    }

    #[test]
    fn test_serve_address_is_optional() {
        let cli = Cli::try_parse_from(["mentor-cli", "serve"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { addr: None }));

        let cli = Cli::try_parse_from(["mentor-cli", "serve", "--addr", "0.0.0.0:9000"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { addr: Some(_) }));
    }

    #[test]
    fn test_analyze_takes_tool_and_input() {
        let cli = Cli::try_parse_from(["mentor-cli", "analyze", "--tool", "emotion", "I am happy"]).unwrap();
        match cli.command {
            Commands::Analyze { tool, input } => {
                assert_eq!(tool, "emotion");
                assert_eq!(input, "I am happy");
            }
            _ => panic!("expected analyze"),
        }
    }
}
