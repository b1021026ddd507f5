//! HTTP surface: intake form, session API, stored report retrieval and health.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    middleware,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

use crate::{
    middleware::{
        create_body_limit_layer, create_rate_limiter, rate_limit_middleware,
        request_logging_middleware, security_headers_middleware,
    },
    orchestrator::Orchestrator,
    session::{SessionRequest, SessionResponse, SessionService, SessionStatus, SessionType},
    settings::{SecurityConfig, Settings},
    student::{ClassYear, Intake},
    wait::BoundedWait,
};

const DEFAULT_INPUT: &str = "I'm feeling overwhelmed with my coursework and struggling to balance academics with extracurricular activities.";

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionService,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(sessions: SessionService) -> Self {
        Self {
            sessions,
            started_at: Instant::now(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
    agents: Vec<AgentStatus>,
}

#[derive(Serialize)]
struct AgentStatus {
    name: String,
    status: String,
    total_requests: u64,
    error_count: u64,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Intake form fields as posted by the browser.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SessionForm {
    pub student_id: String,
    pub year: String,
    pub major: String,
    pub gpa: String,
    pub session_type: String,
    pub input: String,
}

impl SessionForm {
    /// An unparseable GPA is treated as not provided.
    pub fn into_request(self) -> SessionRequest {
        let year = self.year.parse::<ClassYear>().unwrap_or_default();
        SessionRequest::new(
            Intake {
                student_id: self.student_id.trim().to_string(),
                year,
                major: self.major.trim().to_string(),
                gpa: self.gpa.trim().parse::<f64>().ok(),
            },
            SessionType::from(self.session_type),
            self.input,
        )
    }
}

/// Create the HTTP router with all endpoints and middleware
pub fn create_router(state: AppState, security: &SecurityConfig) -> Result<Router> {
    let mut app = Router::new()
        .route("/", get(intake_form))
        .route("/sessions", post(submit_form))
        .route("/api/sessions", post(create_session))
        .route("/api/students/:student_id/reports/:session_type", get(get_report))
        .route("/health", get(health_check))
        .with_state(state);

    if security.enable_rate_limiting {
        let rate_limiter = create_rate_limiter(security)?;
        app = app.layer(middleware::from_fn_with_state(rate_limiter, rate_limit_middleware));
    }
    if security.enable_security_headers {
        app = app.layer(middleware::from_fn(security_headers_middleware));
    }

    Ok(app
        .layer(create_body_limit_layer(security.max_request_size_kb))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http()))
}

async fn intake_form() -> Html<String> {
    let years = ["Freshman", "Sophomore", "Junior", "Senior", "Graduate"]
        .iter()
        .map(|y| format!("<option value=\"{y}\">{y}</option>"))
        .collect::<String>();
    let session_types = SessionType::ALL
        .iter()
        .map(|t| format!("<option value=\"{}\">{}</option>", t.as_str(), t.label()))
        .collect::<String>();

    let body = format!(
        r#"<h1>Student Mentoring</h1>
<form method="post" action="/sessions">
  <label>Student ID <input name="student_id" value="S12345" required></label>
  <label>Year <select name="year">{years}</select></label>
  <label>Major <input name="major" value="Computer Science"></label>
  <label>GPA <input name="gpa" value="3.5"></label>
  <label>Session type <select name="session_type">{session_types}</select></label>
  <label>What would you like to discuss?
    <textarea name="input" rows="6">{input}</textarea></label>
  <button type="submit">Start session</button>
</form>"#,
        input = html_escape::encode_text(DEFAULT_INPUT),
    );
    Html(page("Student Mentoring", &body))
}

#[instrument(skip(state, form))]
async fn submit_form(State(state): State<AppState>, Form(form): Form<SessionForm>) -> Response {
    let request = form.into_request();
    if let Err(e) = request.validate() {
        let body = format!(
            "<h1>Invalid request</h1><p>{}</p><p><a href=\"/\">Back</a></p>",
            html_escape::encode_text(&e.to_string())
        );
        return (StatusCode::BAD_REQUEST, Html(page("Invalid request", &body))).into_response();
    }

    let title = format!("{} for {}", request.session_type.label(), request.intake.student_id);
    let response = state.sessions.run(request).await;
    let status = status_code(&response);

    let content = match (&response.report, &response.message) {
        (Some(report), _) => format!("<pre class=\"report\">{}</pre>", html_escape::encode_text(report)),
        (None, Some(message)) => format!("<p>{}</p>", html_escape::encode_text(message)),
        (None, None) => String::new(),
    };
    let body = format!(
        "<h1>{}</h1>{}<p><a href=\"/\">New session</a></p>",
        html_escape::encode_text(&title),
        content
    );
    (status, Html(page(&title, &body))).into_response()
}

#[instrument(skip(state, request))]
async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        warn!("Rejected session request: {}", e);
        return (StatusCode::BAD_REQUEST, Json(ErrorBody { error: e.to_string() })).into_response();
    }

    let response = state.sessions.run(request).await;
    (status_code(&response), Json(response)).into_response()
}

#[instrument(skip(state))]
async fn get_report(
    State(state): State<AppState>,
    Path((student_id, session_type)): Path<(String, String)>,
) -> Response {
    let session_type = SessionType::from(session_type);
    let store = state.sessions.orchestrator().store();

    match store.read_report(&student_id, session_type.report_file()) {
        Ok(Some(markdown)) => (
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            markdown,
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: format!("No {} report for student '{}'", session_type, student_id),
            }),
        )
            .into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ErrorBody { error: e.to_string() })).into_response(),
    }
}

#[instrument(skip(state))]
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let agents = state
        .sessions
        .orchestrator()
        .agent_health()
        .await
        .into_iter()
        .map(|(name, health)| AgentStatus {
            name,
            status: health.status,
            total_requests: health.total_requests,
            error_count: health.error_count,
        })
        .collect();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        agents,
    })
}

fn status_code(response: &SessionResponse) -> StatusCode {
    match response.status {
        SessionStatus::Completed => StatusCode::OK,
        SessionStatus::Running => StatusCode::ACCEPTED,
        SessionStatus::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{}</title>
<style>
  body {{ font-family: sans-serif; max-width: 52rem; margin: 2rem auto; }}
  label {{ display: block; margin: 0.6rem 0; }}
  textarea {{ width: 100%; }}
  pre.report {{ white-space: pre-wrap; background: #f6f6f6; padding: 1rem; }}
</style>
</head>
<body>
{}
</body>
</html>"#,
        html_escape::encode_text(title),
        body
    )
}

/// Start the HTTP server and wait for a shutdown signal
pub async fn serve(settings: &Settings, addr: Option<SocketAddr>) -> Result<()> {
    let orchestrator = Arc::new(Orchestrator::from_settings(settings).await?);
    let sessions = SessionService::new(orchestrator, BoundedWait::from_config(&settings.session));
    let app = create_router(AppState::new(sessions), &settings.security)?;

    let bind = match addr {
        Some(addr) => addr.to_string(),
        None => settings.server.bind_address(),
    };
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    info!("HTTP server listening on {}", bind);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await
    {
        error!("HTTP server error: {}", e);
    }

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C), shutting down gracefully"),
        _ = terminate => info!("Received SIGTERM, shutting down gracefully"),
    }
}
