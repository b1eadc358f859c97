//! HTTP handlers. Each one loads the session state, applies one action and
//! either stores the new state and redirects, or re-renders with messages.

pub mod auth_api;
pub mod health_api;
pub mod prediction_api;

pub use auth_api::{login, show_login, show_signup, signup};
pub use health_api::healthz;
pub use prediction_api::{another, predict, show_page};

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::warn;

use crate::controller::{Notice, SessionState, TransitionError};
use crate::views;

const STATE_KEY: &str = "portal.state";

/// Failure side of every page handler.
#[derive(Debug)]
pub enum PageError {
    /// Show a page again with a non-2xx status.
    Rerender { status: StatusCode, html: String },
    /// The requested action does not apply to the session's page.
    Transition(TransitionError),
    Session(tower_sessions::session::Error),
    Render(minijinja::Error),
}

impl PageError {
    /// Show `html` with `status`, or fail with the template error.
    pub fn rerender(status: StatusCode, html: Result<String, minijinja::Error>) -> Self {
        match html {
            Ok(html) => Self::Rerender { status, html },
            Err(e) => Self::Render(e),
        }
    }
}

impl From<minijinja::Error> for PageError {
    fn from(e: minijinja::Error) -> Self {
        Self::Render(e)
    }
}

impl From<TransitionError> for PageError {
    fn from(e: TransitionError) -> Self {
        Self::Transition(e)
    }
}

impl From<tower_sessions::session::Error> for PageError {
    fn from(e: tower_sessions::session::Error) -> Self {
        Self::Session(e)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::Rerender { status, html } => (status, Html(html)).into_response(),
            PageError::Transition(e) => {
                let status = match e {
                    TransitionError::NotAuthenticated => StatusCode::UNAUTHORIZED,
                    TransitionError::AlreadyAuthenticated
                    | TransitionError::InvalidTransition => StatusCode::CONFLICT,
                };
                match views::error_page(&capitalize(&e.to_string())) {
                    Ok(html) => (status, Html(html)).into_response(),
                    Err(render) => PageError::Render(render).into_response(),
                }
            }
            PageError::Session(e) => {
                warn!("Session store failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable").into_response()
            }
            PageError::Render(e) => {
                warn!("Page render failure: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Page unavailable").into_response()
            }
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Current state of this session; new sessions start on Login.
pub async fn load_state(session: &Session) -> Result<SessionState, PageError> {
    Ok(session
        .get::<SessionState>(STATE_KEY)
        .await?
        .unwrap_or_default())
}

pub async fn store_state(session: &Session, state: &SessionState) -> Result<(), PageError> {
    session.insert(STATE_KEY, state).await?;
    Ok(())
}

/// Persist and send the browser back to `/`.
pub async fn commit(session: &Session, state: &SessionState) -> Result<Response, PageError> {
    store_state(session, state).await?;
    Ok(Redirect::to("/").into_response())
}

pub fn notices_with(level: crate::controller::NoticeLevel, text: &str) -> Vec<Notice> {
    vec![Notice {
        level,
        text: text.to_string(),
    }]
}
