// Guest pages: login and signup.
use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Response,
};
use tower_sessions::Session;
use tracing::{info, warn};

use super::{commit, load_state, notices_with, PageError};
use crate::auth::{AuthError, ValidationError};
use crate::controller::{GuestPage, NoticeLevel};
use crate::ml::TrainedModel;
use crate::shared_state::AppState;
use crate::views::login::{self, LoginForm, INVALID_CREDENTIALS, LOGIN_SUCCESS};
use crate::views::signup::{self, SignupForm, SIGNUP_SUCCESS};

pub const STORAGE_FAILURE: &str =
    "Could not reach the user database. Please try again later.";
pub const DATASET_UNAVAILABLE: &str =
    "The prediction model could not be prepared right now. Please try again later.";

pub async fn show_login(session: Session) -> Result<Response, PageError> {
    select(session, GuestPage::Login).await
}

pub async fn show_signup(session: Session) -> Result<Response, PageError> {
    select(session, GuestPage::Signup).await
}

async fn select(session: Session, page: GuestPage) -> Result<Response, PageError> {
    let state = load_state(&session).await?.select_guest_page(page)?;
    commit(&session, &state).await
}

fn login_error(status: StatusCode, level: NoticeLevel, text: &str, username: &str) -> PageError {
    PageError::rerender(status, login::page(&notices_with(level, text), username))
}

/// Check credentials, then load the dataset and train this session's model.
/// The session is only promoted once all three succeed.
pub async fn login(
    State(app): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let state = load_state(&session).await?.select_guest_page(GuestPage::Login)?;

    let (username, password) = match form.review() {
        Ok((username, password)) => (username.to_string(), password.to_string()),
        Err(msg) => {
            return Err(login_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                NoticeLevel::Warning,
                msg,
                &form.username,
            ))
        }
    };

    let auth = app.auth.clone();
    let check_name = username.clone();
    let verdict = tokio::task::spawn_blocking(move || auth.login(&check_name, &password))
        .await
        .unwrap_or_else(|e| Err(AuthError::Storage(e.to_string())));

    match verdict {
        Ok(true) => {}
        Ok(false) => {
            return Err(login_error(
                StatusCode::UNAUTHORIZED,
                NoticeLevel::Error,
                INVALID_CREDENTIALS,
                &username,
            ))
        }
        Err(e) => {
            warn!("Login for '{}' failed: {}", username, e);
            return Err(login_error(
                StatusCode::SERVICE_UNAVAILABLE,
                NoticeLevel::Error,
                STORAGE_FAILURE,
                &username,
            ));
        }
    }

    let dataset = match app.datasets.load().await {
        Ok(dataset) => dataset,
        Err(e) => {
            warn!("Dataset unavailable for '{}': {}", username, e);
            return Err(login_error(
                StatusCode::SERVICE_UNAVAILABLE,
                NoticeLevel::Error,
                DATASET_UNAVAILABLE,
                &username,
            ));
        }
    };

    let settings = app.training;
    let trained = tokio::task::spawn_blocking(move || TrainedModel::train(&dataset, &settings))
        .await;
    let model = match trained {
        Ok(Ok(model)) => model,
        Ok(Err(e)) => {
            warn!("Training failed for '{}': {}", username, e);
            return Err(login_error(
                StatusCode::SERVICE_UNAVAILABLE,
                NoticeLevel::Error,
                DATASET_UNAVAILABLE,
                &username,
            ));
        }
        Err(e) => {
            warn!("Training task for '{}' aborted: {}", username, e);
            return Err(login_error(
                StatusCode::SERVICE_UNAVAILABLE,
                NoticeLevel::Error,
                DATASET_UNAVAILABLE,
                &username,
            ));
        }
    };

    session.cycle_id().await?;
    let mut state = state.logged_in(username.as_str(), model)?;
    state.notify(NoticeLevel::Success, LOGIN_SUCCESS);
    info!("Session promoted for '{}'", username);
    commit(&session, &state).await
}

/// Form checks, then the auth service. A rejected form is shown again.
pub async fn signup(
    State(app): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response, PageError> {
    let state = load_state(&session).await?.select_guest_page(GuestPage::Signup)?;

    let rejected = |status: StatusCode, level: NoticeLevel, text: &str| {
        PageError::rerender(status, signup::page(&notices_with(level, text), Some(&form)))
    };

    let user = match form.review() {
        Ok(user) => user,
        Err(e @ ValidationError::MissingFields) => {
            return Err(rejected(
                StatusCode::UNPROCESSABLE_ENTITY,
                NoticeLevel::Warning,
                &e.to_string(),
            ))
        }
        Err(e) => {
            return Err(rejected(
                StatusCode::UNPROCESSABLE_ENTITY,
                NoticeLevel::Error,
                &e.to_string(),
            ))
        }
    };

    let auth = app.auth.clone();
    let outcome = tokio::task::spawn_blocking(move || auth.signup(&user))
        .await
        .unwrap_or_else(|e| Err(AuthError::Storage(e.to_string())));

    match outcome {
        Ok(()) => {
            let mut state = state.signed_up()?;
            state.notify(NoticeLevel::Success, SIGNUP_SUCCESS);
            commit(&session, &state).await
        }
        Err(AuthError::Validation(e)) => Err(rejected(
            StatusCode::UNPROCESSABLE_ENTITY,
            NoticeLevel::Error,
            &e.to_string(),
        )),
        Err(e @ (AuthError::DuplicateUsername | AuthError::DuplicateEmail)) => Err(rejected(
            StatusCode::CONFLICT,
            NoticeLevel::Error,
            &e.to_string(),
        )),
        Err(AuthError::Storage(detail)) => {
            warn!("Signup storage failure: {}", detail);
            Err(rejected(
                StatusCode::SERVICE_UNAVAILABLE,
                NoticeLevel::Error,
                STORAGE_FAILURE,
            ))
        }
    }
}
