// Authenticated pages: patient input and prediction output.
use axum::{
    extract::Form,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::{debug, info};

use super::{commit, load_state, store_state, PageError};
use crate::controller::{ClinicalView, Page, TransitionError};
use crate::metrics;
use crate::views::{self, input::PatientForm};

/// Render the session's current page, consuming queued notices.
pub async fn show_page(session: Session) -> Result<Response, PageError> {
    let mut state = load_state(&session).await?;
    let notices = state.take_notices();
    debug!("Rendering {} page", state.page_name());
    let html = views::render_current(&state, &notices)?;
    store_state(&session, &state).await?;
    Ok(Html(html).into_response())
}

pub async fn predict(
    session: Session,
    Form(form): Form<PatientForm>,
) -> Result<Response, PageError> {
    let state = load_state(&session).await?;
    match state.page() {
        Page::Clinical(clinical) if matches!(clinical.view, ClinicalView::Input { .. }) => {}
        Page::Clinical(_) => return Err(TransitionError::InvalidTransition.into()),
        Page::Guest(_) => return Err(TransitionError::NotAuthenticated.into()),
    }

    match form.review() {
        Ok(input) => {
            let state = state.submit_input(input)?;
            if let Some(prediction) = state.prediction() {
                metrics::inc_prediction(prediction.class.as_str());
                info!(
                    "Prediction for '{}': {} ({:.2}%)",
                    state.username().unwrap_or_default(),
                    prediction.class,
                    prediction.confidence_percent()
                );
            }
            commit(&session, &state).await
        }
        Err(messages) => Err(PageError::rerender(
            StatusCode::UNPROCESSABLE_ENTITY,
            views::input::page(&views::error_notices(&messages), &form.echo()),
        )),
    }
}

pub async fn another(session: Session) -> Result<Response, PageError> {
    let state = load_state(&session).await?.request_another()?;
    commit(&session, &state).await
}
