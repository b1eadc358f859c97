//! Page controller: the per-session state machine.
//!
//! Being logged in is the `Clinical` variant itself, so an Input or Output
//! page without a user and a trained model cannot be constructed.

use serde::{Deserialize, Serialize};

use crate::ml::{Prediction, TrainedModel};
use crate::patient::PatientInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuestPage {
    Login,
    Signup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClinicalView {
    /// Patient form, pre-filled from the previous submission if any.
    Input { last: Option<PatientInput> },
    /// Submitted vitals and the prediction made for them at submission.
    Output {
        input: PatientInput,
        prediction: Prediction,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalSession {
    pub username: String,
    pub model: TrainedModel,
    pub view: ClinicalView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Page {
    Guest(GuestPage),
    Clinical(ClinicalSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// One-shot status message shown on the next render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("please log in first")]
    NotAuthenticated,

    #[error("already logged in")]
    AlreadyAuthenticated,

    #[error("action not available on this page")]
    InvalidTransition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    page: Page,
    notices: Vec<Notice>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            page: Page::Guest(GuestPage::Login),
            notices: Vec::new(),
        }
    }
}

impl SessionState {
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Short page name for logs: login, signup, input or output.
    pub fn page_name(&self) -> &'static str {
        match &self.page {
            Page::Guest(GuestPage::Login) => "login",
            Page::Guest(GuestPage::Signup) => "signup",
            Page::Clinical(session) => match session.view {
                ClinicalView::Input { .. } => "input",
                ClinicalView::Output { .. } => "output",
            },
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.page, Page::Clinical(_))
    }

    pub fn username(&self) -> Option<&str> {
        match &self.page {
            Page::Clinical(session) => Some(&session.username),
            Page::Guest(_) => None,
        }
    }

    /// The prediction shown on the Output page.
    pub fn prediction(&self) -> Option<&Prediction> {
        match &self.page {
            Page::Clinical(ClinicalSession {
                view: ClinicalView::Output { prediction, .. },
                ..
            }) => Some(prediction),
            _ => None,
        }
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notices.push(Notice {
            level,
            text: text.into(),
        });
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn with_page(self, page: Page) -> Self {
        Self {
            page,
            notices: self.notices,
        }
    }

    /// Guest menu choice.
    pub fn select_guest_page(self, choice: GuestPage) -> Result<Self, TransitionError> {
        match self.page {
            Page::Guest(_) => Ok(self.with_page(Page::Guest(choice))),
            Page::Clinical(_) => Err(TransitionError::AlreadyAuthenticated),
        }
    }

    /// Successful credential check: promote to the authenticated Input page.
    pub fn logged_in(
        self,
        username: impl Into<String>,
        model: TrainedModel,
    ) -> Result<Self, TransitionError> {
        match self.page {
            Page::Guest(GuestPage::Login) => {
                let session = ClinicalSession {
                    username: username.into(),
                    model,
                    view: ClinicalView::Input { last: None },
                };
                Ok(self.with_page(Page::Clinical(session)))
            }
            Page::Guest(GuestPage::Signup) => Err(TransitionError::InvalidTransition),
            Page::Clinical(_) => Err(TransitionError::AlreadyAuthenticated),
        }
    }

    /// Successful signup returns to Login; there is no auto-login.
    pub fn signed_up(self) -> Result<Self, TransitionError> {
        match self.page {
            Page::Guest(GuestPage::Signup) => Ok(self.with_page(Page::Guest(GuestPage::Login))),
            Page::Guest(GuestPage::Login) => Err(TransitionError::InvalidTransition),
            Page::Clinical(_) => Err(TransitionError::AlreadyAuthenticated),
        }
    }

    /// Score the submitted vitals once and move to the Output page.
    pub fn submit_input(self, input: PatientInput) -> Result<Self, TransitionError> {
        match self.page {
            Page::Clinical(ClinicalSession {
                username,
                model,
                view: ClinicalView::Input { .. },
            }) => {
                let prediction = model.predict(&input);
                let session = ClinicalSession {
                    username,
                    model,
                    view: ClinicalView::Output { input, prediction },
                };
                Ok(Self {
                    page: Page::Clinical(session),
                    notices: self.notices,
                })
            }
            Page::Clinical(_) => Err(TransitionError::InvalidTransition),
            Page::Guest(_) => Err(TransitionError::NotAuthenticated),
        }
    }

    /// Back to the form, keeping the last record as its pre-fill.
    pub fn request_another(self) -> Result<Self, TransitionError> {
        match self.page {
            Page::Clinical(ClinicalSession {
                username,
                model,
                view: ClinicalView::Output { input, .. },
            }) => {
                let session = ClinicalSession {
                    username,
                    model,
                    view: ClinicalView::Input { last: Some(input) },
                };
                Ok(Self {
                    page: Page::Clinical(session),
                    notices: self.notices,
                })
            }
            Page::Clinical(_) => Err(TransitionError::InvalidTransition),
            Page::Guest(_) => Err(TransitionError::NotAuthenticated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::tests::synthetic_dataset;
    use crate::ml::TrainingSettings;

    fn model() -> TrainedModel {
        TrainedModel::train(&synthetic_dataset(), &TrainingSettings::default()).unwrap()
    }

    fn input_page() -> SessionState {
        SessionState::default().logged_in("alice", model()).unwrap()
    }

    #[test]
    fn test_starts_on_login() {
        let state = SessionState::default();
        assert_eq!(state.page(), &Page::Guest(GuestPage::Login));
        assert_eq!(state.page_name(), "login");
        assert!(!state.is_authenticated());
    }

    #[test]
    fn test_guest_menu_switches_pages() {
        let state = SessionState::default()
            .select_guest_page(GuestPage::Signup)
            .unwrap();
        assert_eq!(state.page_name(), "signup");

        let state = state.select_guest_page(GuestPage::Login).unwrap();
        assert_eq!(state.page_name(), "login");
    }

    #[test]
    fn test_signup_returns_to_login_without_logging_in() {
        let state = SessionState::default()
            .select_guest_page(GuestPage::Signup)
            .unwrap()
            .signed_up()
            .unwrap();

        assert_eq!(state.page(), &Page::Guest(GuestPage::Login));
        assert!(!state.is_authenticated());
    }

    #[test]
    fn test_login_promotes_to_input() {
        let state = input_page();

        assert!(state.is_authenticated());
        assert_eq!(state.username(), Some("alice"));
        match state.page() {
            Page::Clinical(session) => {
                assert_eq!(session.view, ClinicalView::Input { last: None })
            }
            other => panic!("unexpected page {:?}", other),
        }
    }

    #[test]
    fn test_input_output_cycle_keeps_last_record() {
        let input = PatientInput {
            glucose: 150,
            ..PatientInput::default()
        };
        let state = input_page().submit_input(input).unwrap();
        assert_eq!(state.page_name(), "output");
        assert!(state.prediction().is_some());

        let state = state.request_another().unwrap();
        match state.page() {
            Page::Clinical(session) => {
                assert_eq!(session.view, ClinicalView::Input { last: Some(input) })
            }
            other => panic!("unexpected page {:?}", other),
        }
    }

    #[test]
    fn test_guests_cannot_reach_clinical_pages() {
        let guest = SessionState::default();
        assert_eq!(
            guest.clone().submit_input(PatientInput::default()),
            Err(TransitionError::NotAuthenticated)
        );
        assert_eq!(guest.request_another(), Err(TransitionError::NotAuthenticated));
    }

    #[test]
    fn test_authenticated_sessions_stay_authenticated() {
        let state = input_page();
        assert_eq!(
            state.clone().select_guest_page(GuestPage::Login),
            Err(TransitionError::AlreadyAuthenticated)
        );
        assert_eq!(state.clone().signed_up(), Err(TransitionError::AlreadyAuthenticated));
        assert_eq!(
            state.logged_in("bob", model()),
            Err(TransitionError::AlreadyAuthenticated)
        );
    }

    #[test]
    fn test_out_of_order_actions_are_invalid() {
        assert_eq!(input_page().request_another(), Err(TransitionError::InvalidTransition));

        let output = input_page().submit_input(PatientInput::default()).unwrap();
        assert_eq!(
            output.submit_input(PatientInput::default()),
            Err(TransitionError::InvalidTransition)
        );

        assert_eq!(SessionState::default().signed_up(), Err(TransitionError::InvalidTransition));
        let signup = SessionState::default()
            .select_guest_page(GuestPage::Signup)
            .unwrap();
        assert_eq!(signup.logged_in("alice", model()), Err(TransitionError::InvalidTransition));
    }

    #[test]
    fn test_notices_survive_transitions_and_are_taken_once() {
        let mut state = SessionState::default()
            .select_guest_page(GuestPage::Signup)
            .unwrap();
        state.notify(NoticeLevel::Success, "Signup successful! You can now log in.");
        let mut state = state.signed_up().unwrap();

        let notices = state.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert!(state.take_notices().is_empty());
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let state = input_page().submit_input(PatientInput::default()).unwrap();
        let json = serde_json::to_value(&state).unwrap();
        let restored: SessionState = serde_json::from_value(json).unwrap();
        assert_eq!(restored.page_name(), "output");
        assert_eq!(restored.username(), Some("alice"));
        assert_eq!(restored.prediction(), state.prediction());
    }

    #[test]
    fn test_prediction_is_fixed_at_submission() {
        let trained = model();
        let input = PatientInput {
            glucose: 190,
            bmi: 44.0,
            ..PatientInput::default()
        };
        let state = SessionState::default()
            .logged_in("alice", trained.clone())
            .unwrap()
            .submit_input(input)
            .unwrap();

        assert_eq!(state.prediction(), Some(&trained.predict(&input)));
        assert_eq!(input_page().prediction(), None);
        assert_eq!(state.request_another().unwrap().prediction(), None);
    }
}
