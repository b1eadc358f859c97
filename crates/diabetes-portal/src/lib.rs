// diabetes-portal/crates/diabetes-portal/src/lib.rs

pub mod auth;
pub mod config;
pub mod controller;
pub mod credential_db;
pub mod dataset;
pub mod metrics;
pub mod ml;
pub mod patient;
pub mod shared_state;
pub mod telemetry;
pub mod views;

#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "server")]
pub mod server;

// Public API exports
pub use auth::{AuthError, AuthService, NewUser, PasswordScheme};
pub use config::Config;
pub use controller::{ClinicalView, GuestPage, Page, SessionState, TransitionError};
pub use credential_db::CredentialDatabase;
pub use dataset::{Dataset, DatasetError, DatasetLoader};
pub use ml::{DiabetesClass, Prediction, TrainedModel, TrainingSettings};
pub use patient::PatientInput;
pub use shared_state::AppState;

#[cfg(feature = "server")]
pub use server::{build_router, run_server};
