//! Process-wide state shared by every request handler.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::AuthService;
use crate::config::Config;
use crate::credential_db::CredentialDatabase;
use crate::dataset::DatasetLoader;
use crate::ml::TrainingSettings;

/// Application state handed to the router. Sessions share only the
/// credential store and the cached dataset; everything else is per session.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthService>,
    pub datasets: Arc<DatasetLoader>,
    pub training: TrainingSettings,
}

impl AppState {
    pub fn new(config: Config, database: Arc<CredentialDatabase>) -> Self {
        let auth = Arc::new(AuthService::new(database, config.password_scheme));
        let datasets = Arc::new(DatasetLoader::new(
            config.dataset_url.clone(),
            Duration::from_secs(config.dataset_timeout_seconds),
        ));
        let training = TrainingSettings {
            seed: config.split_seed,
            test_fraction: config.test_fraction,
            ..TrainingSettings::default()
        };

        Self {
            config: Arc::new(config),
            auth,
            datasets,
            training,
        }
    }
}
