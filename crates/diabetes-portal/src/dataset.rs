//! Reference dataset: download, parse, and keep for the life of the process.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use tracing::{info, warn};

use crate::metrics;
use crate::patient::FEATURE_COUNT;

/// Row count of the published Pima Indians Diabetes file.
pub const EXPECTED_ROWS: usize = 768;

/// Column names assigned by position; the source file has no header row.
pub const COLUMN_NAMES: [&str; FEATURE_COUNT + 1] = [
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "Insulin",
    "BMI",
    "DiabetesPedigreeFunction",
    "Age",
    "Outcome",
];

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LabeledRecord {
    pub pregnancies: f64,
    pub glucose: f64,
    pub blood_pressure: f64,
    pub skin_thickness: f64,
    pub insulin: f64,
    pub bmi: f64,
    pub diabetes_pedigree: f64,
    pub age: f64,
    pub outcome: u8,
}

impl LabeledRecord {
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.pregnancies,
            self.glucose,
            self.blood_pressure,
            self.skin_thickness,
            self.insulin,
            self.bmi,
            self.diabetes_pedigree,
            self.age,
        ]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to download dataset: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("dataset server answered {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed dataset row: {0}")]
    Parse(#[from] csv::Error),

    #[error("dataset row {row} has outcome {outcome}, expected 0 or 1")]
    InvalidLabel { row: usize, outcome: u8 },

    #[error("dataset is empty")]
    Empty,
}

/// Labeled patient records in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<LabeledRecord>,
}

impl Dataset {
    /// Parse a headerless nine-column CSV body.
    pub fn from_csv(body: &[u8]) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(body);

        let mut records = Vec::new();
        for (row, result) in reader.deserialize::<LabeledRecord>().enumerate() {
            let record = result?;
            if record.outcome > 1 {
                return Err(DatasetError::InvalidLabel {
                    row: row + 1,
                    outcome: record.outcome,
                });
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[LabeledRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn positive_count(&self) -> usize {
        self.records.iter().filter(|r| r.outcome == 1).count()
    }
}

/// Fetches the dataset once and serves the cached copy afterwards.
/// Failed fetches are not cached, so the next login tries again.
pub struct DatasetLoader {
    url: String,
    http_client: reqwest::Client,
    cache: Cache<String, Arc<Dataset>>,
}

impl DatasetLoader {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            cache: Cache::builder().max_capacity(1).build(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn load(&self) -> Result<Arc<Dataset>, Arc<DatasetError>> {
        self.cache
            .try_get_with(self.url.clone(), self.fetch())
            .await
    }

    async fn download(&self) -> Result<Dataset, DatasetError> {
        let response = self.http_client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(DatasetError::Status(response.status()));
        }
        let body = response.bytes().await?;
        Dataset::from_csv(&body)
    }

    async fn fetch(&self) -> Result<Arc<Dataset>, DatasetError> {
        info!("Downloading reference dataset from {}", self.url);

        match self.download().await {
            Ok(dataset) => {
                if dataset.len() != EXPECTED_ROWS {
                    warn!(
                        "Dataset has {} rows, expected {}",
                        dataset.len(),
                        EXPECTED_ROWS
                    );
                }
                info!(
                    "Loaded {} records ({} positive) with columns [{}]",
                    dataset.len(),
                    dataset.positive_count(),
                    COLUMN_NAMES.join(", ")
                );
                metrics::inc_dataset_fetch("ok");
                Ok(Arc::new(dataset))
            }
            Err(e) => {
                warn!("Dataset download failed: {}", e);
                metrics::inc_dataset_fetch("error");
                Err(e)
            }
        }
    }
}
