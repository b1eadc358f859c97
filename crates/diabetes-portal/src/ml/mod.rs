//! Per-session diabetes classifier: seeded split, standard scaling and an
//! L2-regularized logistic regression.

pub mod split;

use std::fmt;
use std::time::Instant;

use linfa::traits::{Fit, Transformer};
use linfa::DatasetBase;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use linfa_preprocessing::linear_scaling::LinearScaler;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::Dataset;
use crate::patient::{PatientInput, FEATURE_COUNT};

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("cannot split dataset: {0}")]
    Split(String),

    #[error("feature scaling failed: {0}")]
    Scale(String),

    #[error("logistic regression failed: {0}")]
    Fit(String),
}

/// Split and solver parameters. The solver defaults mirror scikit-learn's
/// `LogisticRegression()`: L2 penalty with C = 1, L-BFGS, 100 iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSettings {
    pub seed: u64,
    pub test_fraction: f64,
    /// Inverse regularization strength.
    pub c: f64,
    pub max_iterations: u64,
    pub gradient_tolerance: f64,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            test_fraction: 0.2,
            c: 1.0,
            max_iterations: 100,
            gradient_tolerance: 1e-4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiabetesClass {
    Positive,
    Negative,
}

impl DiabetesClass {
    /// Positive only strictly above one half, as `decision_function > 0`.
    pub fn from_probability(p_positive: f64) -> Self {
        if p_positive > 0.5 {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    pub fn label(&self) -> usize {
        match self {
            Self::Positive => 1,
            Self::Negative => 0,
        }
    }

    /// Lowercase name used as a metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for DiabetesClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "Positive"),
            Self::Negative => write!(f, "Negative"),
        }
    }
}

/// Outcome of scoring one patient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub class: DiabetesClass,
    /// Probability of `class`, in [0.5, 1].
    pub probability: f64,
    /// Held-out accuracy of the model that produced this, in [0, 1].
    pub accuracy: f64,
}

impl Prediction {
    pub fn confidence_percent(&self) -> f64 {
        self.probability * 100.0
    }

    pub fn accuracy_percent(&self) -> f64 {
        self.accuracy * 100.0
    }
}

/// Everything needed to score a patient, kept in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    scaler: LinearScaler<f64>,
    classifier: FittedLogisticRegression<f64, usize>,
    accuracy: f64,
}

impl PartialEq for TrainedModel {
    fn eq(&self, other: &Self) -> bool {
        self.accuracy == other.accuracy
            && self.classifier.intercept() == other.classifier.intercept()
            && self.classifier.params() == other.classifier.params()
    }
}

fn feature_matrix(dataset: &Dataset) -> Result<Array2<f64>, TrainingError> {
    let flat: Vec<f64> = dataset
        .records()
        .iter()
        .flat_map(|r| r.features())
        .collect();
    Array2::from_shape_vec((dataset.len(), FEATURE_COUNT), flat)
        .map_err(|e| TrainingError::Split(e.to_string()))
}

/// Fraction of rows whose thresholded probability matches the label.
fn accuracy(probabilities: &Array1<f64>, labels: &Array1<usize>) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = probabilities
        .iter()
        .zip(labels.iter())
        .filter(|(p, label)| DiabetesClass::from_probability(**p).label() == **label)
        .count();
    correct as f64 / labels.len() as f64
}

impl TrainedModel {
    /// Split, scale and fit. Deterministic for a given dataset and settings.
    pub fn train(dataset: &Dataset, settings: &TrainingSettings) -> Result<Self, TrainingError> {
        let started = Instant::now();

        let x = feature_matrix(dataset)?;
        let y: Array1<usize> = dataset
            .records()
            .iter()
            .map(|r| usize::from(r.outcome))
            .collect();

        let parts = split::train_test_split(&x, &y, settings.test_fraction, settings.seed)
            .map_err(TrainingError::Split)?;
        let n_train = parts.y_train.len();
        let n_test = parts.y_test.len();

        let train = DatasetBase::new(parts.x_train, parts.y_train);
        let scaler = LinearScaler::standard()
            .fit(&train)
            .map_err(|e| TrainingError::Scale(e.to_string()))?;
        let train = scaler.transform(train);
        let x_test = scaler.transform(parts.x_test);

        let classifier = LogisticRegression::default()
            .alpha(1.0 / settings.c)
            .max_iterations(settings.max_iterations)
            .gradient_tolerance(settings.gradient_tolerance)
            .fit(&train)
            .map_err(|e| TrainingError::Fit(e.to_string()))?;
        let accuracy = accuracy(&classifier.predict_probabilities(&x_test), &parts.y_test);

        let elapsed = started.elapsed().as_secs_f64();
        crate::metrics::observe_training(elapsed);
        info!(
            "Trained model on {} rows ({} held out): accuracy {:.4} in {:.3}s",
            n_train, n_test, accuracy, elapsed
        );

        Ok(Self {
            scaler,
            classifier,
            accuracy,
        })
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Rescale the vitals with the fitted scaler and classify them.
    pub fn predict(&self, input: &PatientInput) -> Prediction {
        let row = Array1::from(input.to_features().to_vec()).insert_axis(Axis(0));
        let scaled = self.scaler.transform(row);
        let p_positive = self.classifier.predict_probabilities(&scaled)[0];

        let class = DiabetesClass::from_probability(p_positive);
        let probability = match class {
            DiabetesClass::Positive => p_positive,
            DiabetesClass::Negative => 1.0 - p_positive,
        };

        Prediction {
            class,
            probability,
            accuracy: self.accuracy,
        }
    }
}
