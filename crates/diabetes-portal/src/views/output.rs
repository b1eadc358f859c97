use minijinja::context;
use serde::Serialize;

use super::{frame, notice_class, render};
use crate::controller::{Notice, NoticeLevel};
use crate::ml::{DiabetesClass, Prediction};
use crate::patient::{PatientInput, FIELDS};

pub const POSITIVE_VERDICT: &str = "The model predicts that the patient is Positive for Diabetes. \
     Please consult a healthcare professional for further evaluation. \
     Remember, early detection and management can lead to better health outcomes!";
pub const NEGATIVE_VERDICT: &str =
    "The model predicts that the patient is Negative for Diabetes. \
     Keep up the healthy lifestyle and regular check-ups!";

/// Whole numbers without a decimal point, everything else to two decimals.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

pub fn verdict(class: DiabetesClass) -> &'static str {
    match class {
        DiabetesClass::Positive => POSITIVE_VERDICT,
        DiabetesClass::Negative => NEGATIVE_VERDICT,
    }
}

/// Everything the Output page shows, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputReport {
    pub rows: Vec<(&'static str, String)>,
    pub class: DiabetesClass,
    pub confidence: String,
    pub accuracy: String,
}

impl OutputReport {
    pub fn new(input: &PatientInput, prediction: &Prediction) -> Self {
        let rows = FIELDS
            .iter()
            .zip(input.to_features())
            .map(|(spec, value)| (spec.title, format_value(value)))
            .collect();

        Self {
            rows,
            class: prediction.class,
            confidence: format!("Prediction Confidence: {:.2}%", prediction.confidence_percent()),
            accuracy: format!(
                "Model Accuracy on Test Data: {:.2}%",
                prediction.accuracy_percent()
            ),
        }
    }

    pub fn verdict(&self) -> &'static str {
        verdict(self.class)
    }
}

#[derive(Serialize)]
struct Row<'a> {
    title: &'static str,
    value: &'a str,
}

pub fn page(notices: &[Notice], report: &OutputReport) -> Result<String, minijinja::Error> {
    let rows: Vec<Row<'_>> = report
        .rows
        .iter()
        .map(|(title, value)| Row {
            title: *title,
            value: value.as_str(),
        })
        .collect();
    let level = match report.class {
        DiabetesClass::Positive => NoticeLevel::Error,
        DiabetesClass::Negative => NoticeLevel::Success,
    };
    let base = frame("Prediction Result", None, notices);
    render(
        "output.html",
        context! {
            rows => rows,
            verdict_class => notice_class(level),
            verdict => report.verdict(),
            confidence => &report.confidence,
            accuracy => &report.accuracy,
            ..base
        },
    )
}
