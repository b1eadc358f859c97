use minijinja::context;
use serde::{Deserialize, Serialize};

use super::output::format_value;
use super::{frame, render};
use crate::controller::Notice;
use crate::patient::{PatientInput, FEATURE_COUNT, FIELDS};

/// Raw patient form, one string per field in [`FIELDS`] order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientForm {
    #[serde(default)]
    pub pregnancies: String,
    #[serde(default)]
    pub glucose: String,
    #[serde(default)]
    pub blood_pressure: String,
    #[serde(default)]
    pub skin_thickness: String,
    #[serde(default)]
    pub insulin: String,
    #[serde(default)]
    pub bmi: String,
    #[serde(default)]
    pub diabetes_pedigree: String,
    #[serde(default)]
    pub age: String,
}

impl PatientForm {
    pub fn values(&self) -> [&str; FEATURE_COUNT] {
        [
            self.pregnancies.as_str(),
            self.glucose.as_str(),
            self.blood_pressure.as_str(),
            self.skin_thickness.as_str(),
            self.insulin.as_str(),
            self.bmi.as_str(),
            self.diabetes_pedigree.as_str(),
            self.age.as_str(),
        ]
    }

    /// Parse and range-check; on failure, one message per bad field.
    pub fn review(&self) -> Result<PatientInput, Vec<String>> {
        PatientInput::from_form_values(&self.values())
    }

    /// Submitted strings, for re-rendering a rejected form as typed.
    pub fn echo(&self) -> [String; FEATURE_COUNT] {
        self.values().map(str::to_string)
    }
}

/// Form values from the last submission, or the field defaults.
pub fn prefill(last: Option<&PatientInput>) -> [String; FEATURE_COUNT] {
    let features = match last {
        Some(input) => input.to_features(),
        None => PatientInput::default().to_features(),
    };
    features.map(format_value)
}

#[derive(Serialize)]
struct NumberField<'a> {
    label: &'static str,
    name: &'static str,
    min: String,
    max: String,
    step: &'static str,
    value: &'a str,
}

pub fn page(notices: &[Notice], values: &[String; FEATURE_COUNT]) -> Result<String, minijinja::Error> {
    let fields: Vec<NumberField<'_>> = FIELDS
        .iter()
        .zip(values.iter())
        .map(|(spec, value)| NumberField {
            label: spec.label,
            name: spec.name,
            min: spec.min.to_string(),
            max: spec.max.to_string(),
            step: if spec.integral { "1" } else { "0.01" },
            value: value.as_str(),
        })
        .collect();
    let base = frame("Diabetes Prediction App", None, notices);
    render("input.html", context! { fields => fields, ..base })
}
