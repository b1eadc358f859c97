//! Patient vitals captured by the input form.
//!
//! Field order matches the columns of the Pima Indians Diabetes dataset, which
//! is also the feature order the model is trained on.

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const FEATURE_COUNT: usize = 8;

/// Descriptor of one input field: form name, display title and bounds.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub title: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub integral: bool,
}

/// The eight inputs in dataset order.
pub const FIELDS: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec { name: "pregnancies", title: "Pregnancies", label: "Number of Pregnancies", min: 0.0, max: 20.0, default: 1.0, integral: true },
    FieldSpec { name: "glucose", title: "Glucose", label: "Glucose Level", min: 0.0, max: 200.0, default: 100.0, integral: true },
    FieldSpec { name: "blood_pressure", title: "Blood Pressure", label: "Blood Pressure", min: 0.0, max: 200.0, default: 70.0, integral: true },
    FieldSpec { name: "skin_thickness", title: "Skin Thickness", label: "Skin Thickness", min: 0.0, max: 100.0, default: 20.0, integral: true },
    FieldSpec { name: "insulin", title: "Insulin", label: "Insulin Level", min: 0.0, max: 800.0, default: 100.0, integral: true },
    FieldSpec { name: "bmi", title: "BMI", label: "Body Mass Index (BMI)", min: 10.0, max: 70.0, default: 25.0, integral: false },
    FieldSpec { name: "diabetes_pedigree", title: "Diabetes Pedigree Function", label: "Diabetes Pedigree Function", min: 0.0, max: 2.5, default: 0.5, integral: false },
    FieldSpec { name: "age", title: "Age", label: "Age", min: 1.0, max: 120.0, default: 30.0, integral: true },
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct PatientInput {
    #[validate(range(min = 0, max = 20))]
    pub pregnancies: u32,
    #[validate(range(min = 0, max = 200))]
    pub glucose: u32,
    #[validate(range(min = 0, max = 200))]
    pub blood_pressure: u32,
    #[validate(range(min = 0, max = 100))]
    pub skin_thickness: u32,
    #[validate(range(min = 0, max = 800))]
    pub insulin: u32,
    #[validate(range(min = 10.0, max = 70.0))]
    pub bmi: f64,
    #[validate(range(min = 0.0, max = 2.5))]
    pub diabetes_pedigree: f64,
    #[validate(range(min = 1, max = 120))]
    pub age: u32,
}

impl Default for PatientInput {
    fn default() -> Self {
        Self {
            pregnancies: 1,
            glucose: 100,
            blood_pressure: 70,
            skin_thickness: 20,
            insulin: 100,
            bmi: 25.0,
            diabetes_pedigree: 0.5,
            age: 30,
        }
    }
}

impl PatientInput {
    /// Feature vector in dataset column order.
    #[must_use]
    pub fn to_features(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.pregnancies),
            f64::from(self.glucose),
            f64::from(self.blood_pressure),
            f64::from(self.skin_thickness),
            f64::from(self.insulin),
            self.bmi,
            self.diabetes_pedigree,
            f64::from(self.age),
        ]
    }

    /// Parse raw form strings (in [`FIELDS`] order) and range-check them.
    ///
    /// # Errors
    /// One message per offending field, in form order.
    pub fn from_form_values(values: &[&str; FEATURE_COUNT]) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();
        let mut parsed = [0.0f64; FEATURE_COUNT];

        for (i, (spec, raw)) in FIELDS.iter().zip(values.iter()).enumerate() {
            match raw.trim().parse::<f64>() {
                // Negative counts have no unsigned representation; report them as out of range.
                Ok(v) if spec.integral && v < 0.0 && v.fract() == 0.0 => {
                    errors.push(range_message(spec))
                }
                Ok(v) if v.is_finite() && (!spec.integral || v.fract() == 0.0) => parsed[i] = v,
                Ok(_) if spec.integral => {
                    errors.push(format!("{} must be a whole number.", spec.label))
                }
                _ => errors.push(format!("{} must be a number.", spec.label)),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let input = Self {
            pregnancies: parsed[0] as u32,
            glucose: parsed[1] as u32,
            blood_pressure: parsed[2] as u32,
            skin_thickness: parsed[3] as u32,
            insulin: parsed[4] as u32,
            bmi: parsed[5],
            diabetes_pedigree: parsed[6],
            age: parsed[7] as u32,
        };
        input.check_ranges()?;
        Ok(input)
    }

    /// Range validation with messages in form order.
    ///
    /// # Errors
    /// One message per field outside its bounds.
    pub fn check_ranges(&self) -> Result<(), Vec<String>> {
        match self.validate() {
            Ok(()) => Ok(()),
            Err(errors) => {
                let failed = errors.field_errors();
                Err(FIELDS
                    .iter()
                    .filter(|spec| failed.contains_key(spec.name))
                    .map(range_message)
                    .collect())
            }
        }
    }
}

fn range_message(spec: &FieldSpec) -> String {
    if spec.integral {
        format!("{} must be between {} and {}.", spec.label, spec.min, spec.max)
    } else {
        format!("{} must be between {:.1} and {:.1}.", spec.label, spec.min, spec.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_order_matches_dataset_columns() {
        let input = PatientInput {
            pregnancies: 2,
            glucose: 130,
            blood_pressure: 80,
            skin_thickness: 23,
            insulin: 94,
            bmi: 28.5,
            diabetes_pedigree: 0.4,
            age: 45,
        };
        assert_eq!(
            input.to_features(),
            [2.0, 130.0, 80.0, 23.0, 94.0, 28.5, 0.4, 45.0]
        );
    }

    #[test]
    fn test_field_names_match_struct() {
        let names: Vec<_> = FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec![
                "pregnancies",
                "glucose",
                "blood_pressure",
                "skin_thickness",
                "insulin",
                "bmi",
                "diabetes_pedigree",
                "age"
            ]
        );
    }

    #[test]
    fn test_defaults_match_field_table() {
        let defaults = PatientInput::default().to_features();
        for (spec, value) in FIELDS.iter().zip(defaults.iter()) {
            assert_eq!(spec.default, *value, "{}", spec.name);
        }
        assert!(PatientInput::default().check_ranges().is_ok());
    }

    #[test]
    fn test_parse_valid_form() {
        let input = PatientInput::from_form_values(&[
            "2", "130", "80", "23", "94", "28.5", "0.4", "45",
        ])
        .unwrap();
        assert_eq!(input.glucose, 130);
        assert_eq!(input.bmi, 28.5);
        assert_eq!(input.age, 45);
    }

    #[test]
    fn test_boundaries_are_accepted() {
        let low = PatientInput::from_form_values(&[
            "0", "0", "0", "0", "0", "10.0", "0.0", "1",
        ]);
        let high = PatientInput::from_form_values(&[
            "20", "200", "200", "100", "800", "70.0", "2.5", "120",
        ]);
        assert!(low.is_ok());
        assert!(high.is_ok());
    }

    #[test]
    fn test_out_of_range_fields_are_reported_in_form_order() {
        let errors = PatientInput::from_form_values(&[
            "1", "100", "70", "20", "100", "25", "0.5", "121",
        ])
        .unwrap_err();
        assert_eq!(errors, vec!["Age must be between 1 and 120.".to_string()]);

        let errors = PatientInput::from_form_values(&[
            "21", "100", "70", "20", "100", "9.5", "0.5", "0",
        ])
        .unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("Number of Pregnancies"));
        assert!(errors[1].starts_with("Body Mass Index"));
        assert!(errors[2].starts_with("Age"));
    }

    #[test]
    fn test_non_numeric_and_fractional_integers_are_rejected() {
        let errors = PatientInput::from_form_values(&[
            "two", "100.5", "70", "20", "100", "25", "0.5", "30",
        ])
        .unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Number of Pregnancies must be a number.".to_string(),
                "Glucose Level must be a whole number.".to_string(),
            ]
        );
    }

    #[test]
    fn test_negative_integer_is_out_of_range() {
        let errors = PatientInput::from_form_values(&[
            "-1", "100", "70", "20", "100", "25", "0.5", "30",
        ])
        .unwrap_err();
        assert_eq!(errors, vec!["Number of Pregnancies must be between 0 and 20.".to_string()]);
    }
}
