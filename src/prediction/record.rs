// src/prediction/record.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{FieldError, ValidationErrors};

/// Column order the classifier was trained on. Never reorder.
pub const FEATURE_ORDER: [&str; 8] = [
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "Insulin",
    "BMI",
    "DiabetesPedigreeFunction",
    "Age",
];

pub const FEATURE_COUNT: usize = FEATURE_ORDER.len();

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(rename = "Pregnancies")]
    pub pregnancies: i64,
    #[serde(rename = "Glucose")]
    pub glucose: i64,
    #[serde(rename = "BloodPressure")]
    pub blood_pressure: i64,
    #[serde(rename = "SkinThickness")]
    pub skin_thickness: i64,
    #[serde(rename = "Insulin")]
    pub insulin: i64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "DiabetesPedigreeFunction")]
    pub diabetes_pedigree_function: f64,
    #[serde(rename = "Age")]
    pub age: i64,
}

impl PatientRecord {
    /// Feature row in `FEATURE_ORDER`.
    pub fn to_features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.pregnancies as f64,
            self.glucose as f64,
            self.blood_pressure as f64,
            self.skin_thickness as f64,
            self.insulin as f64,
            self.bmi,
            self.diabetes_pedigree_function,
            self.age as f64,
        ]
    }

    /// Parse a raw JSON request body, collecting every field problem.
    pub fn from_json_bytes(body: &[u8]) -> Result<Self, ValidationErrors> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            ValidationErrors::single(FieldError::new("body", format!("invalid JSON: {e}")))
        })?;
        Self::from_json_value(&value)
    }

    pub fn from_json_value(value: &Value) -> Result<Self, ValidationErrors> {
        let object = value.as_object().ok_or_else(|| {
            ValidationErrors::single(FieldError::new("body", "expected a JSON object"))
        })?;

        let mut errors = Vec::new();
        let mut int = |name: &'static str| match coerce_int(object, name) {
            Ok(v) => v,
            Err(e) => {
                errors.push(e);
                0
            }
        };
        let pregnancies = int("Pregnancies");
        let glucose = int("Glucose");
        let blood_pressure = int("BloodPressure");
        let skin_thickness = int("SkinThickness");
        let insulin = int("Insulin");

        let mut float = |name: &'static str| match coerce_float(object, name) {
            Ok(v) => v,
            Err(e) => {
                errors.push(e);
                0.0
            }
        };
        let bmi = float("BMI");
        let diabetes_pedigree_function = float("DiabetesPedigreeFunction");

        let age = match coerce_int(object, "Age") {
            Ok(v) => v,
            Err(e) => {
                errors.push(e);
                0
            }
        };

        if !errors.is_empty() {
            return Err(ValidationErrors::new(errors));
        }

        Ok(Self {
            pregnancies,
            glucose,
            blood_pressure,
            skin_thickness,
            insulin,
            bmi,
            diabetes_pedigree_function,
            age,
        })
    }
}

fn field<'a>(object: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, FieldError> {
    match object.get(name) {
        None | Some(Value::Null) => Err(FieldError::new(name, "field required")),
        Some(value) => Ok(value),
    }
}

fn coerce_int(object: &Map<String, Value>, name: &'static str) -> Result<i64, FieldError> {
    let not_int = || FieldError::new(name, "value is not a valid integer");
    match field(object, name)? {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(v)
            } else {
                n.as_f64().and_then(whole_number).ok_or_else(not_int)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
                .ok_or_else(not_int)
        }
        _ => Err(not_int()),
    }
}

fn coerce_float(object: &Map<String, Value>, name: &'static str) -> Result<f64, FieldError> {
    let not_float = || FieldError::new(name, "value is not a valid number");
    match field(object, name)? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).ok_or_else(not_float),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(not_float),
        _ => Err(not_float()),
    }
}

fn whole_number(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "Pregnancies": 1,
            "Glucose": 85,
            "BloodPressure": 66,
            "SkinThickness": 29,
            "Insulin": 0,
            "BMI": 26.6,
            "DiabetesPedigreeFunction": 0.351,
            "Age": 31
        })
    }

    #[test]
    fn feature_vector_follows_training_order() {
        let record = PatientRecord::from_json_value(&sample()).unwrap();
        assert_eq!(
            record.to_features(),
            [1.0, 85.0, 66.0, 29.0, 0.0, 26.6, 0.351, 31.0]
        );
    }

    #[test]
    fn serde_names_match_feature_order() {
        let record = PatientRecord::from_json_value(&sample()).unwrap();
        let value = serde_json::to_value(record).unwrap();
        let object = value.as_object().unwrap();
        for name in FEATURE_ORDER {
            assert!(object.contains_key(name), "missing {name}");
        }
        assert_eq!(object.len(), FEATURE_COUNT);
    }

    #[test]
    fn lax_coercion_of_numbers_and_strings() {
        let mut body = sample();
        body["Glucose"] = json!("85");
        body["Age"] = json!(31.0);
        body["BMI"] = json!(26);
        body["DiabetesPedigreeFunction"] = json!(" 0.351 ");
        let record = PatientRecord::from_json_value(&body).unwrap();
        assert_eq!(record.glucose, 85);
        assert_eq!(record.age, 31);
        assert_eq!(record.bmi, 26.0);
        assert_eq!(record.diabetes_pedigree_function, 0.351);
    }

    #[test]
    fn non_numeric_string_is_rejected() {
        let mut body = sample();
        body["Glucose"] = json!("abc");
        let err = PatientRecord::from_json_value(&body).unwrap_err();
        assert_eq!(err.fields(), vec!["Glucose"]);
    }

    #[test]
    fn fractional_integer_is_rejected() {
        let mut body = sample();
        body["Insulin"] = json!(12.5);
        let err = PatientRecord::from_json_value(&body).unwrap_err();
        assert_eq!(err.fields(), vec!["Insulin"]);
    }

    #[test]
    fn reports_every_bad_field() {
        let body = json!({
            "Pregnancies": true,
            "Glucose": 85,
            "BloodPressure": null,
            "SkinThickness": 29,
            "Insulin": 0,
            "BMI": [26.6],
            "DiabetesPedigreeFunction": 0.351
        });
        let err = PatientRecord::from_json_value(&body).unwrap_err();
        assert_eq!(
            err.fields(),
            vec!["Pregnancies", "BloodPressure", "BMI", "Age"]
        );
    }

    #[test]
    fn extra_fields_are_ignored() {
        let mut body = sample();
        body["Outcome"] = json!(1);
        assert!(PatientRecord::from_json_value(&body).is_ok());
    }

    #[test]
    fn negative_values_pass_type_coercion() {
        let mut body = sample();
        body["Insulin"] = json!(-3);
        let record = PatientRecord::from_json_value(&body).unwrap();
        assert_eq!(record.insulin, -3);
    }

    #[test]
    fn invalid_json_and_non_objects() {
        let err = PatientRecord::from_json_bytes(b"{not json").unwrap_err();
        assert_eq!(err.fields(), vec!["body"]);

        let err = PatientRecord::from_json_bytes(b"[1,2,3]").unwrap_err();
        assert_eq!(err.fields(), vec!["body"]);
    }
}
