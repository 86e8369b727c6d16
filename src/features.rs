//! Feature normalization: raw JSON record -> typed application -> fixed-order
//! feature vector.
//!
//! The column order here is a contract with the fitted preprocessing
//! artifact. It is checked against the artifact at load time and covered by
//! a fixture test; it is never inferred at runtime.

use crate::models::{DefaultOnFile, HomeOwnership, LoanApplication, LoanGrade, LoanIntent};
use serde_json::Value;
use std::fmt;

/// Numeric feature columns, in the order the preprocessing transform was
/// fitted on.
pub const NUMERIC_COLUMNS: [&str; 7] = [
    "person_age",
    "person_income",
    "person_emp_length",
    "loan_amnt",
    "loan_int_rate",
    "loan_percent_income",
    "cb_person_cred_hist_length",
];

/// Categorical feature columns, in fitted order.
pub const CATEGORICAL_COLUMNS: [&str; 4] = [
    "person_home_ownership",
    "loan_intent",
    "loan_grade",
    "cb_person_default_on_file",
];

/// Validation failure naming every offending field.
///
/// Collected exhaustively rather than short-circuiting so a caller can fix
/// all problems in one round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.issues.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Ordered feature vector matching the fitted column order: the seven
/// numeric values followed by the four categorical labels.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub numeric: [f64; 7],
    pub categorical: [&'static str; 4],
}

/// Parse and validate a raw JSON record into a typed application.
///
/// Numeric fields accept JSON numbers or numeric strings and must coerce to
/// a finite f64. Categorical fields are validated against their fixed
/// enumerations and fail closed on unknown values. All problems are
/// reported together, each naming its field.
pub fn parse_application(payload: &Value) -> Result<LoanApplication, ValidationError> {
    let record = payload.as_object().ok_or_else(|| ValidationError {
        issues: vec!["request body must be a JSON object".to_string()],
    })?;

    let mut issues = Vec::new();

    let person_age = numeric_field(record, "person_age", &mut issues);
    let person_income = numeric_field(record, "person_income", &mut issues);
    let person_emp_length = numeric_field(record, "person_emp_length", &mut issues);
    let loan_amnt = numeric_field(record, "loan_amnt", &mut issues);
    let loan_int_rate = numeric_field(record, "loan_int_rate", &mut issues);
    let loan_percent_income = numeric_field(record, "loan_percent_income", &mut issues);
    let cb_person_cred_hist_length =
        numeric_field(record, "cb_person_cred_hist_length", &mut issues);

    let person_home_ownership = categorical_field(
        record,
        "person_home_ownership",
        &HomeOwnership::VALUES,
        HomeOwnership::parse,
        &mut issues,
    );
    let loan_intent = categorical_field(
        record,
        "loan_intent",
        &LoanIntent::VALUES,
        LoanIntent::parse,
        &mut issues,
    );
    let loan_grade = categorical_field(
        record,
        "loan_grade",
        &LoanGrade::VALUES,
        LoanGrade::parse,
        &mut issues,
    );
    let cb_person_default_on_file = categorical_field(
        record,
        "cb_person_default_on_file",
        &DefaultOnFile::VALUES,
        DefaultOnFile::parse,
        &mut issues,
    );

    // Loose domain bounds; values outside them would be extrapolation far
    // beyond the training distribution.
    if let Some(age) = person_age {
        check_range(age, "person_age", 18.0, 120.0, &mut issues);
    }
    if let Some(income) = person_income {
        if income <= 0.0 {
            issues.push("person_income: must be greater than zero".to_string());
        }
    }
    if let Some(emp) = person_emp_length {
        if emp < 0.0 {
            issues.push("person_emp_length: must not be negative".to_string());
        }
    }
    if let Some(amount) = loan_amnt {
        if amount <= 0.0 {
            issues.push("loan_amnt: must be greater than zero".to_string());
        }
    }
    if let Some(rate) = loan_int_rate {
        if rate < 0.0 {
            issues.push("loan_int_rate: must not be negative".to_string());
        }
    }
    if let Some(ratio) = loan_percent_income {
        check_range(ratio, "loan_percent_income", 0.0, 10.0, &mut issues);
    }
    if let Some(hist) = cb_person_cred_hist_length {
        if hist < 0.0 {
            issues.push("cb_person_cred_hist_length: must not be negative".to_string());
        }
    }

    if !issues.is_empty() {
        return Err(ValidationError { issues });
    }

    // All fields validated above; the unwraps cannot fire once issues is empty.
    Ok(LoanApplication {
        person_age: person_age.unwrap(),
        person_income: person_income.unwrap(),
        person_emp_length: person_emp_length.unwrap(),
        loan_amnt: loan_amnt.unwrap(),
        loan_int_rate: loan_int_rate.unwrap(),
        loan_percent_income: loan_percent_income.unwrap(),
        cb_person_cred_hist_length: cb_person_cred_hist_length.unwrap(),
        person_home_ownership: person_home_ownership.unwrap(),
        loan_intent: loan_intent.unwrap(),
        loan_grade: loan_grade.unwrap(),
        cb_person_default_on_file: cb_person_default_on_file.unwrap(),
    })
}

/// Assemble the ordered feature vector for a validated application.
pub fn feature_vector(application: &LoanApplication) -> FeatureVector {
    FeatureVector {
        numeric: [
            application.person_age,
            application.person_income,
            application.person_emp_length,
            application.loan_amnt,
            application.loan_int_rate,
            application.loan_percent_income,
            application.cb_person_cred_hist_length,
        ],
        categorical: [
            application.person_home_ownership.as_str(),
            application.loan_intent.as_str(),
            application.loan_grade.as_str(),
            application.cb_person_default_on_file.as_str(),
        ],
    }
}

fn numeric_field(
    record: &serde_json::Map<String, Value>,
    field: &str,
    issues: &mut Vec<String>,
) -> Option<f64> {
    let value = match record.get(field) {
        Some(v) => v,
        None => {
            issues.push(format!("{field}: missing required field"));
            return None;
        }
    };

    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(x) if x.is_finite() => Some(x),
        _ => {
            issues.push(format!("{field}: expected a finite number, got {value}"));
            None
        }
    }
}

fn categorical_field<T>(
    record: &serde_json::Map<String, Value>,
    field: &str,
    allowed: &[&str],
    parse: fn(&str) -> Option<T>,
    issues: &mut Vec<String>,
) -> Option<T> {
    let value = match record.get(field) {
        Some(v) => v,
        None => {
            issues.push(format!("{field}: missing required field"));
            return None;
        }
    };

    let raw = match value.as_str() {
        Some(s) => s,
        None => {
            issues.push(format!(
                "{field}: expected one of {allowed:?}, got {value}"
            ));
            return None;
        }
    };

    match parse(raw.trim()) {
        Some(parsed) => Some(parsed),
        None => {
            issues.push(format!(
                "{field}: unknown category {raw:?}, expected one of {allowed:?}"
            ));
            None
        }
    }
}

fn check_range(value: f64, field: &str, min: f64, max: f64, issues: &mut Vec<String>) {
    if value < min || value > max {
        issues.push(format!("{field}: must be between {min} and {max}"));
    }
}
