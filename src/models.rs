use serde::Serialize;

// ============ Domain Models ============

/// Home ownership status reported by the applicant.
///
/// The string forms are the exact category labels the preprocessing
/// transform was fitted on; `as_str` must stay in sync with the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeOwnership {
    Rent,
    Own,
    Mortgage,
    Other,
}

impl HomeOwnership {
    /// All accepted wire values, used in validation error messages.
    pub const VALUES: [&'static str; 4] = ["RENT", "OWN", "MORTGAGE", "OTHER"];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "RENT" => Some(Self::Rent),
            "OWN" => Some(Self::Own),
            "MORTGAGE" => Some(Self::Mortgage),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rent => "RENT",
            Self::Own => "OWN",
            Self::Mortgage => "MORTGAGE",
            Self::Other => "OTHER",
        }
    }
}

/// Purpose of the loan.
///
/// The training data uses the compact spellings (`DEBTCONSOLIDATION`,
/// `HOMEIMPROVEMENT`); the underscored spellings from the legacy frontend
/// are accepted as aliases and normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanIntent {
    DebtConsolidation,
    Education,
    HomeImprovement,
    Medical,
    Personal,
    Venture,
}

impl LoanIntent {
    pub const VALUES: [&'static str; 6] = [
        "DEBTCONSOLIDATION",
        "EDUCATION",
        "HOMEIMPROVEMENT",
        "MEDICAL",
        "PERSONAL",
        "VENTURE",
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "DEBTCONSOLIDATION" | "DEBT_CONSOLIDATION" => Some(Self::DebtConsolidation),
            "EDUCATION" => Some(Self::Education),
            "HOMEIMPROVEMENT" | "HOME_IMPROVEMENT" => Some(Self::HomeImprovement),
            "MEDICAL" => Some(Self::Medical),
            "PERSONAL" => Some(Self::Personal),
            "VENTURE" => Some(Self::Venture),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DebtConsolidation => "DEBTCONSOLIDATION",
            Self::Education => "EDUCATION",
            Self::HomeImprovement => "HOMEIMPROVEMENT",
            Self::Medical => "MEDICAL",
            Self::Personal => "PERSONAL",
            Self::Venture => "VENTURE",
        }
    }
}

/// Loan grade A (best) through G (worst).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanGrade {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl LoanGrade {
    pub const VALUES: [&'static str; 7] = ["A", "B", "C", "D", "E", "F", "G"];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "E" => Some(Self::E),
            "F" => Some(Self::F),
            "G" => Some(Self::G),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
        }
    }
}

/// Whether a prior default is on the applicant's credit file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultOnFile {
    Yes,
    No,
}

impl DefaultOnFile {
    pub const VALUES: [&'static str; 2] = ["Y", "N"];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Y" => Some(Self::Yes),
            "N" => Some(Self::No),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Y",
            Self::No => "N",
        }
    }
}

/// A fully validated loan application.
///
/// Every numeric field is a finite f64 and every categorical field is a
/// member of its fixed enumeration; values reach this struct only through
/// the feature normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanApplication {
    /// Applicant age in years.
    pub person_age: f64,
    /// Annual income.
    pub person_income: f64,
    /// Employment length in years.
    pub person_emp_length: f64,
    /// Requested loan amount.
    pub loan_amnt: f64,
    /// Interest rate in percent.
    pub loan_int_rate: f64,
    /// Loan amount as a fraction of annual income.
    pub loan_percent_income: f64,
    /// Credit history length in years.
    pub cb_person_cred_hist_length: f64,
    /// Home ownership status.
    pub person_home_ownership: HomeOwnership,
    /// Purpose of the loan.
    pub loan_intent: LoanIntent,
    /// Loan grade.
    pub loan_grade: LoanGrade,
    /// Prior default on file.
    pub cb_person_default_on_file: DefaultOnFile,
}

// ============ Scoring Models ============

/// Discrete risk label derived from the default probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Bucket a probability using the configured boundaries.
    ///
    /// Buckets are inclusive-low / exclusive-high, except the final bucket
    /// which is closed: [0, low) / [low, high) / [high, 1].
    pub fn from_probability(probability: f64, thresholds: &RiskThresholds) -> Self {
        if probability < thresholds.low_max {
            Self::Low
        } else if probability < thresholds.high_min {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High => "High Risk",
        }
    }

    /// Recommendation clause appended to the response message.
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Low => "Recommended for approval.",
            Self::Medium => "Requires manual review.",
            Self::High => "Not recommended for approval.",
        }
    }
}

/// Probability boundaries for risk bucketing and the 0/1 decision.
///
/// These are configuration, not business constants; see `Config::from_env`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    /// Probabilities below this are Low Risk.
    pub low_max: f64,
    /// Probabilities at or above this are High Risk.
    pub high_min: f64,
    /// Probabilities at or above this classify as 1 (will default).
    pub decision: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low_max: 0.3,
            high_min: 0.7,
            decision: 0.5,
        }
    }
}

/// Complete assessment of one application.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    /// 1 if the model classifies the loan as likely to default.
    pub prediction: u8,
    /// Model-estimated probability of default, in [0, 1].
    pub probability: f64,
    /// Discrete risk bucket.
    pub risk_level: RiskLevel,
    /// Human-readable summary with recommendation.
    pub message: String,
}

// ============ API Payloads ============

/// Response body for POST /predict.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    /// Binary classification: 1 = likely default.
    pub prediction: u8,
    /// Probability of default.
    pub probability: f64,
    /// "Low Risk", "Medium Risk" or "High Risk".
    pub risk_level: String,
    /// Templated summary with the percentage and recommendation.
    pub message: String,
}

impl From<RiskAssessment> for PredictionResponse {
    fn from(assessment: RiskAssessment) -> Self {
        Self {
            prediction: assessment.prediction,
            probability: assessment.probability,
            risk_level: assessment.risk_level.as_str().to_string(),
            message: assessment.message,
        }
    }
}

/// Response body for GET /health.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" when both artifacts loaded, "unhealthy" otherwise.
    pub status: String,
    /// Whether the classifier artifact deserialized at startup.
    pub model_loaded: bool,
    /// Whether the preprocessing artifact deserialized at startup.
    pub preprocessor_loaded: bool,
    /// Load error detail per artifact, present only when unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
