//! Risk scoring over the loaded model artifacts.
//!
//! The scorer never touches the artifact types directly. It composes two
//! narrow capabilities, `FeatureTransform` and `ProbabilityModel`, so tests
//! can substitute stubs and the artifact format can change without touching
//! scoring logic.

use crate::features::{self, FeatureVector};
use crate::models::{LoanApplication, RiskAssessment, RiskLevel, RiskThresholds};
use std::fmt;
use std::sync::Arc;

/// Which inference stage failed. Reported to the caller instead of the
/// underlying artifact detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceStage {
    Preprocessing,
    Classification,
}

impl InferenceStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preprocessing => "preprocessing",
            Self::Classification => "classification",
        }
    }
}

/// Inference failure on well-formed input, e.g. an artifact that disagrees
/// with the feature contract. Never retried: the computation is
/// deterministic, so a retry on the same input cannot succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceError {
    pub stage: InferenceStage,
    pub message: String,
}

impl InferenceError {
    pub fn preprocessing(message: impl Into<String>) -> Self {
        Self {
            stage: InferenceStage::Preprocessing,
            message: message.into(),
        }
    }

    pub fn classification(message: impl Into<String>) -> Self {
        Self {
            stage: InferenceStage::Classification,
            message: message.into(),
        }
    }
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage.as_str(), self.message)
    }
}

impl std::error::Error for InferenceError {}

/// Fitted preprocessing transform: ordered raw features -> encoded vector.
pub trait FeatureTransform: Send + Sync {
    fn transform(&self, features: &FeatureVector) -> Result<Vec<f64>, InferenceError>;
}

/// Fitted binary classifier: encoded vector -> P(default = 1).
pub trait ProbabilityModel: Send + Sync {
    fn predict_probability(&self, encoded: &[f64]) -> Result<f64, InferenceError>;
}

/// Deterministic scorer over the immutable loaded artifacts.
///
/// Holds no mutable state; safe to share across request handlers.
pub struct RiskScorer {
    transform: Arc<dyn FeatureTransform>,
    model: Arc<dyn ProbabilityModel>,
    thresholds: RiskThresholds,
}

impl RiskScorer {
    pub fn new(
        transform: Arc<dyn FeatureTransform>,
        model: Arc<dyn ProbabilityModel>,
        thresholds: RiskThresholds,
    ) -> Self {
        Self {
            transform,
            model,
            thresholds,
        }
    }

    /// Score a validated application.
    pub fn assess(&self, application: &LoanApplication) -> Result<RiskAssessment, InferenceError> {
        let vector = features::feature_vector(application);
        let encoded = self.transform.transform(&vector)?;
        let probability = self.model.predict_probability(&encoded)?;

        if !probability.is_finite() {
            return Err(InferenceError::classification(format!(
                "classifier produced a non-finite probability: {probability}"
            )));
        }
        let probability = probability.clamp(0.0, 1.0);

        Ok(self.assessment_for(probability))
    }

    /// Derive the full assessment from a probability. Pure; exposed so the
    /// bucketing and message policy can be tested without artifacts.
    pub fn assessment_for(&self, probability: f64) -> RiskAssessment {
        let prediction = u8::from(probability >= self.thresholds.decision);
        let risk_level = RiskLevel::from_probability(probability, &self.thresholds);
        let message = format!(
            "{}: This loan application has a {:.1}% probability of default. {}",
            risk_level.as_str(),
            probability * 100.0,
            risk_level.recommendation()
        );

        RiskAssessment {
            prediction,
            probability,
            risk_level,
            message,
        }
    }
}
