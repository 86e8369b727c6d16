//! Loading and evaluation of the fitted model artifacts.
//!
//! Two JSON files are read once at startup from the configured directory:
//! `preprocessor.json` (standard-scaling stats plus one-hot category lists)
//! and `model.json` (a gradient-boosted tree ensemble with logit leaves).
//! A missing or corrupt file does not abort startup; the service comes up
//! degraded and reports the failure through `/health`.

use crate::features::{FeatureVector, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};
use crate::scoring::{FeatureTransform, InferenceError, ProbabilityModel};
use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// File name of the preprocessing artifact inside the model directory.
pub const PREPROCESSOR_FILE: &str = "preprocessor.json";
/// File name of the classifier artifact inside the model directory.
pub const MODEL_FILE: &str = "model.json";

// ============ Preprocessor ============

#[derive(Debug, Deserialize)]
struct NumericBlock {
    columns: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct CategoricalBlock {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct PreprocessorSpec {
    numeric: NumericBlock,
    categorical: CategoricalBlock,
}

/// Fitted column transform: standard scaling for the numeric columns,
/// fail-closed one-hot encoding for the categorical columns.
#[derive(Debug)]
pub struct Preprocessor {
    mean: Vec<f64>,
    scale: Vec<f64>,
    categories: Vec<Vec<String>>,
}

impl Preprocessor {
    /// Load and structurally validate the preprocessing artifact.
    ///
    /// The artifact's column lists must match the canonical order in
    /// `features::NUMERIC_COLUMNS` / `features::CATEGORICAL_COLUMNS`
    /// exactly; a reordered or retrained-with-different-columns artifact is
    /// rejected here rather than producing silently wrong encodings.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let spec: PreprocessorSpec = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        if spec.numeric.columns != NUMERIC_COLUMNS {
            bail!(
                "numeric column order mismatch: artifact has {:?}, expected {:?}",
                spec.numeric.columns,
                NUMERIC_COLUMNS
            );
        }
        if spec.categorical.columns != CATEGORICAL_COLUMNS {
            bail!(
                "categorical column order mismatch: artifact has {:?}, expected {:?}",
                spec.categorical.columns,
                CATEGORICAL_COLUMNS
            );
        }
        if spec.numeric.mean.len() != NUMERIC_COLUMNS.len()
            || spec.numeric.scale.len() != NUMERIC_COLUMNS.len()
        {
            bail!(
                "scaler stats length mismatch: {} means, {} scales, expected {}",
                spec.numeric.mean.len(),
                spec.numeric.scale.len(),
                NUMERIC_COLUMNS.len()
            );
        }
        for (column, &scale) in NUMERIC_COLUMNS.iter().zip(&spec.numeric.scale) {
            if !scale.is_finite() || scale <= 0.0 {
                bail!("invalid scale {scale} for column {column}");
            }
        }
        for (column, &mean) in NUMERIC_COLUMNS.iter().zip(&spec.numeric.mean) {
            if !mean.is_finite() {
                bail!("invalid mean {mean} for column {column}");
            }
        }
        if spec.categorical.categories.len() != CATEGORICAL_COLUMNS.len() {
            bail!(
                "category list count mismatch: {} lists, expected {}",
                spec.categorical.categories.len(),
                CATEGORICAL_COLUMNS.len()
            );
        }
        for (column, categories) in CATEGORICAL_COLUMNS.iter().zip(&spec.categorical.categories) {
            if categories.is_empty() {
                bail!("empty category list for column {column}");
            }
        }

        Ok(Self {
            mean: spec.numeric.mean,
            scale: spec.numeric.scale,
            categories: spec.categorical.categories,
        })
    }

    /// Width of the encoded vector this transform produces.
    pub fn output_width(&self) -> usize {
        self.mean.len() + self.categories.iter().map(Vec::len).sum::<usize>()
    }

    /// Fitted category labels per categorical column.
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }
}

impl FeatureTransform for Preprocessor {
    fn transform(&self, features: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        let mut encoded = Vec::with_capacity(self.output_width());

        for ((value, mean), scale) in features.numeric.iter().zip(&self.mean).zip(&self.scale) {
            encoded.push((value - mean) / scale);
        }

        for ((column, label), categories) in CATEGORICAL_COLUMNS
            .iter()
            .zip(&features.categorical)
            .zip(&self.categories)
        {
            // Fail closed: a label the encoder was not fitted on would
            // corrupt the learned decision boundary if mapped to a default.
            let hit = categories.iter().position(|c| c == label).ok_or_else(|| {
                InferenceError::preprocessing(format!(
                    "category {label:?} of column {column} is not in the fitted encoder"
                ))
            })?;
            for i in 0..categories.len() {
                encoded.push(if i == hit { 1.0 } else { 0.0 });
            }
        }

        Ok(encoded)
    }
}

// ============ Classifier ============

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Deserialize)]
struct Tree {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Deserialize)]
struct ModelSpec {
    num_features: usize,
    /// Base prediction in logit space.
    base_score: f64,
    trees: Vec<Tree>,
}

/// Gradient-boosted tree ensemble over the encoded feature vector.
///
/// Probability = sigmoid(base_score + sum of leaf values). Split rule is
/// `x[feature] < threshold` goes left, matching the exporter.
#[derive(Debug)]
pub struct TreeEnsemble {
    spec: ModelSpec,
}

impl TreeEnsemble {
    /// Load and structurally validate the classifier artifact.
    ///
    /// Child indices must point forward in the node array, which both keeps
    /// traversal in bounds and guarantees it terminates.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let spec: ModelSpec = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        if spec.trees.is_empty() {
            bail!("model has no trees");
        }
        if !spec.base_score.is_finite() {
            bail!("invalid base_score {}", spec.base_score);
        }
        for (t, tree) in spec.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                bail!("tree {t} has no nodes");
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= spec.num_features {
                            bail!(
                                "tree {t} node {i}: feature index {feature} out of range \
                                 (num_features = {})",
                                spec.num_features
                            );
                        }
                        if !threshold.is_finite() {
                            bail!("tree {t} node {i}: non-finite threshold");
                        }
                        if *left <= i || *right <= i || *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                            bail!("tree {t} node {i}: child indices must point forward in bounds");
                        }
                    }
                    TreeNode::Leaf { value } => {
                        if !value.is_finite() {
                            bail!("tree {t} node {i}: non-finite leaf value");
                        }
                    }
                }
            }
        }

        Ok(Self { spec })
    }

    /// Number of encoded features the ensemble expects.
    pub fn num_features(&self) -> usize {
        self.spec.num_features
    }

    /// Number of trees in the ensemble.
    pub fn num_trees(&self) -> usize {
        self.spec.trees.len()
    }

    fn tree_output(tree: &Tree, encoded: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &tree.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if encoded[*feature] < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

impl ProbabilityModel for TreeEnsemble {
    fn predict_probability(&self, encoded: &[f64]) -> Result<f64, InferenceError> {
        if encoded.len() != self.spec.num_features {
            return Err(InferenceError::classification(format!(
                "encoded vector has {} features, model expects {}",
                encoded.len(),
                self.spec.num_features
            )));
        }
        if let Some(bad) = encoded.iter().find(|x| !x.is_finite()) {
            return Err(InferenceError::classification(format!(
                "encoded vector contains a non-finite value: {bad}"
            )));
        }

        let logit: f64 = self.spec.base_score
            + self
                .spec
                .trees
                .iter()
                .map(|tree| Self::tree_output(tree, encoded))
                .sum::<f64>();

        Ok(sigmoid(logit))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

// ============ Startup loading ============

/// Outcome of the one-shot artifact load at process start.
///
/// Either artifact may be absent; the service then serves `/health` with
/// the failure detail and refuses `/predict` until restarted with fixed
/// artifacts.
pub struct ArtifactSet {
    pub preprocessor: Option<Arc<Preprocessor>>,
    pub model: Option<Arc<TreeEnsemble>>,
    pub preprocessor_error: Option<String>,
    pub model_error: Option<String>,
}

impl ArtifactSet {
    /// Load both artifacts from `dir`, warning and continuing per artifact.
    pub fn load(dir: &Path) -> Self {
        let preprocessor_path = dir.join(PREPROCESSOR_FILE);
        let model_path = dir.join(MODEL_FILE);

        let (preprocessor, preprocessor_error) = match Preprocessor::load(&preprocessor_path) {
            Ok(preprocessor) => {
                tracing::info!(
                    path = %preprocessor_path.display(),
                    output_width = preprocessor.output_width(),
                    "Preprocessor loaded successfully"
                );
                (Some(Arc::new(preprocessor)), None)
            }
            Err(e) => {
                tracing::error!(path = %preprocessor_path.display(), error = %e, "Failed to load preprocessor");
                (None, Some(format!("{e:#}")))
            }
        };

        let (mut model, mut model_error) = match TreeEnsemble::load(&model_path) {
            Ok(model) => {
                tracing::info!(
                    path = %model_path.display(),
                    trees = model.num_trees(),
                    num_features = model.num_features(),
                    "Classifier loaded successfully"
                );
                (Some(Arc::new(model)), None)
            }
            Err(e) => {
                tracing::error!(path = %model_path.display(), error = %e, "Failed to load classifier");
                (None, Some(format!("{e:#}")))
            }
        };

        // The two artifacts were fitted together; a width mismatch means a
        // mixed deployment and every prediction would fail.
        if let (Some(p), Some(m)) = (&preprocessor, &model) {
            if p.output_width() != m.num_features() {
                let err = format!(
                    "artifact mismatch: preprocessor encodes {} features, classifier expects {}",
                    p.output_width(),
                    m.num_features()
                );
                tracing::error!("{err}");
                model = None;
                model_error = Some(err);
            }
        }

        Self {
            preprocessor,
            model,
            preprocessor_error,
            model_error,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.preprocessor.is_some() && self.model.is_some()
    }

    /// Combined load-failure detail for the health endpoint.
    pub fn detail(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(e) = &self.preprocessor_error {
            parts.push(format!("preprocessor: {e}"));
        }
        if let Some(e) = &self.model_error {
            parts.push(format!("model: {e}"));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}
