//! Utility to inspect the model artifacts and print their shape.

use credit_risk_api::artifacts::{Preprocessor, TreeEnsemble, MODEL_FILE, PREPROCESSOR_FILE};
use credit_risk_api::features::{CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// Main entry point for the artifact inspection utility.
///
/// Loads the preprocessor and classifier from MODEL_DIR (or the first
/// command-line argument) and prints the feature contract they encode.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let model_dir: PathBuf = env::args()
        .nth(1)
        .or_else(|| env::var("MODEL_DIR").ok())
        .unwrap_or_else(|| "model".to_string())
        .into();

    println!("Inspecting artifacts in {}", model_dir.display());
    println!();

    let preprocessor = Preprocessor::load(&model_dir.join(PREPROCESSOR_FILE))?;
    println!("Preprocessor:");
    println!("  numeric columns ({}):", NUMERIC_COLUMNS.len());
    for column in NUMERIC_COLUMNS {
        println!("    - {}", column);
    }
    println!("  categorical columns ({}):", CATEGORICAL_COLUMNS.len());
    for (column, categories) in CATEGORICAL_COLUMNS.iter().zip(preprocessor.categories()) {
        println!("    - {}: {:?}", column, categories);
    }
    println!("  encoded width: {}", preprocessor.output_width());
    println!();

    let model = TreeEnsemble::load(&model_dir.join(MODEL_FILE))?;
    println!("Classifier:");
    println!("  trees: {}", model.num_trees());
    println!("  expected features: {}", model.num_features());

    if preprocessor.output_width() != model.num_features() {
        println!();
        println!(
            "WARNING: width mismatch, preprocessor encodes {} features but the classifier expects {}",
            preprocessor.output_width(),
            model.num_features()
        );
    }

    Ok(())
}
