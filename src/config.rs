use crate::models::RiskThresholds;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub model_dir: PathBuf,
    pub decision_threshold: f64,
    pub risk_low_threshold: f64,
    pub risk_high_threshold: f64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            model_dir: std::env::var("MODEL_DIR")
                .unwrap_or_else(|_| "model".to_string())
                .into(),
            decision_threshold: threshold_var("DECISION_THRESHOLD", 0.5)?,
            risk_low_threshold: threshold_var("RISK_LOW_THRESHOLD", 0.3)?,
            risk_high_threshold: threshold_var("RISK_HIGH_THRESHOLD", 0.7)?,
        };

        if config.risk_low_threshold >= config.risk_high_threshold {
            anyhow::bail!(
                "RISK_LOW_THRESHOLD ({}) must be below RISK_HIGH_THRESHOLD ({})",
                config.risk_low_threshold,
                config.risk_high_threshold
            );
        }

        // Log successful configuration load
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Host: {}, Port: {}", config.host, config.port);
        tracing::debug!("Model directory: {}", config.model_dir.display());
        tracing::debug!(
            "Thresholds: decision {}, risk buckets {}/{}",
            config.decision_threshold,
            config.risk_low_threshold,
            config.risk_high_threshold
        );

        Ok(config)
    }

    /// Scoring thresholds as the scorer consumes them.
    pub fn risk_thresholds(&self) -> RiskThresholds {
        RiskThresholds {
            low_max: self.risk_low_threshold,
            high_min: self.risk_high_threshold,
            decision: self.decision_threshold,
        }
    }
}

fn threshold_var(name: &str, default: f64) -> anyhow::Result<f64> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => {
            let value: f64 = raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("{name} must be a number, got {raw:?}"))?;
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                anyhow::bail!("{name} must be between 0 and 1, got {value}");
            }
            Ok(value)
        }
    }
}
