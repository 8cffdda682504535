use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use nac_tco_core::config::{AppConfig, LoadOptions};
use toml::Value;

/// Renders the effective configuration with the layer each value came from.
pub fn run(config_path: Option<PathBuf>) -> String {
    let config = match AppConfig::load(LoadOptions {
        config_path: config_path.clone(),
        require_file: config_path.is_some(),
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = config_path.filter(|path| path.exists()).or_else(detect_config_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let model = &config.model;
    let sensitivity = &config.sensitivity;
    let entries = [
        (
            "model.annual_breach_probability",
            model.annual_breach_probability.to_string(),
            source(
                "model.annual_breach_probability",
                &["NAC_TCO_MODEL_ANNUAL_BREACH_PROBABILITY"],
            ),
        ),
        (
            "model.first_year_value_ramp",
            model.first_year_value_ramp.to_string(),
            source("model.first_year_value_ramp", &["NAC_TCO_MODEL_FIRST_YEAR_VALUE_RAMP"]),
        ),
        (
            "model.tornado_range_pct",
            model.tornado_range_pct.to_string(),
            source("model.tornado_range_pct", &["NAC_TCO_MODEL_TORNADO_RANGE_PCT"]),
        ),
        (
            "model.default_breach_cost",
            model.default_breach_cost.to_string(),
            source("model.default_breach_cost", &["NAC_TCO_MODEL_DEFAULT_BREACH_COST"]),
        ),
        (
            "model.default_maintenance_pct",
            model.default_maintenance_pct.to_string(),
            source("model.default_maintenance_pct", &["NAC_TCO_MODEL_DEFAULT_MAINTENANCE_PCT"]),
        ),
        (
            "sensitivity.default_range_pct",
            sensitivity.default_range_pct.to_string(),
            source("sensitivity.default_range_pct", &["NAC_TCO_SENSITIVITY_DEFAULT_RANGE_PCT"]),
        ),
        (
            "sensitivity.default_steps",
            sensitivity.default_steps.to_string(),
            source("sensitivity.default_steps", &["NAC_TCO_SENSITIVITY_DEFAULT_STEPS"]),
        ),
        (
            "sensitivity.max_steps",
            sensitivity.max_steps.to_string(),
            source("sensitivity.max_steps", &["NAC_TCO_SENSITIVITY_MAX_STEPS"]),
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            source("logging.level", &["NAC_TCO_LOGGING_LEVEL", "NAC_TCO_LOG_LEVEL"]),
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            source("logging.format", &["NAC_TCO_LOGGING_FORMAT", "NAC_TCO_LOG_FORMAT"]),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.into_iter().map(|(key, value, source)| render_line(key, &value, source)));
    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("nac-tco.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/nac-tco.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys
        .iter()
        .find(|env_key| env::var(env_key).is_ok_and(|value| !value.trim().is_empty()))
    {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
