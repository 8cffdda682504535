use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tco::assumptions::ModelAssumptions;

const DEFAULT_CONFIG_FILE: &str = "nac-tco.toml";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub sensitivity: SensitivityConfig,
    pub logging: LoggingConfig,
}

/// Tunable modeling constants. Anything not listed keeps its built-in value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelConfig {
    pub annual_breach_probability: Decimal,
    pub first_year_value_ramp: Decimal,
    pub tornado_range_pct: Decimal,
    pub default_breach_cost: Decimal,
    pub default_maintenance_pct: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SensitivityConfig {
    pub default_range_pct: Decimal,
    pub default_steps: usize,
    pub max_steps: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub tornado_range_pct: Option<Decimal>,
    pub default_range_pct: Option<Decimal>,
    pub default_steps: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        let assumptions = ModelAssumptions::default();
        Self {
            model: ModelConfig {
                annual_breach_probability: assumptions.annual_breach_probability,
                first_year_value_ramp: assumptions.first_year_value_ramp,
                tornado_range_pct: assumptions.tornado_range_pct,
                default_breach_cost: assumptions.default_breach_cost,
                default_maintenance_pct: assumptions.default_maintenance_pct,
            },
            sensitivity: SensitivityConfig {
                default_range_pct: Decimal::from(20),
                default_steps: 5,
                max_steps: 25,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl ModelConfig {
    /// Built-in assumptions with the configured constants applied.
    pub fn assumptions(&self) -> ModelAssumptions {
        ModelAssumptions {
            annual_breach_probability: self.annual_breach_probability,
            first_year_value_ramp: self.first_year_value_ramp,
            tornado_range_pct: self.tornado_range_pct,
            default_breach_cost: self.default_breach_cost,
            default_maintenance_pct: self.default_maintenance_pct,
            ..ModelAssumptions::default()
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(model) = patch.model {
            if let Some(probability) = model.annual_breach_probability {
                self.model.annual_breach_probability = probability;
            }
            if let Some(ramp) = model.first_year_value_ramp {
                self.model.first_year_value_ramp = ramp;
            }
            if let Some(range) = model.tornado_range_pct {
                self.model.tornado_range_pct = range;
            }
            if let Some(breach_cost) = model.default_breach_cost {
                self.model.default_breach_cost = breach_cost;
            }
            if let Some(maintenance) = model.default_maintenance_pct {
                self.model.default_maintenance_pct = maintenance;
            }
        }

        if let Some(sensitivity) = patch.sensitivity {
            if let Some(range) = sensitivity.default_range_pct {
                self.sensitivity.default_range_pct = range;
            }
            if let Some(steps) = sensitivity.default_steps {
                self.sensitivity.default_steps = steps;
            }
            if let Some(max_steps) = sensitivity.max_steps {
                self.sensitivity.max_steps = max_steps;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("NAC_TCO_MODEL_ANNUAL_BREACH_PROBABILITY") {
            self.model.annual_breach_probability =
                parse_decimal("NAC_TCO_MODEL_ANNUAL_BREACH_PROBABILITY", &value)?;
        }
        if let Some(value) = read_env("NAC_TCO_MODEL_FIRST_YEAR_VALUE_RAMP") {
            self.model.first_year_value_ramp =
                parse_decimal("NAC_TCO_MODEL_FIRST_YEAR_VALUE_RAMP", &value)?;
        }
        if let Some(value) = read_env("NAC_TCO_MODEL_TORNADO_RANGE_PCT") {
            self.model.tornado_range_pct =
                parse_decimal("NAC_TCO_MODEL_TORNADO_RANGE_PCT", &value)?;
        }
        if let Some(value) = read_env("NAC_TCO_MODEL_DEFAULT_BREACH_COST") {
            self.model.default_breach_cost =
                parse_decimal("NAC_TCO_MODEL_DEFAULT_BREACH_COST", &value)?;
        }
        if let Some(value) = read_env("NAC_TCO_MODEL_DEFAULT_MAINTENANCE_PCT") {
            self.model.default_maintenance_pct =
                parse_decimal("NAC_TCO_MODEL_DEFAULT_MAINTENANCE_PCT", &value)?;
        }

        if let Some(value) = read_env("NAC_TCO_SENSITIVITY_DEFAULT_RANGE_PCT") {
            self.sensitivity.default_range_pct =
                parse_decimal("NAC_TCO_SENSITIVITY_DEFAULT_RANGE_PCT", &value)?;
        }
        if let Some(value) = read_env("NAC_TCO_SENSITIVITY_DEFAULT_STEPS") {
            self.sensitivity.default_steps =
                parse_usize("NAC_TCO_SENSITIVITY_DEFAULT_STEPS", &value)?;
        }
        if let Some(value) = read_env("NAC_TCO_SENSITIVITY_MAX_STEPS") {
            self.sensitivity.max_steps = parse_usize("NAC_TCO_SENSITIVITY_MAX_STEPS", &value)?;
        }

        let log_level = read_env("NAC_TCO_LOGGING_LEVEL").or_else(|| read_env("NAC_TCO_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("NAC_TCO_LOGGING_FORMAT").or_else(|| read_env("NAC_TCO_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(range) = overrides.tornado_range_pct {
            self.model.tornado_range_pct = range;
        }
        if let Some(range) = overrides.default_range_pct {
            self.sensitivity.default_range_pct = range;
        }
        if let Some(steps) = overrides.default_steps {
            self.sensitivity.default_steps = steps;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_model(&self.model)?;
        validate_sensitivity(&self.sensitivity)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), Path::new("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_model(model: &ModelConfig) -> Result<(), ConfigError> {
    let unit_interval = Decimal::ZERO..=Decimal::ONE;
    if !unit_interval.contains(&model.annual_breach_probability) {
        return Err(ConfigError::Validation(
            "model.annual_breach_probability must be in range 0..=1".to_string(),
        ));
    }
    if !unit_interval.contains(&model.first_year_value_ramp) {
        return Err(ConfigError::Validation(
            "model.first_year_value_ramp must be in range 0..=1".to_string(),
        ));
    }

    if model.tornado_range_pct <= Decimal::ZERO || model.tornado_range_pct >= Decimal::ONE_HUNDRED
    {
        return Err(ConfigError::Validation(
            "model.tornado_range_pct must be greater than 0 and less than 100".to_string(),
        ));
    }

    if model.default_breach_cost < Decimal::ZERO {
        return Err(ConfigError::Validation(
            "model.default_breach_cost must not be negative".to_string(),
        ));
    }
    if model.default_maintenance_pct < Decimal::ZERO {
        return Err(ConfigError::Validation(
            "model.default_maintenance_pct must not be negative".to_string(),
        ));
    }

    Ok(())
}

fn validate_sensitivity(sensitivity: &SensitivityConfig) -> Result<(), ConfigError> {
    if sensitivity.default_range_pct < Decimal::ZERO {
        return Err(ConfigError::Validation(
            "sensitivity.default_range_pct must not be negative".to_string(),
        ));
    }

    if sensitivity.max_steps < 2 {
        return Err(ConfigError::Validation(
            "sensitivity.max_steps must be at least 2".to_string(),
        ));
    }

    if sensitivity.default_steps < 2 || sensitivity.default_steps > sensitivity.max_steps {
        return Err(ConfigError::Validation(format!(
            "sensitivity.default_steps must be in range 2..={}",
            sensitivity.max_steps
        )));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    model: Option<ModelPatch>,
    sensitivity: Option<SensitivityPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelPatch {
    annual_breach_probability: Option<Decimal>,
    first_year_value_ramp: Option<Decimal>,
    tornado_range_pct: Option<Decimal>,
    default_breach_cost: Option<Decimal>,
    default_maintenance_pct: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct SensitivityPatch {
    default_range_pct: Option<Decimal>,
    default_steps: Option<usize>,
    max_steps: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_mirror_model_assumptions() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;
        let assumptions = config.model.assumptions();

        ensure(
            assumptions.annual_breach_probability == Decimal::new(10, 2),
            "default breach probability should be 10%",
        )?;
        ensure(
            assumptions.first_year_value_ramp == Decimal::new(70, 2),
            "default first-year ramp should be 70%",
        )?;
        ensure(config.sensitivity.default_steps == 5, "default steps should be 5")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_NAC_BREACH_COST", "3500000");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("nac-tco.toml");
            fs::write(
                &path,
                r#"
[model]
default_breach_cost = "${TEST_NAC_BREACH_COST}"
annual_breach_probability = 0.15
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.model.default_breach_cost == Decimal::from(3_500_000),
                "breach cost should be interpolated from the environment",
            )?;
            ensure(
                config.model.annual_breach_probability == Decimal::new(15, 2),
                "breach probability should be read from the file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_NAC_BREACH_COST"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("NAC_TCO_LOG_LEVEL", "warn");
        env::set_var("NAC_TCO_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Json),
                "json logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["NAC_TCO_LOG_LEVEL", "NAC_TCO_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("NAC_TCO_SENSITIVITY_DEFAULT_STEPS", "9");
        env::set_var("NAC_TCO_MODEL_TORNADO_RANGE_PCT", "25");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("nac-tco.toml");
            fs::write(
                &path,
                r#"
[model]
tornado_range_pct = 10

[sensitivity]
default_steps = 7
default_range_pct = 15

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    tornado_range_pct: Some(Decimal::from(30)),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.model.tornado_range_pct == Decimal::from(30),
                "override tornado range should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.sensitivity.default_steps == 9, "env steps should win over file")?;
            ensure(
                config.sensitivity.default_range_pct == Decimal::from(15),
                "file range should win over defaults",
            )?;
            Ok(())
        })();

        clear_vars(&["NAC_TCO_SENSITIVITY_DEFAULT_STEPS", "NAC_TCO_MODEL_TORNADO_RANGE_PCT"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("NAC_TCO_MODEL_FIRST_YEAR_VALUE_RAMP", "1.5");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("first_year_value_ramp")
            );
            ensure(has_message, "validation failure should mention first_year_value_ramp")
        })();

        clear_vars(&["NAC_TCO_MODEL_FIRST_YEAR_VALUE_RAMP"]);
        result
    }

    #[test]
    fn steps_above_maximum_are_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides { default_steps: Some(40), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        })
        .err()
        .ok_or_else(|| "expected validation failure".to_string())?;

        ensure(
            matches!(error, ConfigError::Validation(ref message) if message.contains("default_steps")),
            "validation failure should mention default_steps",
        )
    }

    #[test]
    fn malformed_env_value_is_reported_with_its_key() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("NAC_TCO_SENSITIVITY_MAX_STEPS", "many");
        let result = match AppConfig::load(LoadOptions::default()) {
            Err(ConfigError::InvalidEnvOverride { key, .. })
                if key == "NAC_TCO_SENSITIVITY_MAX_STEPS" =>
            {
                Ok(())
            }
            other => Err(format!("unexpected load result: {other:?}")),
        };

        clear_vars(&["NAC_TCO_SENSITIVITY_MAX_STEPS"]);
        result
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("absent.toml");
        let error = AppConfig::load(LoadOptions {
            config_path: Some(missing),
            require_file: true,
            ..LoadOptions::default()
        })
        .err()
        .ok_or_else(|| "expected missing file error".to_string())?;

        ensure(
            matches!(error, ConfigError::MissingConfigFile(_)),
            "missing required file should be reported",
        )
    }
}
