pub mod compare;
pub mod config;
pub mod scenario;
pub mod sensitivity;
pub mod tco;
pub mod tornado;

use std::path::PathBuf;

use nac_tco_core::config::{AppConfig, LoadOptions};
use nac_tco_core::errors::InterfaceError;
use nac_tco_core::tco::DeterministicTcoCalculator;
use serde::Serialize;
use serde_json::Value;

use self::scenario::Scenario;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_SCENARIO: u8 = 3;
pub const EXIT_BAD_REQUEST: u8 = 4;
pub const EXIT_NOT_FOUND: u8 = 5;
pub const EXIT_INTERNAL: u8 = 6;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>, data: impl Serialize) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), EXIT_INTERNAL)
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            correlation_id: None,
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            correlation_id: None,
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_interface_error(command: &str, error: InterfaceError) -> Self {
        let (exit_code, correlation_id) = match &error {
            InterfaceError::BadRequest { correlation_id, .. } => (EXIT_BAD_REQUEST, correlation_id),
            InterfaceError::NotFound { correlation_id, .. } => (EXIT_NOT_FOUND, correlation_id),
            InterfaceError::Internal { correlation_id, .. } => (EXIT_INTERNAL, correlation_id),
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error.error_class().to_string()),
            message: format!("{} ({error})", error.user_message()),
            correlation_id: Some(correlation_id.clone()),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// Flags shared by every calculation command.
#[derive(Debug, Clone, Default)]
pub struct ScenarioOptions {
    pub scenario_path: PathBuf,
    pub config_path: Option<PathBuf>,
}

/// Loaded configuration, scenario and a calculator wired from both.
pub struct Workspace {
    pub config: AppConfig,
    pub scenario: Scenario,
    pub calculator: DeterministicTcoCalculator,
}

impl Workspace {
    pub fn load(command: &str, options: &ScenarioOptions) -> Result<Self, CommandResult> {
        let config = AppConfig::load(LoadOptions {
            config_path: options.config_path.clone(),
            require_file: options.config_path.is_some(),
            ..LoadOptions::default()
        })
        .map_err(|error| {
            CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
        })?;

        let scenario = Scenario::load(&options.scenario_path).map_err(|error| {
            CommandResult::failure(command, "scenario_invalid", error.to_string(), EXIT_SCENARIO)
        })?;
        let calculator = scenario.calculator(config.model.assumptions()).map_err(|error| {
            CommandResult::failure(command, "scenario_invalid", error.to_string(), EXIT_SCENARIO)
        })?;

        Ok(Self { config, scenario, calculator })
    }
}

pub fn new_correlation_id() -> String {
    format!("cli-{}", uuid::Uuid::new_v4())
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
