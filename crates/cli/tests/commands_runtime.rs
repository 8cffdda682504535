use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use nac_tco_cli::commands::sensitivity::SensitivityArgs;
use nac_tco_cli::commands::{compare, config, sensitivity, tco, tornado, ScenarioOptions};
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn tco_defaults_to_flagship_vendor() {
    with_env(&[], || {
        let result = tco::run(&demo_options(), None);
        assert_eq!(result.exit_code, 0, "expected successful tco run: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "tco");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["data"]["vendor"]["id"], "portnox");
        assert_eq!(decimal(&payload["data"]["costs"]["subscription"]), Decimal::from(45_900));
        assert_eq!(decimal(&payload["data"]["costs"]["operational"]), Decimal::from(86_250));
        assert_eq!(decimal(&payload["data"]["costs"]["total"]), Decimal::from(132_150));
        assert_eq!(payload["data"]["yearly_breakdown"].as_array().map(Vec::len), Some(3));
    });
}

#[test]
fn tco_reports_unknown_vendor_as_not_found() {
    with_env(&[], || {
        let result = tco::run(&demo_options(), Some("ghost".to_string()));
        assert_eq!(result.exit_code, 5, "expected not-found exit code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "not_found");
        assert!(payload["correlation_id"].as_str().is_some_and(|id| id.starts_with("cli-")));
    });
}

#[test]
fn compare_ranks_whole_catalog_and_lists_missing_vendors() {
    with_env(&[], || {
        let result = compare::run(&demo_options(), Vec::new());
        assert_eq!(result.exit_code, 0, "expected successful comparison: {}", result.output);

        let payload = parse_payload(&result.output);
        let data = &payload["data"];
        assert_eq!(data["results"].as_array().map(Vec::len), Some(3));
        assert_eq!(data["metrics"][0]["vendor_id"], "cisco");
        assert_eq!(data["lowest_tco"]["vendor_id"], "portnox");

        let partial = compare::run(
            &demo_options(),
            vec!["portnox".to_string(), "ghost".to_string()],
        );
        let payload = parse_payload(&partial.output);
        assert_eq!(partial.exit_code, 0);
        assert_eq!(payload["data"]["missing_vendor_ids"][0], "ghost");
    });
}

#[test]
fn sensitivity_sweep_reports_points_and_metrics() {
    with_env(&[], || {
        let result = sensitivity::run(
            &demo_options(),
            SensitivityArgs {
                parameters: vec!["fte_annual_cost".to_string()],
                range_pct: Some(Decimal::from(20)),
                steps: Some(3),
                ..SensitivityArgs::default()
            },
        );
        assert_eq!(result.exit_code, 0, "expected successful sweep: {}", result.output);

        let payload = parse_payload(&result.output);
        let analysis = &payload["data"]["analysis"];
        assert_eq!(analysis["evaluation_count"], 4);
        let points = &analysis["variations"]["fte_annual_cost"]["points"];
        assert_eq!(decimal(&points[0]["value"]), Decimal::from(80_000));
        assert_eq!(decimal(&points[2]["value"]), Decimal::from(120_000));
        assert_eq!(payload["data"]["metrics"][0]["breakeven"]["status"], "unavailable");
    });
}

#[test]
fn sensitivity_uses_configured_defaults_and_limits() {
    with_env(&[("NAC_TCO_SENSITIVITY_DEFAULT_STEPS", "4")], || {
        let result = sensitivity::run(&demo_options(), SensitivityArgs::default());
        assert_eq!(result.exit_code, 0, "expected successful sweep: {}", result.output);
        let payload = parse_payload(&result.output);
        let points = &payload["data"]["analysis"]["variations"]["device_count"]["points"];
        assert_eq!(points.as_array().map(Vec::len), Some(4));

        let too_many = sensitivity::run(
            &demo_options(),
            SensitivityArgs { steps: Some(99), ..SensitivityArgs::default() },
        );
        assert_eq!(too_many.exit_code, 4);
        assert_eq!(parse_payload(&too_many.output)["error_class"], "bad_request");
    });
}

#[test]
fn sensitivity_rejects_unknown_parameter() {
    with_env(&[], || {
        let result = sensitivity::run(
            &demo_options(),
            SensitivityArgs {
                parameters: vec!["colour".to_string()],
                ..SensitivityArgs::default()
            },
        );
        assert_eq!(result.exit_code, 4);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "bad_request");
        assert!(payload["message"].as_str().is_some_and(|message| message.contains("colour")));
    });
}

#[test]
fn multi_parameter_sweep_labels_each_series() {
    with_env(&[], || {
        let result = sensitivity::run(
            &demo_options(),
            SensitivityArgs {
                parameters: vec!["device_count".to_string()],
                steps: Some(3),
                secondary: Some("fte_annual_cost".to_string()),
                ..SensitivityArgs::default()
            },
        );
        assert_eq!(result.exit_code, 0, "expected successful analysis: {}", result.output);

        let payload = parse_payload(&result.output);
        let series = &payload["data"]["series"];
        assert_eq!(series.as_array().map(Vec::len), Some(3));
        assert_eq!(series[0]["label"], "FTE Cost -30%");
        assert_eq!(series[1]["label"], "FTE Cost (base)");
        assert_eq!(series[2]["label"], "FTE Cost +30%");
    });
}

#[test]
fn tornado_ranks_every_probe_parameter() {
    with_env(&[], || {
        let result = tornado::run(&demo_options(), Some("portnox".to_string()), None);
        assert_eq!(result.exit_code, 0, "expected successful tornado: {}", result.output);

        let payload = parse_payload(&result.output);
        let data = &payload["data"];
        assert_eq!(decimal(&data["baseline_tco"]), Decimal::from(132_150));
        assert_eq!(decimal(&data["range_pct"]), Decimal::from(20));
        assert_eq!(data["entries"].as_array().map(Vec::len), Some(8));
        assert!(data["most_sensitive"].is_string());
    });
}

#[test]
fn tornado_rejects_out_of_range_offset() {
    with_env(&[], || {
        let result = tornado::run(&demo_options(), None, Some(Decimal::from(100)));
        assert_eq!(result.exit_code, 4);
        assert_eq!(parse_payload(&result.output)["error_class"], "bad_request");
    });
}

#[test]
fn invalid_config_fails_before_scenario_is_read() {
    with_env(&[("NAC_TCO_MODEL_ANNUAL_BREACH_PROBABILITY", "2")], || {
        let result = tco::run(&demo_options(), None);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn missing_scenario_file_is_reported() {
    with_env(&[], || {
        let options = ScenarioOptions {
            scenario_path: PathBuf::from("does-not-exist.toml"),
            config_path: None,
        };
        let result = compare::run(&options, Vec::new());
        assert_eq!(result.exit_code, 3);
        assert_eq!(parse_payload(&result.output)["error_class"], "scenario_invalid");
    });
}

#[test]
fn config_attributes_values_to_their_source() {
    with_env(&[("NAC_TCO_LOG_LEVEL", "debug")], || {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nac-tco.toml");
        fs::write(&path, "[model]\ntornado_range_pct = 15\n").expect("write config");

        let output = config::run(Some(path.clone()));
        assert!(output.contains("- model.tornado_range_pct = 15 (source: file ("));
        assert!(output.contains("- logging.level = debug (source: env (NAC_TCO_LOG_LEVEL))"));
        assert!(output.contains("- sensitivity.default_steps = 5 (source: default)"));
    });
}

fn demo_options() -> ScenarioOptions {
    ScenarioOptions {
        scenario_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../scenarios/demo.toml"),
        config_path: None,
    }
}

/// Decimals serialize as strings and keep their scale, so compare by value.
fn decimal(value: &Value) -> Decimal {
    value.as_str().and_then(|raw| raw.parse().ok()).expect("decimal field should be a string")
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "NAC_TCO_MODEL_ANNUAL_BREACH_PROBABILITY",
        "NAC_TCO_MODEL_FIRST_YEAR_VALUE_RAMP",
        "NAC_TCO_MODEL_TORNADO_RANGE_PCT",
        "NAC_TCO_MODEL_DEFAULT_BREACH_COST",
        "NAC_TCO_MODEL_DEFAULT_MAINTENANCE_PCT",
        "NAC_TCO_SENSITIVITY_DEFAULT_RANGE_PCT",
        "NAC_TCO_SENSITIVITY_DEFAULT_STEPS",
        "NAC_TCO_SENSITIVITY_MAX_STEPS",
        "NAC_TCO_LOGGING_LEVEL",
        "NAC_TCO_LOGGING_FORMAT",
        "NAC_TCO_LOG_LEVEL",
        "NAC_TCO_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
