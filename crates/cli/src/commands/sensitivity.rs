use std::collections::BTreeMap;

use nac_tco_core::domain::telemetry::SensitivityRunId;
use nac_tco_core::domain::vendor::VendorId;
use nac_tco_core::errors::ApplicationError;
use nac_tco_core::sensitivity::metrics::{sweep_metrics, SweepMetrics};
use nac_tco_core::sensitivity::parameter::SensitivityParameter;
use nac_tco_core::sensitivity::variation::variations_for_inputs;
use nac_tco_core::sensitivity::{
    SensitivityEngine, SensitivityError, SensitivityResult, SensitivityTelemetryContext,
    TracingTelemetrySink,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{
    new_correlation_id, CommandResult, ScenarioOptions, Workspace, EXIT_BAD_REQUEST,
};

const COMMAND: &str = "sensitivity";

#[derive(Debug, Clone, Default)]
pub struct SensitivityArgs {
    pub vendor: Option<String>,
    pub parameters: Vec<String>,
    pub range_pct: Option<Decimal>,
    pub steps: Option<usize>,
    pub secondary: Option<String>,
}

#[derive(Debug, Serialize)]
struct SweepReport {
    analysis: SensitivityResult,
    metrics: Vec<SweepMetrics>,
}

pub fn run(options: &ScenarioOptions, args: SensitivityArgs) -> CommandResult {
    let Workspace { config, scenario, calculator } = match Workspace::load(COMMAND, options) {
        Ok(workspace) => workspace,
        Err(failure) => return failure,
    };
    let correlation_id = new_correlation_id();
    let fail = |error: ApplicationError| {
        CommandResult::from_interface_error(COMMAND, error.into_interface(correlation_id.clone()))
    };

    let range_pct = args.range_pct.unwrap_or(config.sensitivity.default_range_pct);
    let steps = args.steps.unwrap_or(config.sensitivity.default_steps);
    if steps > config.sensitivity.max_steps {
        return CommandResult::failure(
            COMMAND,
            "bad_request",
            format!("steps must not exceed {}", config.sensitivity.max_steps),
            EXIT_BAD_REQUEST,
        );
    }

    let parameters = match parse_parameters(&args.parameters) {
        Ok(parameters) => parameters,
        Err(error) => return fail(error.into()),
    };
    let Some(vendor_id) = args.vendor.map(VendorId::new).or_else(|| scenario.default_vendor())
    else {
        return fail(ApplicationError::VendorNotFound("<none>".to_string()));
    };
    if calculator.catalog().find(&vendor_id).is_none() {
        return fail(ApplicationError::VendorNotFound(vendor_id.to_string()));
    }
    let inputs = &scenario.inputs;
    let engine = SensitivityEngine::new(calculator).with_assumptions(&config.model.assumptions());

    if let Some(secondary) = args.secondary {
        let secondary = match secondary.parse::<SensitivityParameter>() {
            Ok(secondary) => secondary,
            Err(error) => return fail(error.into()),
        };
        let [primary] = parameters.as_slice() else {
            return CommandResult::failure(
                COMMAND,
                "bad_request",
                "a secondary parameter needs exactly one primary parameter",
                EXIT_BAD_REQUEST,
            );
        };
        return match engine
            .run_multi_parameter_analysis(&vendor_id, inputs, *primary, range_pct, steps, secondary)
        {
            Ok(analysis) => CommandResult::success(
                COMMAND,
                format!(
                    "{} swept against {} for `{vendor_id}`",
                    primary.display_name(),
                    secondary.display_name()
                ),
                analysis,
            ),
            Err(error) => fail(error.into()),
        };
    }

    let mut variations = BTreeMap::new();
    for parameter in &parameters {
        match variations_for_inputs(*parameter, inputs, range_pct, steps) {
            Ok(values) => {
                variations.insert(*parameter, values);
            }
            Err(error) => return fail(error.into()),
        }
    }

    let context = SensitivityTelemetryContext {
        correlation_id: correlation_id.clone(),
        run_id: Some(SensitivityRunId(new_correlation_id())),
    };
    let analysis = match engine.run_with_telemetry(
        &vendor_id,
        inputs,
        &variations,
        &context,
        &TracingTelemetrySink,
    ) {
        Ok(analysis) => analysis,
        Err(error) => return fail(error.into()),
    };
    if analysis.baseline.is_none() {
        return fail(ApplicationError::VendorNotFound(vendor_id.to_string()));
    }

    let metrics = analysis.variations.values().map(sweep_metrics).collect();
    CommandResult::success(
        COMMAND,
        format!(
            "{} parameter(s) swept for `{vendor_id}` in {} evaluations",
            analysis.variations.len(),
            analysis.evaluation_count
        ),
        SweepReport { analysis, metrics },
    )
}

/// Defaults to a device-count sweep when no parameter is named.
fn parse_parameters(keys: &[String]) -> Result<Vec<SensitivityParameter>, SensitivityError> {
    if keys.is_empty() {
        return Ok(vec![SensitivityParameter::DeviceCount]);
    }
    keys.iter().map(|key| key.parse::<SensitivityParameter>()).collect()
}
