use nac_tco_core::domain::vendor::VendorId;
use nac_tco_core::errors::ApplicationError;
use nac_tco_core::sensitivity::SensitivityEngine;
use rust_decimal::Decimal;

use crate::commands::{
    new_correlation_id, CommandResult, ScenarioOptions, Workspace, EXIT_BAD_REQUEST,
};

const COMMAND: &str = "tornado";

pub fn run(
    options: &ScenarioOptions,
    vendor: Option<String>,
    range_pct: Option<Decimal>,
) -> CommandResult {
    let Workspace { config, scenario, calculator } = match Workspace::load(COMMAND, options) {
        Ok(workspace) => workspace,
        Err(failure) => return failure,
    };
    let correlation_id = new_correlation_id();

    let mut assumptions = config.model.assumptions();
    if let Some(range_pct) = range_pct {
        if range_pct <= Decimal::ZERO || range_pct >= Decimal::ONE_HUNDRED {
            return CommandResult::failure(
                COMMAND,
                "bad_request",
                "tornado range must be greater than 0 and less than 100",
                EXIT_BAD_REQUEST,
            );
        }
        assumptions.tornado_range_pct = range_pct;
    }

    let Some(vendor_id) = vendor.map(VendorId::new).or_else(|| scenario.default_vendor()) else {
        return CommandResult::from_interface_error(
            COMMAND,
            ApplicationError::VendorNotFound("<none>".to_string()).into_interface(correlation_id),
        );
    };

    let engine = SensitivityEngine::new(calculator).with_assumptions(&assumptions);
    let outcome = engine
        .run_tornado_analysis(&vendor_id, &scenario.inputs)
        .map_err(ApplicationError::from)
        .and_then(|analysis| {
            analysis.ok_or_else(|| ApplicationError::VendorNotFound(vendor_id.to_string()))
        });

    match outcome {
        Ok(analysis) => {
            let message = match analysis.most_sensitive {
                Some(parameter) => format!(
                    "{} is the most sensitive parameter for `{vendor_id}`",
                    parameter.display_name()
                ),
                None => format!("no parameter moves the TCO of `{vendor_id}`"),
            };
            CommandResult::success(COMMAND, message, analysis)
        }
        Err(error) => {
            CommandResult::from_interface_error(COMMAND, error.into_interface(correlation_id))
        }
    }
}
