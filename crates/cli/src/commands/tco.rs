use nac_tco_core::domain::vendor::VendorId;
use nac_tco_core::errors::ApplicationError;
use nac_tco_core::tco::TcoCalculator;

use crate::commands::{new_correlation_id, CommandResult, ScenarioOptions, Workspace};

const COMMAND: &str = "tco";

pub fn run(options: &ScenarioOptions, vendor: Option<String>) -> CommandResult {
    let workspace = match Workspace::load(COMMAND, options) {
        Ok(workspace) => workspace,
        Err(failure) => return failure,
    };
    let correlation_id = new_correlation_id();

    let Some(vendor_id) = vendor.map(VendorId::new).or_else(|| workspace.scenario.default_vendor())
    else {
        return CommandResult::from_interface_error(
            COMMAND,
            ApplicationError::VendorNotFound("<none>".to_string()).into_interface(correlation_id),
        );
    };

    let outcome = workspace
        .calculator
        .calculate_vendor_tco(&vendor_id, &workspace.scenario.inputs)
        .map_err(ApplicationError::from)
        .and_then(|result| {
            result.ok_or_else(|| ApplicationError::VendorNotFound(vendor_id.to_string()))
        });

    match outcome {
        Ok(result) => CommandResult::success(
            COMMAND,
            format!("total cost of ownership for `{vendor_id}`"),
            result,
        ),
        Err(error) => {
            CommandResult::from_interface_error(COMMAND, error.into_interface(correlation_id))
        }
    }
}
