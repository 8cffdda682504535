use nac_tco_core::domain::vendor::VendorId;
use nac_tco_core::errors::ApplicationError;
use nac_tco_core::tco::TcoCalculator;

use crate::commands::{new_correlation_id, CommandResult, ScenarioOptions, Workspace};

const COMMAND: &str = "compare";

/// Compares the requested vendors, or the whole scenario catalog when none
/// are named. Unknown vendors are reported in the payload, not as a failure.
pub fn run(options: &ScenarioOptions, vendors: Vec<String>) -> CommandResult {
    let workspace = match Workspace::load(COMMAND, options) {
        Ok(workspace) => workspace,
        Err(failure) => return failure,
    };

    let vendor_ids: Vec<VendorId> = if vendors.is_empty() {
        workspace.calculator.catalog().ids()
    } else {
        vendors.into_iter().map(VendorId::new).collect()
    };

    match workspace.calculator.create_comparative_analysis(&vendor_ids, &workspace.scenario.inputs)
    {
        Ok(analysis) => CommandResult::success(
            COMMAND,
            format!(
                "compared {} vendor(s), {} missing",
                analysis.results.len(),
                analysis.missing_vendor_ids.len()
            ),
            analysis,
        ),
        Err(error) => CommandResult::from_interface_error(
            COMMAND,
            ApplicationError::from(error).into_interface(new_correlation_id()),
        ),
    }
}
