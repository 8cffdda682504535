use std::fs;
use std::path::{Path, PathBuf};

use nac_tco_core::domain::inputs::CalculationInputs;
use nac_tco_core::domain::reference::ReferenceTables;
use nac_tco_core::domain::vendor::{VendorId, VendorProfile};
use nac_tco_core::errors::DomainError;
use nac_tco_core::tco::assumptions::ModelAssumptions;
use nac_tco_core::tco::catalog::VendorCatalog;
use nac_tco_core::tco::DeterministicTcoCalculator;
use serde::Deserialize;
use thiserror::Error;

/// A vendor catalog, reference tables and one set of calculation inputs,
/// read from a single TOML document.
#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    pub inputs: CalculationInputs,
    #[serde(default)]
    pub reference: ReferenceTables,
    #[serde(default)]
    pub vendors: Vec<VendorProfile>,
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("could not read scenario file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse scenario file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("scenario catalog is invalid: {0}")]
    Catalog(#[from] DomainError),
    #[error("scenario catalog has no vendors")]
    EmptyCatalog,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ScenarioError::ReadFile { path: path.to_path_buf(), source })?;
        Self::parse(&raw, path)
    }

    pub fn parse(raw: &str, path: &Path) -> Result<Self, ScenarioError> {
        toml::from_str::<Scenario>(raw)
            .map_err(|source| ScenarioError::ParseFile { path: path.to_path_buf(), source })
    }

    pub fn catalog(&self) -> Result<VendorCatalog, ScenarioError> {
        if self.vendors.is_empty() {
            return Err(ScenarioError::EmptyCatalog);
        }
        Ok(VendorCatalog::new(self.vendors.clone())?)
    }

    pub fn calculator(
        &self,
        assumptions: ModelAssumptions,
    ) -> Result<DeterministicTcoCalculator, ScenarioError> {
        Ok(DeterministicTcoCalculator::new(self.catalog()?, self.reference.clone(), assumptions))
    }

    /// Explicit vendor, else the flagship, else the first catalog entry.
    pub fn default_vendor(&self) -> Option<VendorId> {
        self.vendors
            .iter()
            .find(|vendor| vendor.flagship)
            .or_else(|| self.vendors.first())
            .map(|vendor| vendor.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rust_decimal::Decimal;

    use super::{Scenario, ScenarioError};

    const MINIMAL: &str = r#"
[inputs]
organization_size = "medium"
device_count = 500
locations = 1
years_to_project = 3

[inputs.cost_parameters]
base_price_per_device = 3
discount_pct = 15
fte_annual_cost = 100000
fte_allocation_pct = 25

[[vendors]]
id = "cisco"
name = "Cisco ISE"

[vendors.cost_model]
pricing_model = "perpetual"
deployment_model = "on_premises"
base_price_per_device = 4.5
hardware_base_cost = 50000

[vendors.resources]
fte_estimate = "1-2 FTE"

[[vendors]]
id = "portnox"
name = "Portnox Cloud"
flagship = true

[vendors.cost_model]
pricing_model = "subscription"
deployment_model = "cloud_only"
"#;

    #[test]
    fn parses_inputs_and_catalog() {
        let scenario = Scenario::parse(MINIMAL, Path::new("inline.toml")).expect("valid scenario");

        assert_eq!(scenario.inputs.device_count, 500);
        assert_eq!(scenario.inputs.cost_parameters.discount_pct, Decimal::from(15));
        assert_eq!(scenario.vendors.len(), 2);
        assert_eq!(scenario.vendors[0].cost_model.base_price_per_device, Decimal::new(45, 1));
        assert_eq!(scenario.default_vendor().map(|id| id.0), Some("portnox".to_string()));
        assert_eq!(scenario.catalog().expect("catalog").len(), 2);
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let raw = MINIMAL.split("[[vendors]]").next().unwrap_or_default();
        let scenario = Scenario::parse(raw, Path::new("inline.toml")).expect("valid inputs");

        assert!(matches!(scenario.catalog(), Err(ScenarioError::EmptyCatalog)));
        assert!(scenario.default_vendor().is_none());
    }

    #[test]
    fn parse_errors_name_the_file() {
        let error = Scenario::parse("[inputs]\ndevice_count = \"many\"", Path::new("broken.toml"))
            .expect_err("invalid scenario");

        assert!(error.to_string().contains("broken.toml"));
    }
}
