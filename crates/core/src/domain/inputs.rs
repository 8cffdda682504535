use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrganizationSize {
    VerySmall,
    Small,
    Medium,
    Large,
    Enterprise,
}

impl OrganizationSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerySmall => "very-small",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Enterprise => "enterprise",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "very-small" => Some(Self::VerySmall),
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkRequirements {
    pub cloud_integration: bool,
    pub legacy_devices: bool,
    pub byod_support: bool,
    pub iot_support: bool,
    pub wireless_support: bool,
    pub remote_work: bool,
}

/// User-editable cost knobs. Price, discount, FTE allocation and risk
/// reduction apply to the flagship vendor only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostParameters {
    pub base_price_per_device: Decimal,
    pub discount_pct: Decimal,
    pub fte_annual_cost: Decimal,
    pub fte_allocation_pct: Decimal,
    pub maintenance_pct: Decimal,
    pub risk_reduction_pct: Decimal,
    pub insurance_reduction_pct: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInputs {
    pub organization_size: OrganizationSize,
    pub device_count: u32,
    pub locations: u32,
    pub years_to_project: u32,
    #[serde(default)]
    pub network_requirements: NetworkRequirements,
    #[serde(default)]
    pub cost_parameters: CostParameters,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub risk_profile: Option<String>,
    #[serde(default)]
    pub insurance_tier: Option<String>,
}

impl CalculationInputs {
    /// Rejects inputs the cost and value formulas cannot evaluate without
    /// producing division by zero or negative amounts.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.years_to_project == 0 {
            return Err(DomainError::invalid("years_to_project", "must be at least 1"));
        }
        if self.device_count == 0 {
            return Err(DomainError::invalid("device_count", "must be at least 1"));
        }
        if self.locations == 0 {
            return Err(DomainError::invalid("locations", "must be at least 1"));
        }

        let parameters = &self.cost_parameters;
        let amounts = [
            ("cost_parameters.base_price_per_device", parameters.base_price_per_device),
            ("cost_parameters.discount_pct", parameters.discount_pct),
            ("cost_parameters.fte_annual_cost", parameters.fte_annual_cost),
            ("cost_parameters.fte_allocation_pct", parameters.fte_allocation_pct),
            ("cost_parameters.maintenance_pct", parameters.maintenance_pct),
            ("cost_parameters.risk_reduction_pct", parameters.risk_reduction_pct),
            ("cost_parameters.insurance_reduction_pct", parameters.insurance_reduction_pct),
        ];
        for (field, amount) in amounts {
            if amount < Decimal::ZERO {
                return Err(DomainError::invalid(field, "must not be negative"));
            }
        }

        Ok(())
    }

    /// Selected insurance tier, treating an explicit `none` as no selection.
    pub fn selected_insurance_tier(&self) -> Option<&str> {
        self.insurance_tier
            .as_deref()
            .map(str::trim)
            .filter(|tier| !tier.is_empty() && !tier.eq_ignore_ascii_case("none"))
    }
}
