use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::inputs::CalculationInputs;
use crate::sensitivity::SensitivityError;

/// Inputs the sensitivity engine knows how to vary. Each variant is a typed
/// lens over [`CalculationInputs`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityParameter {
    DeviceCount,
    Locations,
    YearsToProject,
    BasePricePerDevice,
    DiscountPct,
    FteAnnualCost,
    FteAllocationPct,
    MaintenancePct,
    RiskReductionPct,
    InsuranceReductionPct,
}

/// How a generated variation is rounded before it is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundingPolicy {
    WholeCount,
    WholePercent,
    Cents,
    WholeCurrency,
}

impl RoundingPolicy {
    pub fn apply(&self, value: Decimal) -> Decimal {
        let places = match self {
            Self::Cents => 2,
            Self::WholeCount | Self::WholePercent | Self::WholeCurrency => 0,
        };
        value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl SensitivityParameter {
    pub const ALL: [Self; 10] = [
        Self::DeviceCount,
        Self::Locations,
        Self::YearsToProject,
        Self::BasePricePerDevice,
        Self::DiscountPct,
        Self::FteAnnualCost,
        Self::FteAllocationPct,
        Self::MaintenancePct,
        Self::RiskReductionPct,
        Self::InsuranceReductionPct,
    ];

    /// Parameters probed by the tornado analysis, in presentation order.
    pub const TORNADO: [Self; 8] = [
        Self::DeviceCount,
        Self::BasePricePerDevice,
        Self::DiscountPct,
        Self::FteAnnualCost,
        Self::FteAllocationPct,
        Self::MaintenancePct,
        Self::RiskReductionPct,
        Self::YearsToProject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeviceCount => "device_count",
            Self::Locations => "locations",
            Self::YearsToProject => "years_to_project",
            Self::BasePricePerDevice => "base_price_per_device",
            Self::DiscountPct => "discount_pct",
            Self::FteAnnualCost => "fte_annual_cost",
            Self::FteAllocationPct => "fte_allocation_pct",
            Self::MaintenancePct => "maintenance_pct",
            Self::RiskReductionPct => "risk_reduction_pct",
            Self::InsuranceReductionPct => "insurance_reduction_pct",
        }
    }

    /// Accepts the snake_case key or the dotted camelCase path used by the
    /// dashboard (`costParameters.fteCost`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "device_count" | "deviceCount" => Some(Self::DeviceCount),
            "locations" => Some(Self::Locations),
            "years_to_project" | "yearsToProject" => Some(Self::YearsToProject),
            "base_price_per_device" | "costParameters.portnoxBasePrice" => {
                Some(Self::BasePricePerDevice)
            }
            "discount_pct" | "costParameters.portnoxDiscount" => Some(Self::DiscountPct),
            "fte_annual_cost" | "costParameters.fteCost" => Some(Self::FteAnnualCost),
            "fte_allocation_pct" | "costParameters.fteAllocation" => Some(Self::FteAllocationPct),
            "maintenance_pct" | "costParameters.maintenancePercentage" => {
                Some(Self::MaintenancePct)
            }
            "risk_reduction_pct" | "costParameters.riskReduction" => Some(Self::RiskReductionPct),
            "insurance_reduction_pct" | "costParameters.insuranceReduction" => {
                Some(Self::InsuranceReductionPct)
            }
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DeviceCount => "Device Count",
            Self::Locations => "Locations",
            Self::YearsToProject => "Analysis Period",
            Self::BasePricePerDevice => "Price per Device",
            Self::DiscountPct => "Volume Discount",
            Self::FteAnnualCost => "FTE Cost",
            Self::FteAllocationPct => "FTE Allocation",
            Self::MaintenancePct => "Maintenance %",
            Self::RiskReductionPct => "Risk Reduction %",
            Self::InsuranceReductionPct => "Insurance Reduction %",
        }
    }

    pub fn rounding(&self) -> RoundingPolicy {
        match self {
            Self::DeviceCount | Self::Locations | Self::YearsToProject => RoundingPolicy::WholeCount,
            Self::BasePricePerDevice => RoundingPolicy::Cents,
            Self::FteAnnualCost => RoundingPolicy::WholeCurrency,
            Self::DiscountPct
            | Self::FteAllocationPct
            | Self::MaintenancePct
            | Self::RiskReductionPct
            | Self::InsuranceReductionPct => RoundingPolicy::WholePercent,
        }
    }

    pub fn read(&self, inputs: &CalculationInputs) -> Decimal {
        let parameters = &inputs.cost_parameters;
        match self {
            Self::DeviceCount => Decimal::from(inputs.device_count),
            Self::Locations => Decimal::from(inputs.locations),
            Self::YearsToProject => Decimal::from(inputs.years_to_project),
            Self::BasePricePerDevice => parameters.base_price_per_device,
            Self::DiscountPct => parameters.discount_pct,
            Self::FteAnnualCost => parameters.fte_annual_cost,
            Self::FteAllocationPct => parameters.fte_allocation_pct,
            Self::MaintenancePct => parameters.maintenance_pct,
            Self::RiskReductionPct => parameters.risk_reduction_pct,
            Self::InsuranceReductionPct => parameters.insurance_reduction_pct,
        }
    }

    /// Writes `value` into `inputs`. Counts must be whole and non-negative;
    /// amounts must be non-negative. Zero counts are left to input validation.
    pub fn apply(&self, inputs: &mut CalculationInputs, value: Decimal) -> Result<(), SensitivityError> {
        if value < Decimal::ZERO {
            return Err(self.invalid_value(value));
        }

        let parameters = &mut inputs.cost_parameters;
        match self {
            Self::DeviceCount => inputs.device_count = self.whole_count(value)?,
            Self::Locations => inputs.locations = self.whole_count(value)?,
            Self::YearsToProject => inputs.years_to_project = self.whole_count(value)?,
            Self::BasePricePerDevice => parameters.base_price_per_device = value,
            Self::DiscountPct => parameters.discount_pct = value,
            Self::FteAnnualCost => parameters.fte_annual_cost = value,
            Self::FteAllocationPct => parameters.fte_allocation_pct = value,
            Self::MaintenancePct => parameters.maintenance_pct = value,
            Self::RiskReductionPct => parameters.risk_reduction_pct = value,
            Self::InsuranceReductionPct => parameters.insurance_reduction_pct = value,
        }

        Ok(())
    }

    pub fn format_value(&self, value: Decimal) -> String {
        match self {
            Self::DeviceCount => group_thousands(value),
            Self::Locations => value.normalize().to_string(),
            Self::YearsToProject => format!("{} years", value.normalize()),
            Self::BasePricePerDevice => format!("${:.2}", value),
            Self::FteAnnualCost => format!("${}", group_thousands(value)),
            Self::DiscountPct
            | Self::FteAllocationPct
            | Self::MaintenancePct
            | Self::RiskReductionPct
            | Self::InsuranceReductionPct => format!("{}%", value.normalize()),
        }
    }

    fn whole_count(&self, value: Decimal) -> Result<u32, SensitivityError> {
        if !value.fract().is_zero() {
            return Err(self.invalid_value(value));
        }
        value.to_u32().ok_or_else(|| self.invalid_value(value))
    }

    fn invalid_value(&self, value: Decimal) -> SensitivityError {
        SensitivityError::InvalidVariationValue { parameter: *self, value }
    }
}

impl fmt::Display for SensitivityParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensitivityParameter {
    type Err = SensitivityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| SensitivityError::UnknownParameter { key: value.to_string() })
    }
}

/// Whole-unit rendering with comma separators (`12500` -> `12,500`).
fn group_thousands(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().normalize().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}
