//! Modeling assumptions behind every cost, value and sensitivity formula.
//!
//! Scalar assumptions live on [`ModelAssumptions`] so they can be tuned from
//! configuration; the lookup tables keyed by organization size or network
//! requirement are fixed and exposed as functions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::inputs::{NetworkRequirements, OrganizationSize};

/// ROI a device-count sweep must exceed to count as the breakeven point.
pub const DEVICE_BREAKEVEN_ROI_PCT: Decimal = Decimal::ZERO;
/// ROI a price sweep must stay above to count as the breakeven price.
pub const PRICE_BREAKEVEN_ROI_PCT: Decimal = Decimal::ONE_HUNDRED;

/// Exclusive upper bounds of the Low, Medium-Low, Medium and Medium-High
/// elasticity bands; anything above the last is High.
pub const ELASTICITY_BAND_LIMITS: [Decimal; 4] = [
    Decimal::from_parts(5, 0, 0, false, 1),
    Decimal::from_parts(10, 0, 0, false, 1),
    Decimal::from_parts(15, 0, 0, false, 1),
    Decimal::from_parts(20, 0, 0, false, 1),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAssumptions {
    pub annual_breach_probability: Decimal,
    pub first_year_value_ramp: Decimal,
    pub tornado_range_pct: Decimal,
    pub multi_parameter_range_pct: Decimal,
    pub default_breach_cost: Decimal,
    pub default_maintenance_pct: Decimal,
    pub ongoing_training_overhead: Decimal,
    pub incident_management_overhead: Decimal,
    pub compliance_fte_share: Decimal,
    pub devices_per_admin_fte: Decimal,
    pub cloud_fte_default: Decimal,
    pub on_premises_fte_default: Decimal,
    pub first_refresh_ratio: Decimal,
    pub second_refresh_ratio: Decimal,
    pub trainees_per_location: Decimal,
    pub location_scaling: Decimal,
}

impl Default for ModelAssumptions {
    fn default() -> Self {
        Self {
            annual_breach_probability: Decimal::new(10, 2),
            first_year_value_ramp: Decimal::new(70, 2),
            tornado_range_pct: Decimal::from(20),
            multi_parameter_range_pct: Decimal::from(30),
            default_breach_cost: Decimal::from(4_200_000),
            default_maintenance_pct: Decimal::from(18),
            ongoing_training_overhead: Decimal::new(5, 2),
            incident_management_overhead: Decimal::new(10, 2),
            compliance_fte_share: Decimal::new(5, 1),
            devices_per_admin_fte: Decimal::from(5_000),
            cloud_fte_default: Decimal::new(25, 2),
            on_premises_fte_default: Decimal::ONE,
            first_refresh_ratio: Decimal::new(4, 1),
            second_refresh_ratio: Decimal::new(2, 1),
            trainees_per_location: Decimal::new(5, 1),
            location_scaling: Decimal::new(5, 1),
        }
    }
}

/// Larger organizations negotiate proportionally larger catalog discounts.
pub fn discount_size_multiplier(size: OrganizationSize) -> Decimal {
    match size {
        OrganizationSize::VerySmall => Decimal::new(5, 1),
        OrganizationSize::Small => Decimal::new(8, 1),
        OrganizationSize::Medium => Decimal::ONE,
        OrganizationSize::Large => Decimal::new(12, 1),
        OrganizationSize::Enterprise => Decimal::new(15, 1),
    }
}

pub fn implementation_size_multiplier(size: OrganizationSize) -> Decimal {
    match size {
        OrganizationSize::VerySmall => Decimal::new(6, 1),
        OrganizationSize::Small => Decimal::ONE,
        OrganizationSize::Medium => Decimal::TWO,
        OrganizationSize::Large => Decimal::new(35, 1),
        OrganizationSize::Enterprise => Decimal::from(5),
    }
}

pub fn hardware_size_multiplier(size: OrganizationSize) -> Decimal {
    match size {
        OrganizationSize::VerySmall => Decimal::new(5, 1),
        OrganizationSize::Small => Decimal::ONE,
        OrganizationSize::Medium => Decimal::new(25, 1),
        OrganizationSize::Large => Decimal::from(4),
        OrganizationSize::Enterprise => Decimal::from(6),
    }
}

/// 1.0 plus an additive bonus for every active network requirement.
pub fn complexity_adjustment(requirements: &NetworkRequirements) -> Decimal {
    let factors = [
        (requirements.cloud_integration, Decimal::new(15, 2)),
        (requirements.legacy_devices, Decimal::new(20, 2)),
        (requirements.byod_support, Decimal::new(10, 2)),
        (requirements.iot_support, Decimal::new(25, 2)),
        (requirements.wireless_support, Decimal::new(10, 2)),
        (requirements.remote_work, Decimal::new(10, 2)),
    ];

    factors
        .iter()
        .filter(|(active, _)| *active)
        .fold(Decimal::ONE, |adjustment, (_, bonus)| adjustment + bonus)
}

/// Compliance workload grows with the number of primary frameworks, capped at 2x.
pub fn industry_complexity(primary_framework_count: usize) -> Decimal {
    let scaled = Decimal::new(5, 1) + Decimal::new(25, 2) * Decimal::from(primary_framework_count);
    scaled.min(Decimal::TWO)
}
