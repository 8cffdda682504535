//! Cost model engine: one pure function per cost component.
//!
//! Every function takes the vendor, the validated inputs and the model
//! assumptions explicitly; nothing reads shared state. Amounts are whole
//! currency units except the subscription total, which is carried unrounded
//! so sub-dollar per-device prices do not drift across long projections.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::domain::inputs::CalculationInputs;
use crate::domain::results::CostBreakdown;
use crate::domain::vendor::VendorProfile;
use crate::tco::assumptions::{
    complexity_adjustment, discount_size_multiplier, hardware_size_multiplier,
    implementation_size_multiplier, ModelAssumptions,
};
use crate::tco::round_currency;

const MONTHS_PER_YEAR: u32 = 12;

pub fn calculate_costs(
    vendor: &VendorProfile,
    inputs: &CalculationInputs,
    assumptions: &ModelAssumptions,
) -> CostBreakdown {
    let subscription = subscription_cost(vendor, inputs);
    let implementation = implementation_cost(vendor, inputs, assumptions);
    let hardware = hardware_cost(vendor, inputs, assumptions);
    let maintenance = maintenance_cost(vendor, inputs, assumptions, hardware, implementation);
    let operational = operational_cost(vendor, inputs, assumptions);

    CostBreakdown::new(subscription, implementation, hardware, maintenance, operational)
}

/// Discount applied to the per-device price, in percent.
pub fn effective_discount_pct(vendor: &VendorProfile, inputs: &CalculationInputs) -> Decimal {
    if vendor.flagship {
        return inputs.cost_parameters.discount_pct;
    }

    vendor.cost_model.discount_for(inputs.device_count)
        * discount_size_multiplier(inputs.organization_size)
}

/// Monthly per-device price after discount, never below zero.
pub fn effective_unit_price(vendor: &VendorProfile, inputs: &CalculationInputs) -> Decimal {
    let base_price = if vendor.flagship {
        inputs.cost_parameters.base_price_per_device
    } else {
        vendor.cost_model.base_price_per_device
    };
    let discount = effective_discount_pct(vendor, inputs);
    let price = base_price * (Decimal::ONE - discount / Decimal::ONE_HUNDRED);

    price.max(Decimal::ZERO)
}

pub fn subscription_cost(vendor: &VendorProfile, inputs: &CalculationInputs) -> Decimal {
    if !vendor.cost_model.pricing_model.includes_subscription() {
        return Decimal::ZERO;
    }

    let annual = effective_unit_price(vendor, inputs)
        * Decimal::from(inputs.device_count)
        * Decimal::from(MONTHS_PER_YEAR);
    annual * Decimal::from(inputs.years_to_project)
}

pub fn implementation_cost(
    vendor: &VendorProfile,
    inputs: &CalculationInputs,
    assumptions: &ModelAssumptions,
) -> Decimal {
    let cost_model = &vendor.cost_model;
    let services = cost_model.implementation_base_cost
        * implementation_size_multiplier(inputs.organization_size)
        * complexity_adjustment(&inputs.network_requirements)
        * location_spread_factor(inputs.locations, assumptions)
        * (Decimal::ONE + cost_model.service_markup);

    let trainees = (Decimal::from(inputs.locations) * assumptions.trainees_per_location)
        .ceil()
        .max(Decimal::ONE);
    let training = cost_model.training_cost_per_person * trainees;

    round_currency(services + training)
}

pub fn hardware_cost(
    vendor: &VendorProfile,
    inputs: &CalculationInputs,
    assumptions: &ModelAssumptions,
) -> Decimal {
    if vendor.cost_model.deployment_model.is_cloud_only() {
        return Decimal::ZERO;
    }

    let mut cost = vendor.cost_model.hardware_base_cost
        * hardware_size_multiplier(inputs.organization_size)
        * location_footprint_factor(inputs.locations);

    // Refresh cycles compound: year 4 on the base spend, year 5 on the refreshed spend.
    if inputs.years_to_project > 3 {
        cost += cost * assumptions.first_refresh_ratio;
    }
    if inputs.years_to_project > 4 {
        cost += cost * assumptions.second_refresh_ratio;
    }

    round_currency(cost)
}

/// Maintenance on the on-premises footprint. `hardware` and `implementation`
/// are the already rounded component totals.
pub fn maintenance_cost(
    vendor: &VendorProfile,
    inputs: &CalculationInputs,
    assumptions: &ModelAssumptions,
    hardware: Decimal,
    implementation: Decimal,
) -> Decimal {
    if vendor.cost_model.deployment_model.is_cloud_only() {
        return Decimal::ZERO;
    }

    let rate = maintenance_rate_pct(vendor, inputs, assumptions);
    round_currency(
        (hardware + implementation) * rate / Decimal::ONE_HUNDRED
            * Decimal::from(inputs.years_to_project),
    )
}

pub fn maintenance_rate_pct(
    vendor: &VendorProfile,
    inputs: &CalculationInputs,
    assumptions: &ModelAssumptions,
) -> Decimal {
    [vendor.cost_model.maintenance_rate_pct, inputs.cost_parameters.maintenance_pct]
        .into_iter()
        .find(|rate| *rate > Decimal::ZERO)
        .unwrap_or(assumptions.default_maintenance_pct)
}

pub fn operational_cost(
    vendor: &VendorProfile,
    inputs: &CalculationInputs,
    assumptions: &ModelAssumptions,
) -> Decimal {
    let allocation = fte_allocation(vendor, inputs, assumptions);
    let overhead = Decimal::ONE
        + assumptions.ongoing_training_overhead
        + assumptions.incident_management_overhead;

    round_currency(
        inputs.cost_parameters.fte_annual_cost
            * allocation
            * overhead
            * Decimal::from(inputs.years_to_project),
    )
}

/// FTE share the vendor consumes. The flagship vendor takes the user's
/// allocation when one is set.
pub fn fte_allocation(
    vendor: &VendorProfile,
    inputs: &CalculationInputs,
    assumptions: &ModelAssumptions,
) -> Decimal {
    let user_allocation = inputs.cost_parameters.fte_allocation_pct;
    if vendor.flagship && user_allocation > Decimal::ZERO {
        return user_allocation / Decimal::ONE_HUNDRED;
    }

    vendor.resources.fte_estimate.resolve(vendor.cost_model.deployment_model, assumptions)
}

/// `max(1, sqrt(locations) * scaling)`: rollout effort across sites.
fn location_spread_factor(locations: u32, assumptions: &ModelAssumptions) -> Decimal {
    let root = Decimal::from_f64(f64::from(locations).sqrt()).unwrap_or(Decimal::ONE);
    (root * assumptions.location_scaling).max(Decimal::ONE)
}

/// `max(1, log10(locations) + 1)`: appliances needed across sites.
fn location_footprint_factor(locations: u32) -> Decimal {
    let factor = Decimal::from_f64(f64::from(locations).log10() + 1.0).unwrap_or(Decimal::ONE);
    factor.max(Decimal::ONE)
}
