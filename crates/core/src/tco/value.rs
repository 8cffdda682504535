//! Value model engine: monetized business value a vendor delivers over the
//! projection period.

use rust_decimal::Decimal;

use crate::domain::inputs::CalculationInputs;
use crate::domain::reference::ReferenceTables;
use crate::domain::results::{BusinessValue, YearlyValueEntry};
use crate::domain::vendor::VendorProfile;
use crate::tco::assumptions::{industry_complexity, ModelAssumptions};
use crate::tco::round_currency;

/// Business value totals together with their per-year distribution.
pub fn calculate_business_value(
    vendor: &VendorProfile,
    inputs: &CalculationInputs,
    reference: &ReferenceTables,
    assumptions: &ModelAssumptions,
) -> (BusinessValue, Vec<YearlyValueEntry>) {
    let risk_mitigation = risk_mitigation_value(vendor, inputs, reference, assumptions);
    let compliance_automation = compliance_automation_value(vendor, inputs, reference, assumptions);
    let insurance_premium = insurance_premium_value(vendor, inputs, reference);
    let productivity_gain = productivity_gain_value(vendor, inputs, assumptions);

    let mut value = BusinessValue {
        risk_mitigation,
        compliance_automation,
        insurance_premium,
        productivity_gain,
        total: risk_mitigation + compliance_automation + insurance_premium + productivity_gain,
        ramp_adjusted_total: Decimal::ZERO,
    };
    let by_year = value_by_year(&value, inputs.years_to_project, assumptions);
    value.ramp_adjusted_total = by_year.iter().map(|entry| entry.total_value).sum();

    (value, by_year)
}

pub fn risk_mitigation_value(
    vendor: &VendorProfile,
    inputs: &CalculationInputs,
    reference: &ReferenceTables,
    assumptions: &ModelAssumptions,
) -> Decimal {
    let breach_cost = reference
        .risk_profile(inputs.risk_profile.as_deref())
        .map(|profile| profile.average_breach_cost)
        .unwrap_or(assumptions.default_breach_cost);

    round_currency(
        breach_cost
            * assumptions.annual_breach_probability
            * risk_reduction_pct(vendor, inputs)
            / Decimal::ONE_HUNDRED
            * Decimal::from(inputs.years_to_project),
    )
}

/// The flagship vendor takes the user's risk reduction when one is set.
pub fn risk_reduction_pct(vendor: &VendorProfile, inputs: &CalculationInputs) -> Decimal {
    let user_reduction = inputs.cost_parameters.risk_reduction_pct;
    if vendor.flagship && user_reduction > Decimal::ZERO {
        user_reduction
    } else {
        vendor.security.risk_reduction_pct
    }
}

pub fn compliance_automation_value(
    vendor: &VendorProfile,
    inputs: &CalculationInputs,
    reference: &ReferenceTables,
    assumptions: &ModelAssumptions,
) -> Decimal {
    let complexity = reference
        .industry(inputs.industry.as_deref())
        .map(|industry| industry_complexity(industry.primary_frameworks.len()))
        .unwrap_or(Decimal::ONE);
    let base = inputs.cost_parameters.fte_annual_cost * assumptions.compliance_fte_share;

    round_currency(
        base * complexity * vendor.security.compliance_coverage_pct / Decimal::ONE_HUNDRED
            * Decimal::from(inputs.years_to_project),
    )
}

pub fn insurance_premium_value(
    vendor: &VendorProfile,
    inputs: &CalculationInputs,
    reference: &ReferenceTables,
) -> Decimal {
    let Some(tier) = inputs.selected_insurance_tier() else {
        return Decimal::ZERO;
    };

    let premium = reference
        .insurance_tier(Some(tier))
        .map(|tier| tier.estimated_annual_cost)
        .unwrap_or(Decimal::ZERO);
    let impact = if vendor.security.insurance_impact_pct > Decimal::ZERO {
        vendor.security.insurance_impact_pct
    } else {
        inputs.cost_parameters.insurance_reduction_pct
    };

    round_currency(
        premium * impact / Decimal::ONE_HUNDRED * Decimal::from(inputs.years_to_project),
    )
}

pub fn productivity_gain_value(
    vendor: &VendorProfile,
    inputs: &CalculationInputs,
    assumptions: &ModelAssumptions,
) -> Decimal {
    let admin_load = Decimal::from(inputs.device_count) / assumptions.devices_per_admin_fte;

    round_currency(
        inputs.cost_parameters.fte_annual_cost * admin_load * vendor.security.automation_pct
            / Decimal::ONE_HUNDRED
            * Decimal::from(inputs.years_to_project),
    )
}

/// Even split across years with the first year scaled down by the adoption ramp.
pub fn value_by_year(
    value: &BusinessValue,
    years: u32,
    assumptions: &ModelAssumptions,
) -> Vec<YearlyValueEntry> {
    if years == 0 {
        return Vec::new();
    }

    let divisor = Decimal::from(years);
    (1..=years)
        .map(|year| {
            let ramp = if year == 1 { assumptions.first_year_value_ramp } else { Decimal::ONE };
            let share = |component: Decimal| component / divisor * ramp;

            let risk_mitigation_value = share(value.risk_mitigation);
            let compliance_automation_value = share(value.compliance_automation);
            let insurance_premium_value = share(value.insurance_premium);
            let productivity_gain_value = share(value.productivity_gain);

            YearlyValueEntry {
                year,
                risk_mitigation_value,
                compliance_automation_value,
                insurance_premium_value,
                productivity_gain_value,
                total_value: risk_mitigation_value
                    + compliance_automation_value
                    + insurance_premium_value
                    + productivity_gain_value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;

    use crate::domain::inputs::{
        CalculationInputs, CostParameters, NetworkRequirements, OrganizationSize,
    };
    use crate::domain::reference::{IndustryProfile, InsuranceTier, ReferenceTables, RiskProfile};
    use crate::domain::results::BusinessValue;
    use crate::domain::vendor::{
        CostModel, DeploymentModel, PricingModel, SecurityProfile, VendorId, VendorProfile,
    };
    use crate::tco::assumptions::ModelAssumptions;

    use super::{
        calculate_business_value, compliance_automation_value, insurance_premium_value,
        productivity_gain_value, risk_mitigation_value, value_by_year,
    };

    #[test]
    fn risk_value_uses_profile_breach_cost_or_default() {
        let assumptions = ModelAssumptions::default();
        let mut scenario = inputs();

        // 2_000_000 * 0.10 * 30% * 3
        assert_eq!(
            risk_mitigation_value(&vendor(false), &scenario, &reference(), &assumptions),
            Decimal::from(180_000)
        );

        scenario.risk_profile = Some("unknown".to_string());
        // 4_200_000 * 0.10 * 30% * 3
        assert_eq!(
            risk_mitigation_value(&vendor(false), &scenario, &reference(), &assumptions),
            Decimal::from(378_000)
        );
    }

    #[test]
    fn flagship_risk_reduction_comes_from_cost_parameters() {
        let assumptions = ModelAssumptions::default();
        let mut scenario = inputs();
        scenario.cost_parameters.risk_reduction_pct = Decimal::from(50);

        assert_eq!(
            risk_mitigation_value(&vendor(true), &scenario, &reference(), &assumptions),
            Decimal::from(300_000)
        );
        assert_eq!(
            risk_mitigation_value(&vendor(false), &scenario, &reference(), &assumptions),
            Decimal::from(180_000)
        );
    }

    #[test]
    fn compliance_value_scales_with_industry_frameworks() {
        let assumptions = ModelAssumptions::default();
        let mut scenario = inputs();

        // 100_000 * 0.5 * min(2, 0.5 + 0.25 * 3) * 80% * 3
        assert_eq!(
            compliance_automation_value(&vendor(false), &scenario, &reference(), &assumptions),
            Decimal::from(150_000)
        );

        scenario.industry = None;
        assert_eq!(
            compliance_automation_value(&vendor(false), &scenario, &reference(), &assumptions),
            Decimal::from(120_000)
        );
    }

    #[test]
    fn insurance_value_is_zero_without_a_tier() {
        let mut scenario = inputs();
        assert_eq!(insurance_premium_value(&vendor(false), &scenario, &reference()), Decimal::ZERO);

        scenario.insurance_tier = Some("none".to_string());
        assert_eq!(insurance_premium_value(&vendor(false), &scenario, &reference()), Decimal::ZERO);

        scenario.insurance_tier = Some("standard".to_string());
        // 50_000 * 15% * 3
        assert_eq!(
            insurance_premium_value(&vendor(false), &scenario, &reference()),
            Decimal::from(22_500)
        );

        scenario.insurance_tier = Some("platinum".to_string());
        assert_eq!(insurance_premium_value(&vendor(false), &scenario, &reference()), Decimal::ZERO);
    }

    #[test]
    fn insurance_value_falls_back_to_user_reduction() {
        let mut scenario = inputs();
        scenario.insurance_tier = Some("standard".to_string());
        scenario.cost_parameters.insurance_reduction_pct = Decimal::from(10);
        let mut catalog_vendor = vendor(false);
        catalog_vendor.security.insurance_impact_pct = Decimal::ZERO;

        assert_eq!(
            insurance_premium_value(&catalog_vendor, &scenario, &reference()),
            Decimal::from(15_000)
        );
    }

    #[test]
    fn productivity_value_tracks_admin_load() {
        // 100_000 * (2_500 / 5_000) * 40% * 3
        assert_eq!(
            productivity_gain_value(&vendor(false), &inputs(), &ModelAssumptions::default()),
            Decimal::from(60_000)
        );
    }

    #[test]
    fn first_year_value_is_ramped() {
        let value = BusinessValue {
            risk_mitigation: Decimal::from(300),
            compliance_automation: Decimal::from(150),
            insurance_premium: Decimal::ZERO,
            productivity_gain: Decimal::from(150),
            total: Decimal::from(600),
            ramp_adjusted_total: Decimal::ZERO,
        };
        let by_year = value_by_year(&value, 3, &ModelAssumptions::default());

        assert_eq!(by_year.len(), 3);
        assert_eq!(by_year[0].year, 1);
        assert_eq!(by_year[0].risk_mitigation_value, Decimal::from(70));
        assert_eq!(by_year[0].total_value, Decimal::from(140));
        assert_eq!(by_year[1].total_value, Decimal::from(200));
        assert_eq!(by_year[2].total_value, Decimal::from(200));
    }

    #[test]
    fn business_value_reports_total_and_ramp_adjusted_total() {
        let (value, by_year) = calculate_business_value(
            &vendor(false),
            &inputs(),
            &reference(),
            &ModelAssumptions::default(),
        );

        assert_eq!(value.total, Decimal::from(390_000));
        assert_eq!(by_year.len(), 3);
        // Year one keeps 70% of a third of the total.
        assert_eq!(value.ramp_adjusted_total, Decimal::from(351_000));
    }

    fn inputs() -> CalculationInputs {
        CalculationInputs {
            organization_size: OrganizationSize::Medium,
            device_count: 2_500,
            locations: 2,
            years_to_project: 3,
            network_requirements: NetworkRequirements::default(),
            cost_parameters: CostParameters {
                base_price_per_device: Decimal::from(3),
                discount_pct: Decimal::ZERO,
                fte_annual_cost: Decimal::from(100_000),
                fte_allocation_pct: Decimal::ZERO,
                maintenance_pct: Decimal::ZERO,
                risk_reduction_pct: Decimal::ZERO,
                insurance_reduction_pct: Decimal::ZERO,
            },
            industry: Some("healthcare".to_string()),
            risk_profile: Some("standard".to_string()),
            insurance_tier: None,
        }
    }

    fn vendor(flagship: bool) -> VendorProfile {
        VendorProfile {
            id: VendorId::new("vendor"),
            name: "Vendor".to_string(),
            flagship,
            cost_model: CostModel {
                pricing_model: PricingModel::Subscription,
                deployment_model: DeploymentModel::CloudOnly,
                base_price_per_device: Decimal::from(3),
                volume_discount_curve: Vec::new(),
                implementation_base_cost: Decimal::ZERO,
                maintenance_rate_pct: Decimal::ZERO,
                training_cost_per_person: Decimal::ZERO,
                hardware_base_cost: Decimal::ZERO,
                service_markup: Decimal::ZERO,
            },
            security: SecurityProfile {
                risk_reduction_pct: Decimal::from(30),
                compliance_coverage_pct: Decimal::from(80),
                insurance_impact_pct: Decimal::from(15),
                automation_pct: Decimal::from(40),
            },
            resources: Default::default(),
        }
    }

    fn reference() -> ReferenceTables {
        let mut industries = BTreeMap::new();
        industries.insert(
            "healthcare".to_string(),
            IndustryProfile {
                name: "Healthcare".to_string(),
                primary_frameworks: vec![
                    "hipaa".to_string(),
                    "pci-dss".to_string(),
                    "nist-csf".to_string(),
                ],
            },
        );
        let mut risk_profiles = BTreeMap::new();
        risk_profiles.insert(
            "standard".to_string(),
            RiskProfile {
                name: "Standard".to_string(),
                average_breach_cost: Decimal::from(2_000_000),
            },
        );
        let mut insurance_tiers = BTreeMap::new();
        insurance_tiers.insert(
            "standard".to_string(),
            InsuranceTier {
                name: "Standard".to_string(),
                estimated_annual_cost: Decimal::from(50_000),
            },
        );

        ReferenceTables { industries, risk_profiles, insurance_tiers }
    }
}
