use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::vendor::{VendorId, VendorProfile};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub subscription: Decimal,
    pub implementation: Decimal,
    pub hardware: Decimal,
    pub maintenance: Decimal,
    pub operational: Decimal,
    pub total: Decimal,
}

impl CostBreakdown {
    pub fn new(
        subscription: Decimal,
        implementation: Decimal,
        hardware: Decimal,
        maintenance: Decimal,
        operational: Decimal,
    ) -> Self {
        let total = subscription + implementation + hardware + maintenance + operational;
        Self { subscription, implementation, hardware, maintenance, operational, total }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyCostEntry {
    pub year: u32,
    pub subscription_cost: Decimal,
    pub implementation_cost: Decimal,
    pub hardware_cost: Decimal,
    pub maintenance_cost: Decimal,
    pub operational_cost: Decimal,
    pub total_cost: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessValue {
    pub risk_mitigation: Decimal,
    pub compliance_automation: Decimal,
    pub insurance_premium: Decimal,
    pub productivity_gain: Decimal,
    pub total: Decimal,
    /// Value realized across the projection once the first-year ramp applies.
    pub ramp_adjusted_total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyValueEntry {
    pub year: u32,
    pub risk_mitigation_value: Decimal,
    pub compliance_automation_value: Decimal,
    pub insurance_premium_value: Decimal,
    pub productivity_gain_value: Decimal,
    pub total_value: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiResult {
    pub percentage: Decimal,
    pub payback_period_months: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcoResult {
    pub vendor: VendorProfile,
    pub costs: CostBreakdown,
    pub yearly_breakdown: Vec<YearlyCostEntry>,
    pub business_value: BusinessValue,
    pub value_by_year: Vec<YearlyValueEntry>,
    pub roi: RoiResult,
}

impl TcoResult {
    pub fn vendor_id(&self) -> &VendorId {
        &self.vendor.id
    }

    pub fn total_tco(&self) -> Decimal {
        self.costs.total
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorMetrics {
    pub vendor_id: VendorId,
    pub total_tco: Decimal,
    pub roi_pct: Decimal,
    pub total_value: Decimal,
    pub payback_period_months: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowestTco {
    pub vendor_id: VendorId,
    pub total_tco: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastestPayback {
    pub vendor_id: VendorId,
    pub payback_period_months: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighestValue {
    pub vendor_id: VendorId,
    pub total_value: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparativeAnalysis {
    pub results: Vec<TcoResult>,
    pub metrics: Vec<VendorMetrics>,
    pub missing_vendor_ids: Vec<VendorId>,
    pub lowest_tco: Option<LowestTco>,
    pub fastest_payback: Option<FastestPayback>,
    pub highest_value: Option<HighestValue>,
}

impl ComparativeAnalysis {
    pub fn result_for(&self, vendor_id: &VendorId) -> Option<&TcoResult> {
        self.results.iter().find(|result| result.vendor_id() == vendor_id)
    }
}
