use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryProfile {
    pub name: String,
    #[serde(default)]
    pub primary_frameworks: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub name: String,
    pub average_breach_cost: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceTier {
    pub name: String,
    pub estimated_annual_cost: Decimal,
}

/// Industry, risk and insurance lookups supplied by the presentation layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceTables {
    pub industries: BTreeMap<String, IndustryProfile>,
    pub risk_profiles: BTreeMap<String, RiskProfile>,
    pub insurance_tiers: BTreeMap<String, InsuranceTier>,
}

impl ReferenceTables {
    pub fn industry(&self, key: Option<&str>) -> Option<&IndustryProfile> {
        key.and_then(|key| self.industries.get(key.trim()))
    }

    pub fn risk_profile(&self, key: Option<&str>) -> Option<&RiskProfile> {
        key.and_then(|key| self.risk_profiles.get(key.trim()))
    }

    pub fn insurance_tier(&self, key: Option<&str>) -> Option<&InsuranceTier> {
        key.and_then(|key| self.insurance_tiers.get(key.trim()))
    }
}
