use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::tco::assumptions::ModelAssumptions;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VendorId(pub String);

impl VendorId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    Subscription,
    Perpetual,
    Hybrid,
}

impl PricingModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
            Self::Perpetual => "perpetual",
            Self::Hybrid => "hybrid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "subscription" => Some(Self::Subscription),
            "perpetual" => Some(Self::Perpetual),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }

    /// Hybrid licensing carries a subscription component next to the perpetual one.
    pub fn includes_subscription(&self) -> bool {
        matches!(self, Self::Subscription | Self::Hybrid)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentModel {
    CloudOnly,
    OnPremises,
    Hybrid,
}

impl DeploymentModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CloudOnly => "cloud_only",
            Self::OnPremises => "on_premises",
            Self::Hybrid => "hybrid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cloud_only" => Some(Self::CloudOnly),
            "on_premises" => Some(Self::OnPremises),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }

    pub fn is_cloud_only(&self) -> bool {
        matches!(self, Self::CloudOnly)
    }

    pub fn has_cloud_component(&self) -> bool {
        matches!(self, Self::CloudOnly | Self::Hybrid)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDiscountTier {
    pub min_devices: u32,
    pub discount_pct: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostModel {
    pub pricing_model: PricingModel,
    pub deployment_model: DeploymentModel,
    #[serde(default)]
    pub base_price_per_device: Decimal,
    #[serde(default)]
    pub volume_discount_curve: Vec<VolumeDiscountTier>,
    #[serde(default)]
    pub implementation_base_cost: Decimal,
    #[serde(default)]
    pub maintenance_rate_pct: Decimal,
    #[serde(default = "default_training_cost")]
    pub training_cost_per_person: Decimal,
    #[serde(default)]
    pub hardware_base_cost: Decimal,
    /// Professional-services markup as a fraction (0.10 adds 10%).
    #[serde(default = "default_service_markup")]
    pub service_markup: Decimal,
}

impl CostModel {
    /// Discount of the highest tier whose threshold the device count reaches.
    pub fn discount_for(&self, device_count: u32) -> Decimal {
        self.volume_discount_curve
            .iter()
            .filter(|tier| tier.min_devices <= device_count)
            .max_by_key(|tier| tier.min_devices)
            .map(|tier| tier.discount_pct)
            .unwrap_or(Decimal::ZERO)
    }
}

fn default_training_cost() -> Decimal {
    Decimal::from(1_000)
}

fn default_service_markup() -> Decimal {
    Decimal::new(10, 2)
}

fn default_compliance_coverage() -> Decimal {
    Decimal::from(60)
}

fn default_automation() -> Decimal {
    Decimal::from(50)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityProfile {
    #[serde(default)]
    pub risk_reduction_pct: Decimal,
    #[serde(default = "default_compliance_coverage")]
    pub compliance_coverage_pct: Decimal,
    #[serde(default)]
    pub insurance_impact_pct: Decimal,
    #[serde(default = "default_automation")]
    pub automation_pct: Decimal,
}

impl Default for SecurityProfile {
    fn default() -> Self {
        Self {
            risk_reduction_pct: Decimal::ZERO,
            compliance_coverage_pct: default_compliance_coverage(),
            insurance_impact_pct: Decimal::ZERO,
            automation_pct: default_automation(),
        }
    }
}

/// Staffing effort a vendor needs, as published in vendor collateral.
///
/// Catalog entries carry either a number (`0.5`) or free text such as
/// `"0.1-0.25 FTE"`. Text is reduced to its numeric tokens: one token is taken
/// as-is, two or more are averaged over the first pair, none leaves the
/// estimate unspecified so the deployment-model default applies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FteEstimateRepr", into = "FteEstimateRepr")]
pub enum FteEstimate {
    Fixed(Decimal),
    Range {
        low: Decimal,
        high: Decimal,
    },
    #[default]
    Unspecified,
}

impl FteEstimate {
    pub fn parse(text: &str) -> Self {
        let mut numbers = Vec::new();
        let mut token = String::new();

        for ch in text.chars().chain(std::iter::once(' ')) {
            if ch.is_ascii_digit() || ch == '.' {
                token.push(ch);
                continue;
            }
            if !token.is_empty() {
                if let Ok(value) = token.trim_matches('.').parse::<Decimal>() {
                    numbers.push(value);
                }
                token.clear();
            }
        }

        match numbers.as_slice() {
            [] => Self::Unspecified,
            [single] => Self::Fixed(*single),
            [low, high, ..] => Self::Range { low: *low, high: *high },
        }
    }

    pub fn resolve(&self, deployment: DeploymentModel, assumptions: &ModelAssumptions) -> Decimal {
        match self {
            Self::Fixed(value) => *value,
            Self::Range { low, high } => (*low + *high) / Decimal::TWO,
            Self::Unspecified if deployment.has_cloud_component() => assumptions.cloud_fte_default,
            Self::Unspecified => assumptions.on_premises_fte_default,
        }
    }
}

#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum FteEstimateRepr {
    Amount(Decimal),
    Text(String),
}

impl From<FteEstimateRepr> for FteEstimate {
    fn from(value: FteEstimateRepr) -> Self {
        match value {
            FteEstimateRepr::Amount(amount) => Self::Fixed(amount),
            FteEstimateRepr::Text(text) => Self::parse(&text),
        }
    }
}

impl From<FteEstimate> for FteEstimateRepr {
    fn from(value: FteEstimate) -> Self {
        match value {
            FteEstimate::Fixed(amount) => Self::Amount(amount),
            FteEstimate::Range { low, high } => Self::Text(format!("{low}-{high}")),
            FteEstimate::Unspecified => Self::Text(String::new()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    #[serde(default)]
    pub fte_estimate: FteEstimate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorProfile {
    pub id: VendorId,
    pub name: String,
    /// The flagship vendor is priced from the user-editable cost parameters
    /// instead of catalog values.
    #[serde(default)]
    pub flagship: bool,
    pub cost_model: CostModel,
    #[serde(default)]
    pub security: SecurityProfile,
    #[serde(default)]
    pub resources: ResourceRequirements,
}

impl VendorProfile {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.0.trim().is_empty() {
            return Err(DomainError::invalid("vendor.id", "must not be empty"));
        }

        let cost_model = &self.cost_model;
        if cost_model.pricing_model == PricingModel::Subscription
            && cost_model.hardware_base_cost != Decimal::ZERO
        {
            return Err(DomainError::InvariantViolation(format!(
                "subscription vendor `{}` must not carry a hardware base cost",
                self.id
            )));
        }

        let amounts = [
            ("cost_model.base_price_per_device", cost_model.base_price_per_device),
            ("cost_model.implementation_base_cost", cost_model.implementation_base_cost),
            ("cost_model.maintenance_rate_pct", cost_model.maintenance_rate_pct),
            ("cost_model.training_cost_per_person", cost_model.training_cost_per_person),
            ("cost_model.hardware_base_cost", cost_model.hardware_base_cost),
            ("cost_model.service_markup", cost_model.service_markup),
            ("security.risk_reduction_pct", self.security.risk_reduction_pct),
            ("security.compliance_coverage_pct", self.security.compliance_coverage_pct),
            ("security.insurance_impact_pct", self.security.insurance_impact_pct),
            ("security.automation_pct", self.security.automation_pct),
        ];
        for (field, amount) in amounts {
            if amount < Decimal::ZERO {
                return Err(DomainError::invalid(
                    format!("vendor `{}` {field}", self.id),
                    "must not be negative",
                ));
            }
        }

        if cost_model.volume_discount_curve.iter().any(|tier| tier.discount_pct < Decimal::ZERO) {
            return Err(DomainError::invalid(
                format!("vendor `{}` cost_model.volume_discount_curve", self.id),
                "discounts must not be negative",
            ));
        }

        Ok(())
    }
}
