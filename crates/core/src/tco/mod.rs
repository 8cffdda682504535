pub mod aggregate;
pub mod assumptions;
pub mod catalog;
pub mod costs;
pub mod value;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::domain::inputs::CalculationInputs;
use crate::domain::reference::ReferenceTables;
use crate::domain::results::{ComparativeAnalysis, TcoResult};
use crate::domain::vendor::{VendorId, VendorProfile};
use crate::errors::DomainError;

use self::{assumptions::ModelAssumptions, catalog::VendorCatalog};

/// Whole currency units, halves away from zero.
pub(crate) fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

pub trait TcoCalculator: Send + Sync {
    /// Full cost, value and ROI result for one vendor. Inputs are validated
    /// first; an unknown vendor is `Ok(None)`, not an error.
    fn calculate_vendor_tco(
        &self,
        vendor_id: &VendorId,
        inputs: &CalculationInputs,
    ) -> Result<Option<TcoResult>, DomainError>;

    fn create_comparative_analysis(
        &self,
        vendor_ids: &[VendorId],
        inputs: &CalculationInputs,
    ) -> Result<ComparativeAnalysis, DomainError> {
        inputs.validate()?;

        let mut results = Vec::with_capacity(vendor_ids.len());
        let mut missing = Vec::new();
        for vendor_id in vendor_ids {
            match self.calculate_vendor_tco(vendor_id, inputs)? {
                Some(result) => results.push(result),
                None => missing.push(vendor_id.clone()),
            }
        }

        Ok(aggregate::compare_results(results, missing))
    }
}

pub struct DeterministicTcoCalculator {
    catalog: VendorCatalog,
    reference: ReferenceTables,
    assumptions: ModelAssumptions,
}

impl DeterministicTcoCalculator {
    pub fn new(
        catalog: VendorCatalog,
        reference: ReferenceTables,
        assumptions: ModelAssumptions,
    ) -> Self {
        Self { catalog, reference, assumptions }
    }

    pub fn catalog(&self) -> &VendorCatalog {
        &self.catalog
    }

    pub fn assumptions(&self) -> &ModelAssumptions {
        &self.assumptions
    }

    /// Pipeline for a vendor already resolved from the catalog.
    pub fn evaluate(&self, vendor: &VendorProfile, inputs: &CalculationInputs) -> TcoResult {
        let years = inputs.years_to_project;
        let costs = costs::calculate_costs(vendor, inputs, &self.assumptions);
        let yearly_breakdown = aggregate::yearly_cost_breakdown(&costs, years);
        let (business_value, value_by_year) =
            value::calculate_business_value(vendor, inputs, &self.reference, &self.assumptions);
        let roi = aggregate::calculate_roi(costs.total, &business_value, years);

        TcoResult {
            vendor: vendor.clone(),
            costs,
            yearly_breakdown,
            business_value,
            value_by_year,
            roi,
        }
    }
}

impl TcoCalculator for DeterministicTcoCalculator {
    fn calculate_vendor_tco(
        &self,
        vendor_id: &VendorId,
        inputs: &CalculationInputs,
    ) -> Result<Option<TcoResult>, DomainError> {
        inputs.validate()?;

        let Some(vendor) = self.catalog.find(vendor_id) else {
            debug!(
                event_name = "tco.calculate.vendor_not_found",
                vendor_id = %vendor_id,
                "vendor is not in the catalog"
            );
            return Ok(None);
        };

        let result = self.evaluate(vendor, inputs);
        debug!(
            event_name = "tco.calculate.completed",
            vendor_id = %vendor_id,
            total_tco = %result.costs.total,
            roi_pct = %result.roi.percentage,
            payback_months = result.roi.payback_period_months,
            "vendor tco calculated"
        );
        Ok(Some(result))
    }
}
