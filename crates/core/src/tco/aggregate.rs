use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::results::{
    BusinessValue, ComparativeAnalysis, CostBreakdown, FastestPayback, HighestValue, LowestTco,
    RoiResult, TcoResult, VendorMetrics, YearlyCostEntry,
};
use crate::domain::vendor::VendorId;

const MONTHS_PER_YEAR: u32 = 12;

/// Recurring components split evenly; one-time implementation and hardware land in year one.
pub fn yearly_cost_breakdown(costs: &CostBreakdown, years: u32) -> Vec<YearlyCostEntry> {
    if years == 0 {
        return Vec::new();
    }

    let divisor = Decimal::from(years);
    (1..=years)
        .map(|year| {
            let subscription_cost = costs.subscription / divisor;
            let maintenance_cost = costs.maintenance / divisor;
            let operational_cost = costs.operational / divisor;
            let (implementation_cost, hardware_cost) = if year == 1 {
                (costs.implementation, costs.hardware)
            } else {
                (Decimal::ZERO, Decimal::ZERO)
            };

            YearlyCostEntry {
                year,
                subscription_cost,
                implementation_cost,
                hardware_cost,
                maintenance_cost,
                operational_cost,
                total_cost: subscription_cost
                    + implementation_cost
                    + hardware_cost
                    + maintenance_cost
                    + operational_cost,
            }
        })
        .collect()
}

/// ROI against the unramped value total. Both ratios guard their denominators
/// and report zero instead of dividing.
pub fn calculate_roi(total_tco: Decimal, value: &BusinessValue, years: u32) -> RoiResult {
    let percentage = if total_tco.is_zero() {
        Decimal::ZERO
    } else {
        (value.total / total_tco * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };

    RoiResult { percentage, payback_period_months: payback_period_months(total_tco, value, years) }
}

/// `ceil(tco / monthly_value)`, evaluated as `tco * months / value` to keep
/// whole-month results exact.
pub fn payback_period_months(total_tco: Decimal, value: &BusinessValue, years: u32) -> u32 {
    if years == 0 || value.total <= Decimal::ZERO {
        return 0;
    }

    let months = Decimal::from(years) * Decimal::from(MONTHS_PER_YEAR);
    (total_tco * months / value.total).ceil().to_u32().unwrap_or(u32::MAX)
}

pub fn vendor_metrics(result: &TcoResult) -> VendorMetrics {
    VendorMetrics {
        vendor_id: result.vendor_id().clone(),
        total_tco: result.total_tco(),
        roi_pct: result.roi.percentage,
        total_value: result.business_value.total,
        payback_period_months: result.roi.payback_period_months,
    }
}

/// Ranks already calculated results. Strict comparisons keep the first
/// encountered vendor on ties; non-positive figures never win a ranking.
pub fn compare_results(results: Vec<TcoResult>, missing_vendor_ids: Vec<VendorId>) -> ComparativeAnalysis {
    let metrics: Vec<VendorMetrics> = results.iter().map(vendor_metrics).collect();

    let mut lowest_tco: Option<LowestTco> = None;
    let mut fastest_payback: Option<FastestPayback> = None;
    let mut highest_value: Option<HighestValue> = None;

    for row in &metrics {
        if row.total_tco > Decimal::ZERO
            && lowest_tco.as_ref().map_or(true, |best| row.total_tco < best.total_tco)
        {
            lowest_tco =
                Some(LowestTco { vendor_id: row.vendor_id.clone(), total_tco: row.total_tco });
        }

        if row.payback_period_months > 0
            && fastest_payback
                .as_ref()
                .map_or(true, |best| row.payback_period_months < best.payback_period_months)
        {
            fastest_payback = Some(FastestPayback {
                vendor_id: row.vendor_id.clone(),
                payback_period_months: row.payback_period_months,
            });
        }

        if row.total_value > Decimal::ZERO
            && highest_value.as_ref().map_or(true, |best| row.total_value > best.total_value)
        {
            highest_value =
                Some(HighestValue { vendor_id: row.vendor_id.clone(), total_value: row.total_value });
        }
    }

    ComparativeAnalysis {
        results,
        metrics,
        missing_vendor_ids,
        lowest_tco,
        fastest_payback,
        highest_value,
    }
}
