//! Derived indicators over a completed parameter sweep.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::results::TcoResult;
use crate::sensitivity::parameter::SensitivityParameter;
use crate::sensitivity::ParameterSweep;
use crate::tco::assumptions::{
    DEVICE_BREAKEVEN_ROI_PCT, ELASTICITY_BAND_LIMITS, PRICE_BREAKEVEN_ROI_PCT,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElasticityBand {
    Low,
    MediumLow,
    Medium,
    MediumHigh,
    High,
}

impl ElasticityBand {
    pub fn classify(elasticity: Decimal) -> Self {
        let [low, medium_low, medium, medium_high] = ELASTICITY_BAND_LIMITS;
        if elasticity < low {
            Self::Low
        } else if elasticity < medium_low {
            Self::MediumLow
        } else if elasticity < medium {
            Self::Medium
        } else if elasticity < medium_high {
            Self::MediumHigh
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::MediumLow => "medium_low",
            Self::Medium => "medium",
            Self::MediumHigh => "medium_high",
            Self::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::MediumLow => "Medium-Low",
            Self::Medium => "Medium",
            Self::MediumHigh => "Medium-High",
            Self::High => "High",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Breakeven {
    Found { value: Decimal },
    NotFound,
    /// No breakeven heuristic exists for the parameter.
    Unavailable,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepMetrics {
    pub parameter: SensitivityParameter,
    pub elasticity: Option<Decimal>,
    pub band: Option<ElasticityBand>,
    pub breakeven: Breakeven,
}

pub fn sweep_metrics(sweep: &ParameterSweep) -> SweepMetrics {
    let elasticity = sweep_elasticity(sweep);

    SweepMetrics {
        parameter: sweep.parameter,
        elasticity,
        band: elasticity.map(ElasticityBand::classify),
        breakeven: breakeven(sweep),
    }
}

/// `|(dTCO / mean TCO) / (dValue / mean value)|`, rounded to four places.
/// Undefined when either relative change has a zero denominator.
pub fn elasticity(
    (min_value, max_value): (Decimal, Decimal),
    (min_tco, max_tco): (Decimal, Decimal),
) -> Option<Decimal> {
    let value_mean = (min_value + max_value) / Decimal::TWO;
    let tco_mean = (min_tco + max_tco) / Decimal::TWO;
    if value_mean.is_zero() || tco_mean.is_zero() || max_value == min_value {
        return None;
    }

    let value_change = (max_value - min_value) / value_mean;
    let tco_change = (max_tco - min_tco) / tco_mean;
    Some(
        (tco_change / value_change)
            .abs()
            .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero),
    )
}

fn sweep_elasticity(sweep: &ParameterSweep) -> Option<Decimal> {
    let evaluated = evaluated_points(sweep);
    let (min_value, min_result) = evaluated.iter().min_by_key(|(value, _)| *value)?;
    let (max_value, max_result) = evaluated.iter().max_by_key(|(value, _)| *value)?;

    elasticity((*min_value, *max_value), (min_result.costs.total, max_result.costs.total))
}

/// Device count: smallest tested value with positive ROI. Base price: largest
/// tested value whose ROI stays above the price threshold.
pub fn breakeven(sweep: &ParameterSweep) -> Breakeven {
    let mut evaluated = evaluated_points(sweep);
    let threshold = match sweep.parameter {
        SensitivityParameter::DeviceCount => {
            evaluated.sort_by(|left, right| left.0.cmp(&right.0));
            DEVICE_BREAKEVEN_ROI_PCT
        }
        SensitivityParameter::BasePricePerDevice => {
            evaluated.sort_by(|left, right| right.0.cmp(&left.0));
            PRICE_BREAKEVEN_ROI_PCT
        }
        _ => return Breakeven::Unavailable,
    };

    evaluated
        .into_iter()
        .find(|(_, result)| result.roi.percentage > threshold)
        .map(|(value, _)| Breakeven::Found { value })
        .unwrap_or(Breakeven::NotFound)
}

fn evaluated_points(sweep: &ParameterSweep) -> Vec<(Decimal, &TcoResult)> {
    sweep
        .points
        .iter()
        .filter_map(|point| point.result.as_ref().map(|result| (point.value, result)))
        .collect()
}
