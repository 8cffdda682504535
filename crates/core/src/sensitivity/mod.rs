pub mod metrics;
pub mod parameter;
pub mod tornado;
pub mod variation;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::inputs::CalculationInputs;
use crate::domain::results::TcoResult;
use crate::domain::telemetry::{
    SensitivityEventType, SensitivityOutcome, SensitivityRunId, SensitivityTelemetryEvent,
};
use crate::domain::vendor::VendorId;
use crate::errors::DomainError;
use crate::tco::assumptions::ModelAssumptions;
use crate::tco::TcoCalculator;

use self::parameter::SensitivityParameter;
use self::tornado::{TornadoAnalysis, TornadoEntry};
use self::variation::{generate_variations, variations_for_inputs};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SensitivityError {
    #[error("sensitivity engine has no tco calculator wired")]
    DependencyUnavailable,
    #[error("unknown sensitivity parameter `{key}`")]
    UnknownParameter { key: String },
    #[error("variation generation needs at least 2 steps, got {steps}")]
    InvalidSteps { steps: usize },
    #[error("variation range must not be negative, got {range}")]
    InvalidRange { range: Decimal },
    #[error("sensitivity analysis requires at least one parameter variation")]
    EmptyVariationSet,
    #[error("value {value} is not valid for parameter {parameter}")]
    InvalidVariationValue { parameter: SensitivityParameter, value: Decimal },
    #[error(transparent)]
    InvalidConfiguration(#[from] DomainError),
    #[error("sensitivity analysis was cancelled")]
    Cancelled,
}

impl SensitivityError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DependencyUnavailable => "dependency_unavailable",
            Self::UnknownParameter { .. } => "unknown_parameter",
            Self::InvalidSteps { .. } => "invalid_steps",
            Self::InvalidRange { .. } => "invalid_range",
            Self::EmptyVariationSet => "empty_variation_set",
            Self::InvalidVariationValue { .. } => "invalid_variation_value",
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn user_safe_message(&self) -> String {
        match self {
            Self::DependencyUnavailable => {
                "The cost calculator is not available; check the engine setup.".to_string()
            }
            Self::UnknownParameter { key } => {
                format!("'{key}' is not a parameter that can be varied.")
            }
            Self::InvalidSteps { .. } => "Choose at least two variation steps.".to_string(),
            Self::InvalidRange { .. } => "The variation range cannot be negative.".to_string(),
            Self::EmptyVariationSet => "Pick at least one parameter to vary.".to_string(),
            Self::InvalidVariationValue { parameter, value } => {
                format!("{value} is not a usable value for {}.", parameter.display_name())
            }
            Self::InvalidConfiguration(error) => format!("The scenario is not valid: {error}."),
            Self::Cancelled => "The analysis was cancelled before it finished.".to_string(),
        }
    }
}

/// Cooperative cancellation shared between the caller and a running analysis.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub value: Decimal,
    /// `None` when the vendor is not in the catalog.
    pub result: Option<TcoResult>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSweep {
    pub parameter: SensitivityParameter,
    pub points: Vec<SweepPoint>,
}

impl ParameterSweep {
    pub fn point(&self, value: Decimal) -> Option<&SweepPoint> {
        self.points.iter().find(|point| point.value == value)
    }

    pub fn total_tco_series(&self) -> Vec<Option<Decimal>> {
        self.points
            .iter()
            .map(|point| point.result.as_ref().map(TcoResult::total_tco))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub vendor_id: VendorId,
    pub baseline: Option<TcoResult>,
    pub variations: BTreeMap<SensitivityParameter, ParameterSweep>,
    pub evaluation_count: u32,
}

impl SensitivityResult {
    pub fn sweep(&self, parameter: SensitivityParameter) -> Option<&ParameterSweep> {
        self.variations.get(&parameter)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiParameterSeries {
    pub label: String,
    pub secondary_value: Decimal,
    pub points: Vec<SweepPoint>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiParameterAnalysis {
    pub vendor_id: VendorId,
    pub primary: SensitivityParameter,
    pub secondary: SensitivityParameter,
    pub primary_values: Vec<Decimal>,
    pub series: Vec<MultiParameterSeries>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SensitivityTelemetryContext {
    pub correlation_id: String,
    pub run_id: Option<SensitivityRunId>,
}

pub trait SensitivityTelemetrySink: Send + Sync {
    fn emit(&self, event: SensitivityTelemetryEvent);
}

/// Forwards telemetry events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingTelemetrySink;

impl SensitivityTelemetrySink for TracingTelemetrySink {
    fn emit(&self, event: SensitivityTelemetryEvent) {
        info!(
            event_name = "sensitivity.telemetry",
            event_type = event.event_type.as_str(),
            vendor_id = %event.vendor_id,
            correlation_id = %event.correlation_id,
            run_id = event.run_id.as_ref().map(|run_id| run_id.0.as_str()).unwrap_or(""),
            parameter_count = event.parameter_count,
            evaluation_count = event.evaluation_count,
            latency_ms = event.latency_ms,
            outcome = event.outcome.as_str(),
            error_code = event.error_code.as_deref().unwrap_or(""),
            "sensitivity telemetry"
        );
    }
}

/// Re-runs the tco pipeline over perturbed copies of the inputs.
pub struct SensitivityEngine<C> {
    calculator: Option<C>,
    cancellation: Option<CancellationToken>,
    tornado_range_pct: Decimal,
    multi_parameter_range_pct: Decimal,
}

impl<C: TcoCalculator> SensitivityEngine<C> {
    pub fn new(calculator: C) -> Self {
        Self::build(Some(calculator))
    }

    /// Engine without a calculator; every analysis reports `DependencyUnavailable`.
    pub fn unwired() -> Self {
        Self::build(None)
    }

    fn build(calculator: Option<C>) -> Self {
        let assumptions = ModelAssumptions::default();
        Self {
            calculator,
            cancellation: None,
            tornado_range_pct: assumptions.tornado_range_pct,
            multi_parameter_range_pct: assumptions.multi_parameter_range_pct,
        }
    }

    pub fn with_assumptions(mut self, assumptions: &ModelAssumptions) -> Self {
        self.tornado_range_pct = assumptions.tornado_range_pct;
        self.multi_parameter_range_pct = assumptions.multi_parameter_range_pct;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn run_sensitivity_analysis(
        &self,
        vendor_id: &VendorId,
        base_inputs: &CalculationInputs,
        variations: &BTreeMap<SensitivityParameter, Vec<Decimal>>,
    ) -> Result<SensitivityResult, SensitivityError> {
        let calculator = self.calculator()?;
        if variations.is_empty() || variations.values().any(Vec::is_empty) {
            return Err(SensitivityError::EmptyVariationSet);
        }

        let mut evaluation_count = 0_u32;
        let baseline = self.evaluate(calculator, vendor_id, base_inputs, &mut evaluation_count)?;

        let mut sweeps = BTreeMap::new();
        for (parameter, values) in variations {
            let points = self.sweep_points(
                calculator,
                vendor_id,
                base_inputs,
                *parameter,
                values,
                baseline.is_some(),
                &mut evaluation_count,
            )?;
            sweeps.insert(*parameter, ParameterSweep { parameter: *parameter, points });
        }

        debug!(
            event_name = "sensitivity.analysis.completed",
            vendor_id = %vendor_id,
            parameter_count = variations.len(),
            evaluation_count,
            vendor_found = baseline.is_some(),
            "sensitivity analysis completed"
        );

        Ok(SensitivityResult {
            vendor_id: vendor_id.clone(),
            baseline,
            variations: sweeps,
            evaluation_count,
        })
    }

    /// Generates `steps` variations of `parameter` around its current value and analyses them.
    pub fn sweep(
        &self,
        vendor_id: &VendorId,
        base_inputs: &CalculationInputs,
        parameter: SensitivityParameter,
        range_pct: Decimal,
        steps: usize,
    ) -> Result<SensitivityResult, SensitivityError> {
        self.calculator()?;
        let values = variations_for_inputs(parameter, base_inputs, range_pct, steps)?;
        let variations = BTreeMap::from([(parameter, values)]);

        let result = self.run_sensitivity_analysis(vendor_id, base_inputs, &variations)?;
        info!(
            event_name = "sensitivity.sweep.completed",
            vendor_id = %vendor_id,
            parameter = parameter.as_str(),
            steps,
            evaluation_count = result.evaluation_count,
            "parameter sweep completed"
        );
        Ok(result)
    }

    /// Probes every tornado parameter at its low and high extreme. `None`
    /// when the vendor is not in the catalog.
    pub fn run_tornado_analysis(
        &self,
        vendor_id: &VendorId,
        base_inputs: &CalculationInputs,
    ) -> Result<Option<TornadoAnalysis>, SensitivityError> {
        let calculator = self.calculator()?;
        let mut evaluation_count = 0_u32;
        let Some(baseline) =
            self.evaluate(calculator, vendor_id, base_inputs, &mut evaluation_count)?
        else {
            return Ok(None);
        };
        let baseline_tco = baseline.total_tco();

        let mut entries = Vec::with_capacity(SensitivityParameter::TORNADO.len());
        for parameter in SensitivityParameter::TORNADO {
            let base_value = parameter.read(base_inputs);
            let values = generate_variations(parameter, base_value, self.tornado_range_pct, 3)?;
            let (low_value, high_value) = (values[0], values[2]);

            let mut probe = |value| {
                self.evaluate_variation(
                    calculator,
                    vendor_id,
                    base_inputs,
                    parameter,
                    value,
                    &mut evaluation_count,
                )
            };
            let low_tco = probe(low_value)?;
            let high_tco = probe(high_value)?;

            entries.push(TornadoEntry::new(
                parameter,
                (low_value, high_value),
                (low_tco, high_tco),
                baseline_tco,
            ));
        }

        let analysis = TornadoAnalysis::from_entries(
            vendor_id.clone(),
            baseline_tco,
            self.tornado_range_pct,
            entries,
        );
        info!(
            event_name = "sensitivity.tornado.completed",
            vendor_id = %vendor_id,
            evaluation_count,
            most_sensitive =
                analysis.most_sensitive.map(|parameter| parameter.as_str()).unwrap_or(""),
            "tornado analysis completed"
        );
        Ok(Some(analysis))
    }

    /// Sweeps `primary` once per `secondary` setting (low, base, high). Every
    /// series shares the primary values generated from the unmodified inputs.
    pub fn run_multi_parameter_analysis(
        &self,
        vendor_id: &VendorId,
        base_inputs: &CalculationInputs,
        primary: SensitivityParameter,
        range_pct: Decimal,
        steps: usize,
        secondary: SensitivityParameter,
    ) -> Result<MultiParameterAnalysis, SensitivityError> {
        let calculator = self.calculator()?;
        let primary_values = variations_for_inputs(primary, base_inputs, range_pct, steps)?;
        let secondary_base = secondary.read(base_inputs);
        let secondary_values =
            generate_variations(secondary, secondary_base, self.multi_parameter_range_pct, 3)?;

        let mut evaluation_count = 0_u32;
        let mut series = Vec::with_capacity(secondary_values.len());
        for secondary_value in secondary_values {
            let mut inputs = base_inputs.clone();
            secondary.apply(&mut inputs, secondary_value)?;

            let points = self.sweep_points(
                calculator,
                vendor_id,
                &inputs,
                primary,
                &primary_values,
                true,
                &mut evaluation_count,
            )?;
            series.push(MultiParameterSeries {
                label: self.series_label(secondary, secondary_value, secondary_base),
                secondary_value,
                points,
            });
        }

        debug!(
            event_name = "sensitivity.multi_parameter.completed",
            vendor_id = %vendor_id,
            primary = primary.as_str(),
            secondary = secondary.as_str(),
            evaluation_count,
            "multi-parameter analysis completed"
        );

        Ok(MultiParameterAnalysis {
            vendor_id: vendor_id.clone(),
            primary,
            secondary,
            primary_values,
            series,
        })
    }

    pub fn run_with_telemetry<S: SensitivityTelemetrySink>(
        &self,
        vendor_id: &VendorId,
        base_inputs: &CalculationInputs,
        variations: &BTreeMap<SensitivityParameter, Vec<Decimal>>,
        telemetry_context: &SensitivityTelemetryContext,
        telemetry_sink: &S,
    ) -> Result<SensitivityResult, SensitivityError> {
        let parameter_count = u32::try_from(variations.len()).unwrap_or(u32::MAX);
        let event = |event_type: SensitivityEventType,
                     evaluation_count: u32,
                     latency_ms: i64,
                     outcome: SensitivityOutcome,
                     error_code: Option<String>| {
            SensitivityTelemetryEvent {
                event_type,
                vendor_id: vendor_id.clone(),
                correlation_id: telemetry_context.correlation_id.clone(),
                run_id: telemetry_context.run_id.clone(),
                parameter_count,
                evaluation_count,
                latency_ms,
                outcome,
                error_code,
                occurred_at: Utc::now(),
            }
        };

        telemetry_sink.emit(event(
            SensitivityEventType::RequestReceived,
            0,
            0,
            SensitivityOutcome::Accepted,
            None,
        ));

        let started = Instant::now();
        let result = self.run_sensitivity_analysis(vendor_id, base_inputs, variations);
        let latency_ms = duration_to_millis_i64(started.elapsed());

        match &result {
            Ok(analysis) => telemetry_sink.emit(event(
                SensitivityEventType::SweepCompleted,
                analysis.evaluation_count,
                latency_ms,
                SensitivityOutcome::Success,
                None,
            )),
            Err(error) => {
                let outcome = if matches!(error, SensitivityError::Cancelled) {
                    SensitivityOutcome::Cancelled
                } else {
                    SensitivityOutcome::Rejected
                };
                telemetry_sink.emit(event(
                    SensitivityEventType::ErrorOccurred,
                    0,
                    latency_ms,
                    outcome,
                    Some(error.error_code().to_string()),
                ));
            }
        }

        result
    }

    fn calculator(&self) -> Result<&C, SensitivityError> {
        self.calculator.as_ref().ok_or(SensitivityError::DependencyUnavailable)
    }

    fn ensure_not_cancelled(&self) -> Result<(), SensitivityError> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => Err(SensitivityError::Cancelled),
            _ => Ok(()),
        }
    }

    fn evaluate(
        &self,
        calculator: &C,
        vendor_id: &VendorId,
        inputs: &CalculationInputs,
        evaluation_count: &mut u32,
    ) -> Result<Option<TcoResult>, SensitivityError> {
        self.ensure_not_cancelled()?;
        *evaluation_count = evaluation_count.saturating_add(1);
        Ok(calculator.calculate_vendor_tco(vendor_id, inputs)?)
    }

    /// Total TCO with one parameter overridden. The vendor is known to exist.
    fn evaluate_variation(
        &self,
        calculator: &C,
        vendor_id: &VendorId,
        base_inputs: &CalculationInputs,
        parameter: SensitivityParameter,
        value: Decimal,
        evaluation_count: &mut u32,
    ) -> Result<Decimal, SensitivityError> {
        let mut inputs = base_inputs.clone();
        parameter.apply(&mut inputs, value)?;
        let result = self.evaluate(calculator, vendor_id, &inputs, evaluation_count)?;
        Ok(result.map(|result| result.total_tco()).unwrap_or(Decimal::ZERO))
    }

    #[allow(clippy::too_many_arguments)]
    fn sweep_points(
        &self,
        calculator: &C,
        vendor_id: &VendorId,
        base_inputs: &CalculationInputs,
        parameter: SensitivityParameter,
        values: &[Decimal],
        vendor_known: bool,
        evaluation_count: &mut u32,
    ) -> Result<Vec<SweepPoint>, SensitivityError> {
        let mut points: Vec<SweepPoint> = Vec::with_capacity(values.len());
        for value in values {
            if points.last().is_some_and(|last| last.value == *value) {
                continue;
            }

            let mut inputs = base_inputs.clone();
            parameter.apply(&mut inputs, *value)?;
            let result = if vendor_known {
                self.evaluate(calculator, vendor_id, &inputs, evaluation_count)?
            } else {
                self.ensure_not_cancelled()?;
                None
            };
            points.push(SweepPoint { value: *value, result });
        }
        Ok(points)
    }

    fn series_label(&self, secondary: SensitivityParameter, value: Decimal, base: Decimal) -> String {
        let offset = self.multi_parameter_range_pct.normalize();
        let name = secondary.display_name();
        if value < base {
            format!("{name} -{offset}%")
        } else if value > base {
            format!("{name} +{offset}%")
        } else {
            format!("{name} (base)")
        }
    }
}

fn duration_to_millis_i64(duration: Duration) -> i64 {
    duration.as_millis().min(i64::MAX as u128) as i64
}
