use rust_decimal::Decimal;

use crate::domain::inputs::CalculationInputs;
use crate::sensitivity::parameter::SensitivityParameter;
use crate::sensitivity::SensitivityError;

/// `steps` evenly spaced values from `base * (1 - range/100)` to
/// `base * (1 + range/100)` inclusive, rounded by the parameter's policy.
pub fn generate_variations(
    parameter: SensitivityParameter,
    base_value: Decimal,
    range_pct: Decimal,
    steps: usize,
) -> Result<Vec<Decimal>, SensitivityError> {
    if steps < 2 {
        return Err(SensitivityError::InvalidSteps { steps });
    }
    if range_pct < Decimal::ZERO {
        return Err(SensitivityError::InvalidRange { range: range_pct });
    }

    let step_size = range_pct * Decimal::TWO / Decimal::from(steps - 1);
    let rounding = parameter.rounding();

    Ok((0..steps)
        .map(|index| {
            let percent_change = -range_pct + step_size * Decimal::from(index);
            let value = base_value * (Decimal::ONE + percent_change / Decimal::ONE_HUNDRED);
            rounding.apply(value)
        })
        .collect())
}

/// Variations around the value the parameter currently has in `inputs`.
pub fn variations_for_inputs(
    parameter: SensitivityParameter,
    inputs: &CalculationInputs,
    range_pct: Decimal,
    steps: usize,
) -> Result<Vec<Decimal>, SensitivityError> {
    generate_variations(parameter, parameter.read(inputs), range_pct, steps)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::sensitivity::parameter::SensitivityParameter;
    use crate::sensitivity::SensitivityError;

    use super::generate_variations;

    #[test]
    fn three_steps_are_symmetric_around_the_base() {
        let values = generate_variations(
            SensitivityParameter::FteAnnualCost,
            Decimal::from(100_000),
            Decimal::from(20),
            3,
        )
        .expect("variations");

        assert_eq!(values, vec![Decimal::from(80_000), Decimal::from(100_000), Decimal::from(120_000)]);
    }

    #[test]
    fn five_steps_are_evenly_spaced_and_rounded_to_cents() {
        let values = generate_variations(
            SensitivityParameter::BasePricePerDevice,
            Decimal::new(299, 2),
            Decimal::from(20),
            5,
        )
        .expect("variations");

        assert_eq!(
            values,
            vec![
                Decimal::new(239, 2),
                Decimal::new(269, 2),
                Decimal::new(299, 2),
                Decimal::new(329, 2),
                Decimal::new(359, 2),
            ]
        );
    }

    #[test]
    fn counts_round_to_whole_numbers() {
        let values = generate_variations(
            SensitivityParameter::DeviceCount,
            Decimal::from(333),
            Decimal::from(20),
            3,
        )
        .expect("variations");

        assert_eq!(values, vec![Decimal::from(266), Decimal::from(333), Decimal::from(400)]);
    }

    #[test]
    fn fewer_than_two_steps_is_rejected() {
        let error = generate_variations(
            SensitivityParameter::DeviceCount,
            Decimal::from(500),
            Decimal::from(20),
            1,
        )
        .expect_err("one step must fail");

        assert_eq!(error, SensitivityError::InvalidSteps { steps: 1 });
    }

    #[test]
    fn negative_range_is_rejected() {
        let error = generate_variations(
            SensitivityParameter::DeviceCount,
            Decimal::from(500),
            Decimal::from(-5),
            3,
        )
        .expect_err("negative range must fail");

        assert!(matches!(error, SensitivityError::InvalidRange { .. }));
    }
}
