use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::vendor::VendorId;
use crate::sensitivity::parameter::SensitivityParameter;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TornadoEntry {
    pub parameter: SensitivityParameter,
    pub display_name: String,
    pub low_value: Decimal,
    pub high_value: Decimal,
    pub low_tco: Decimal,
    pub high_tco: Decimal,
    /// TCO change at the low extreme, in percent of the baseline.
    pub decrease_pct: Decimal,
    /// TCO change at the high extreme, in percent of the baseline.
    pub increase_pct: Decimal,
    pub impact: Decimal,
}

impl TornadoEntry {
    pub fn new(
        parameter: SensitivityParameter,
        (low_value, high_value): (Decimal, Decimal),
        (low_tco, high_tco): (Decimal, Decimal),
        baseline_tco: Decimal,
    ) -> Self {
        let decrease_pct = percent_change(low_tco, baseline_tco);
        let increase_pct = percent_change(high_tco, baseline_tco);

        Self {
            parameter,
            display_name: parameter.display_name().to_string(),
            low_value,
            high_value,
            low_tco,
            high_tco,
            decrease_pct,
            increase_pct,
            impact: decrease_pct.abs() + increase_pct.abs(),
        }
    }

    pub fn tco_swing(&self) -> Decimal {
        (self.high_tco - self.low_tco).abs()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TornadoAnalysis {
    pub vendor_id: VendorId,
    pub baseline_tco: Decimal,
    pub range_pct: Decimal,
    /// Sorted by impact, largest first.
    pub entries: Vec<TornadoEntry>,
    pub most_sensitive: Option<SensitivityParameter>,
}

impl TornadoAnalysis {
    /// Entries must arrive in probe order; that order decides ties.
    pub fn from_entries(
        vendor_id: VendorId,
        baseline_tco: Decimal,
        range_pct: Decimal,
        mut entries: Vec<TornadoEntry>,
    ) -> Self {
        let most_sensitive = most_sensitive(&entries);
        rank_by_impact(&mut entries);

        Self { vendor_id, baseline_tco, range_pct, entries, most_sensitive }
    }

    pub fn entry(&self, parameter: SensitivityParameter) -> Option<&TornadoEntry> {
        self.entries.iter().find(|entry| entry.parameter == parameter)
    }
}

/// Stable sort, so equal impacts keep probe order.
pub fn rank_by_impact(entries: &mut [TornadoEntry]) {
    entries.sort_by(|left, right| right.impact.cmp(&left.impact));
}

/// Parameter with the widest absolute TCO swing; the first one wins ties and
/// nothing qualifies when every swing is zero.
pub fn most_sensitive(entries: &[TornadoEntry]) -> Option<SensitivityParameter> {
    let mut best: Option<(SensitivityParameter, Decimal)> = None;
    for entry in entries {
        let swing = entry.tco_swing();
        if swing > best.map_or(Decimal::ZERO, |(_, best_swing)| best_swing) {
            best = Some((entry.parameter, swing));
        }
    }
    best.map(|(parameter, _)| parameter)
}

fn percent_change(value: Decimal, baseline: Decimal) -> Decimal {
    if baseline.is_zero() {
        return Decimal::ZERO;
    }
    ((value - baseline) / baseline * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::vendor::VendorId;
    use crate::sensitivity::parameter::SensitivityParameter;

    use super::{TornadoAnalysis, TornadoEntry};

    #[test]
    fn entry_measures_deviation_from_baseline() {
        let entry = TornadoEntry::new(
            SensitivityParameter::FteAnnualCost,
            (Decimal::from(80_000), Decimal::from(120_000)),
            (Decimal::from(90_000), Decimal::from(115_000)),
            Decimal::from(100_000),
        );

        assert_eq!(entry.decrease_pct, Decimal::from(-10));
        assert_eq!(entry.increase_pct, Decimal::from(15));
        assert_eq!(entry.impact, Decimal::from(25));
        assert_eq!(entry.display_name, "FTE Cost");
    }

    #[test]
    fn zero_baseline_reports_zero_percentages() {
        let entry = TornadoEntry::new(
            SensitivityParameter::DeviceCount,
            (Decimal::from(400), Decimal::from(600)),
            (Decimal::from(10), Decimal::from(20)),
            Decimal::ZERO,
        );

        assert_eq!(entry.decrease_pct, Decimal::ZERO);
        assert_eq!(entry.impact, Decimal::ZERO);
    }

    #[test]
    fn ranking_is_by_impact_and_stable_for_ties() {
        let baseline = Decimal::from(100_000);
        let entries = vec![
            entry(SensitivityParameter::DeviceCount, 95_000, 105_000, baseline),
            entry(SensitivityParameter::FteAnnualCost, 80_000, 120_000, baseline),
            entry(SensitivityParameter::DiscountPct, 105_000, 95_000, baseline),
            entry(SensitivityParameter::MaintenancePct, 100_000, 100_000, baseline),
        ];

        for _ in 0..3 {
            let analysis = TornadoAnalysis::from_entries(
                VendorId::new("portnox"),
                baseline,
                Decimal::from(20),
                entries.clone(),
            );
            let order: Vec<SensitivityParameter> =
                analysis.entries.iter().map(|entry| entry.parameter).collect();

            assert_eq!(
                order,
                vec![
                    SensitivityParameter::FteAnnualCost,
                    SensitivityParameter::DeviceCount,
                    SensitivityParameter::DiscountPct,
                    SensitivityParameter::MaintenancePct,
                ]
            );
            assert_eq!(analysis.most_sensitive, Some(SensitivityParameter::FteAnnualCost));
        }
    }

    #[test]
    fn most_sensitive_is_none_when_nothing_moves() {
        let baseline = Decimal::from(50_000);
        let analysis = TornadoAnalysis::from_entries(
            VendorId::new("portnox"),
            baseline,
            Decimal::from(20),
            vec![entry(SensitivityParameter::MaintenancePct, 50_000, 50_000, baseline)],
        );

        assert_eq!(analysis.most_sensitive, None);
        assert!(analysis.entry(SensitivityParameter::MaintenancePct).is_some());
    }

    fn entry(
        parameter: SensitivityParameter,
        low_tco: i64,
        high_tco: i64,
        baseline: Decimal,
    ) -> TornadoEntry {
        TornadoEntry::new(
            parameter,
            (Decimal::ONE, Decimal::TWO),
            (Decimal::from(low_tco), Decimal::from(high_tco)),
            baseline,
        )
    }
}
