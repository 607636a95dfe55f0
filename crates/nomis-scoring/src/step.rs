//! Monotonic step functions.
//!
//! A table is an ordered list of `(threshold, score)` rows. Evaluating a
//! metric returns the score of the first row whose threshold the metric does
//! not exceed, or [`MAX_CATEGORY_SCORE`] past the last row.

use nomis_core::constants::MAX_CATEGORY_SCORE;
use rust_decimal::Decimal;
use serde::Serialize;

/// One breakpoint: metrics `<= threshold` (and above the previous row) score `score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    pub threshold: Decimal,
    pub score: Decimal,
}

impl Step {
    pub const fn new(threshold: Decimal, score: Decimal) -> Self {
        Self { threshold, score }
    }
}

/// A static breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StepTable(pub &'static [Step]);

impl StepTable {
    pub fn steps(&self) -> &'static [Step] {
        self.0
    }

    /// Score of `metric` under this table, in `[0, 100]`.
    pub fn evaluate(&self, metric: Decimal) -> Decimal {
        self.0
            .iter()
            .find(|s| metric <= s.threshold)
            .map_or(MAX_CATEGORY_SCORE, |s| s.score)
    }

    /// Thresholds strictly increase and scores never decrease or leave `[0, 100]`.
    pub fn is_monotonic(&self) -> bool {
        let in_range = self
            .0
            .iter()
            .all(|s| s.score >= Decimal::ZERO && s.score <= MAX_CATEGORY_SCORE);
        let ordered = self
            .0
            .windows(2)
            .all(|w| w[0].threshold < w[1].threshold && w[0].score <= w[1].score);
        in_range && ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TABLE: StepTable = StepTable(&[
        Step::new(dec!(0), dec!(0)),
        Step::new(dec!(10), dec!(20)),
        Step::new(dec!(100), dec!(60)),
    ]);

    #[test]
    fn first_threshold_not_exceeded_wins() {
        assert_eq!(TABLE.evaluate(dec!(0)), dec!(0));
        assert_eq!(TABLE.evaluate(dec!(0.01)), dec!(20));
        assert_eq!(TABLE.evaluate(dec!(10)), dec!(20));
        assert_eq!(TABLE.evaluate(dec!(10.5)), dec!(60));
    }

    #[test]
    fn past_last_threshold_is_max() {
        assert_eq!(TABLE.evaluate(dec!(100.0001)), dec!(100));
    }

    #[test]
    fn negative_metric_hits_first_row() {
        assert_eq!(TABLE.evaluate(dec!(-5)), dec!(0));
    }

    #[test]
    fn empty_table_always_max() {
        assert_eq!(StepTable(&[]).evaluate(dec!(0)), dec!(100));
    }

    #[test]
    fn detects_non_monotonic_tables() {
        assert!(TABLE.is_monotonic());
        const BAD: StepTable = StepTable(&[Step::new(dec!(1), dec!(50)), Step::new(dec!(2), dec!(40))]);
        let bad = BAD;
        assert!(!bad.is_monotonic());
        const UNORDERED: StepTable = StepTable(&[Step::new(dec!(2), dec!(10)), Step::new(dec!(1), dec!(20))]);
        let unordered = UNORDERED;
        assert!(!unordered.is_monotonic());
    }
}
