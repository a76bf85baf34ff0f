//! Forecast-versus-actual arithmetic shared by week aggregates and reports.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Values are stored and reported with two decimal places, rounding half to even.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Product value per production hour. `None` when either input is missing
/// or there are no hours to divide by.
pub fn dollars_per_hour(value: Option<Decimal>, hours: Option<Decimal>) -> Option<Decimal> {
    let hours = hours.filter(|h| !h.is_zero())?;
    let value = value?;
    value.checked_div(hours).map(round2)
}

/// Percentage change relative to the forecast, 0 when there is no forecast.
pub fn variance_pct(forecasted: Decimal, actual: Decimal) -> Decimal {
    if forecasted.is_zero() {
        return Decimal::ZERO;
    }
    ((actual - forecasted) / forecasted) * dec!(100)
}

/// Actual minus forecast for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Variance {
    pub forecasted: Decimal,
    pub actual: Decimal,
    pub variance: Decimal,
    pub variance_pct: Decimal,
}

impl Variance {
    pub fn between(forecasted: Decimal, actual: Decimal) -> Self {
        Self {
            forecasted: round2(forecasted),
            actual: round2(actual),
            variance: round2(actual - forecasted),
            variance_pct: round2(variance_pct(forecasted, actual)),
        }
    }

    /// Missing values count as zero.
    pub fn between_optional(forecasted: Option<Decimal>, actual: Option<Decimal>) -> Self {
        Self::between(
            forecasted.unwrap_or_default(),
            actual.unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn dph_requires_value_and_hours() {
        assert_eq!(dollars_per_hour(None, Some(dec!(10))), None);
        assert_eq!(dollars_per_hour(Some(dec!(100)), None), None);
        assert_eq!(dollars_per_hour(Some(dec!(100)), Some(dec!(0))), None);
        assert_eq!(
            dollars_per_hour(Some(dec!(1000)), Some(dec!(37.5))),
            Some(dec!(26.67))
        );
    }

    #[test]
    fn variance_pct_is_zero_guarded() {
        assert_eq!(variance_pct(dec!(0), dec!(0)), dec!(0));
        assert_eq!(variance_pct(dec!(0), dec!(12)), dec!(0));
        assert_eq!(variance_pct(dec!(40), dec!(40)), dec!(0));
        assert_eq!(variance_pct(dec!(40), dec!(30)), dec!(-25));
    }

    #[test]
    fn variance_rounds_to_cents() {
        let v = Variance::between(dec!(30), dec!(40));
        assert_eq!(v.variance, dec!(10));
        assert_eq!(v.variance_pct, dec!(33.33));
    }

    #[test]
    fn rounding_is_half_even() {
        assert_eq!(round2(dec!(2.675)), dec!(2.68));
        assert_eq!(round2(dec!(2.665)), dec!(2.66));
    }
}
