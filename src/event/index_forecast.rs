use chrono::NaiveDate;
use thiserror::Error;

use crate::util::datetime::{self, Weekend};

/// What a `predict` request resolves to on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastPlan {
    /// 週末休市，不做預測
    MarketClosed,
    /// Forecast labelled with this trading day.
    Target(NaiveDate),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("{0} is not a future trading day")]
    NotFutureTradingDay(NaiveDate),
    #[error("no trading day after {0}")]
    NoTradingDay(NaiveDate),
}

/// Picks the forecast target for a request made on `today`.
///
/// Nothing is forecast on Saturday or Sunday. An explicit target must be after
/// `today` and fall on a weekday; without one the next trading day is used.
pub fn plan_forecast(
    today: NaiveDate,
    target: Option<NaiveDate>,
) -> Result<ForecastPlan, PlanError> {
    if today.is_weekend() {
        return Ok(ForecastPlan::MarketClosed);
    }

    match target {
        Some(date) if datetime::is_future_trading_day(date, today) => {
            Ok(ForecastPlan::Target(date))
        }
        Some(date) => Err(PlanError::NotFutureTradingDay(date)),
        None => datetime::next_trading_day(today)
            .map(ForecastPlan::Target)
            .ok_or(PlanError::NoTradingDay(today)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekend_has_no_forecast() {
        // 2024-05-04 星期六, 2024-05-05 星期日
        assert_eq!(plan_forecast(ymd(2024, 5, 4), None), Ok(ForecastPlan::MarketClosed));
        assert_eq!(plan_forecast(ymd(2024, 5, 5), None), Ok(ForecastPlan::MarketClosed));
        assert_eq!(
            plan_forecast(ymd(2024, 5, 5), Some(ymd(2024, 5, 6))),
            Ok(ForecastPlan::MarketClosed)
        );
    }

    #[test]
    fn test_default_target_is_next_trading_day() {
        // Friday -> Monday
        assert_eq!(
            plan_forecast(ymd(2024, 5, 3), None),
            Ok(ForecastPlan::Target(ymd(2024, 5, 6)))
        );
        assert_eq!(
            plan_forecast(ymd(2024, 5, 1), None),
            Ok(ForecastPlan::Target(ymd(2024, 5, 2)))
        );
    }

    #[test]
    fn test_explicit_target() {
        let today = ymd(2024, 5, 2);
        assert_eq!(
            plan_forecast(today, Some(ymd(2024, 5, 7))),
            Ok(ForecastPlan::Target(ymd(2024, 5, 7)))
        );
    }

    #[test]
    fn test_rejects_past_today_and_weekend_targets() {
        let today = ymd(2024, 5, 2);
        for date in [ymd(2024, 5, 1), today, ymd(2024, 5, 4), ymd(2024, 5, 5)] {
            assert_eq!(
                plan_forecast(today, Some(date)),
                Err(PlanError::NotFutureTradingDay(date))
            );
        }
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            PlanError::NotFutureTradingDay(ymd(2024, 5, 4)).to_string(),
            "2024-05-04 is not a future trading day"
        );
    }
}
