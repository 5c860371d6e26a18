//! Turns job results into the one-line messages shown to the operator.

use rust_decimal::Decimal;

use crate::{
    crawler::FetchError,
    event::index_history::UpdateFailure,
    forecast::{Forecast, ForecastError},
    history::{UpdateError, UpdateResult, DATE_FORMAT},
};

pub fn fetch_message(result: &Result<Decimal, FetchError>) -> String {
    match result {
        Ok(value) => format!("MASI: {:.2}", value),
        Err(why) => fetch_error_message(why),
    }
}

pub fn update_message(result: &Result<UpdateResult, UpdateFailure>) -> String {
    match result {
        Ok(UpdateResult::Inserted(record)) => format!(
            "Value added: {} → {:.2}",
            record.date.format(DATE_FORMAT),
            record.value
        ),
        Ok(UpdateResult::AlreadyPresent(record)) => format!(
            "Today's value is already recorded ({} → {:.2})",
            record.date.format(DATE_FORMAT),
            record.value
        ),
        Err(UpdateFailure::Fetch(why)) => {
            format!("Cannot fetch the MASI value: {}", fetch_error_message(why))
        }
        Err(UpdateFailure::Update(why)) => update_error_message(why),
    }
}

pub fn forecast_message(result: &Result<Forecast, ForecastError>) -> String {
    match result {
        Ok(forecast) => {
            let mut msg = format!(
                "MASI forecast for {}: {:.2}",
                forecast.target_date.format(DATE_FORMAT),
                forecast.value
            );

            let values = forecast.window.iter().map(|r| r.value);
            if let (Some(first), Some(last), Some(low), Some(high)) = (
                forecast.window.first(),
                forecast.window.last(),
                values.clone().min(),
                values.max(),
            ) {
                msg.push_str(&format!(
                    " (last {} sessions {} to {}: low {:.2}, high {:.2}, last {:.2})",
                    forecast.window.len(),
                    first.date.format(DATE_FORMAT),
                    last.date.format(DATE_FORMAT),
                    low,
                    high,
                    last.value
                ));
            }

            msg
        }
        Err(ForecastError::InsufficientHistory {
            required,
            available,
        }) => format!(
            "Not enough data to forecast: {} values required, {} available",
            required, available
        ),
        Err(why) => format!("Forecast failed: {}", why),
    }
}

fn fetch_error_message(why: &FetchError) -> String {
    match why {
        FetchError::HttpFailure(detail) => {
            format!("connection to the quote page failed ({})", detail)
        }
        FetchError::MarkerNotFound(_) => "index value not found on the page".to_string(),
        FetchError::ParseFailure(raw) => format!("'{}' is not a number", raw),
    }
}

fn update_error_message(why: &UpdateError) -> String {
    match why {
        UpdateError::SchemaMismatch { expected, found } => format!(
            "The history file must contain the columns {} (found {})",
            expected.join(", "),
            found.join(", ")
        ),
        other => format!("History update failed: {}", other),
    }
}
