use chrono::{DateTime, Datelike, Days, Local, NaiveDate, Weekday};

/// A trait representing the weekend concept.
pub trait Weekend {
    /// Returns `true` if the date is on a Saturday or Sunday.
    fn is_weekend(&self) -> bool;
}

impl Weekend for DateTime<Local> {
    fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

impl Weekend for NaiveDate {
    fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// 今天的日期（本地時區）
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The first weekday strictly after `date`.
pub fn next_trading_day(date: NaiveDate) -> Option<NaiveDate> {
    let mut next = date.checked_add_days(Days::new(1))?;
    while next.is_weekend() {
        next = next.checked_add_days(Days::new(1))?;
    }

    Some(next)
}

/// Whether `date` can be picked as a forecast target: after `today` and not on a weekend.
pub fn is_future_trading_day(date: NaiveDate, today: NaiveDate) -> bool {
    date > today && !date.is_weekend()
}
