use std::{
    ffi::OsString,
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    history::{HistoryRecord, HistorySchema, UpdateError, UpdateResult, DATE_FORMAT},
    logging,
    util::text,
};

/// The CSV file holding the index history.
///
/// `update_history` is a read-modify-rewrite cycle without file locking: two
/// overlapping calls on the same path can lose an update. Callers must make
/// sure only one process or schedule updates a given store at a time.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    schema: HistorySchema,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>, schema: HistorySchema) -> Self {
        HistoryStore {
            path: path.into(),
            schema,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> &HistorySchema {
        &self.schema
    }

    /// Loads and validates the whole collection.
    ///
    /// A missing or zero-length file is an empty collection. Records must be
    /// in strictly increasing date order.
    pub fn load(&self) -> Result<Vec<HistoryRecord>, UpdateError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(why) if why.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(why) => return Err(why.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let (date_idx, value_idx) = self.schema.resolve(&headers.iter().collect::<Vec<_>>())?;
        let mut records: Vec<HistoryRecord> = Vec::new();

        for result in reader.records() {
            let row = result?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();

            if row.len() != headers.len() {
                return Err(UpdateError::MalformedRecord {
                    line,
                    reason: format!("expected {} fields, found {}", headers.len(), row.len()),
                });
            }

            let record = parse_record(&row[date_idx], &row[value_idx])
                .map_err(|reason| UpdateError::MalformedRecord { line, reason })?;

            if let Some(last) = records.last() {
                if record.date <= last.date {
                    return Err(UpdateError::MalformedRecord {
                        line,
                        reason: format!(
                            "date {} does not follow {}",
                            record.date.format(DATE_FORMAT),
                            last.date.format(DATE_FORMAT)
                        ),
                    });
                }
            }

            records.push(record);
        }

        Ok(records)
    }

    /// The last `n` records in chronological order (fewer if the store is shorter).
    pub fn trailing_window(&self, n: usize) -> Result<Vec<HistoryRecord>, UpdateError> {
        let mut records = self.load()?;
        let start = records.len().saturating_sub(n);
        Ok(records.split_off(start))
    }

    /// Appends `value` for `today` unless a record for that date already exists.
    ///
    /// Nothing is written when the result is `AlreadyPresent` or an error.
    pub fn update_history(
        &self,
        today: NaiveDate,
        value: Decimal,
    ) -> Result<UpdateResult, UpdateError> {
        let mut records = self.load()?;

        if let Some(existing) = records.iter().rev().find(|r| r.date == today) {
            logging::info_file_async(format!(
                "{} already holds {}",
                self.path.display(),
                existing
            ));
            return Ok(UpdateResult::AlreadyPresent(*existing));
        }

        if let Some(last) = records.last() {
            if last.date > today {
                return Err(UpdateError::OutOfOrder {
                    last: last.date,
                    today,
                });
            }
        }

        let record = HistoryRecord::new(today, value);
        records.push(record);
        self.save(&records)?;

        logging::info_file_async(format!("{} appended {}", self.path.display(), record));

        Ok(UpdateResult::Inserted(record))
    }

    /// Rewrites the whole file through a sibling temporary file and a rename,
    /// so readers never observe a half-written store.
    fn save(&self, records: &[HistoryRecord]) -> Result<(), UpdateError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.tmp_path();
        if let Err(why) = self.write_all(&tmp_path, records) {
            let _ = fs::remove_file(&tmp_path);
            return Err(why);
        }

        fs::rename(&tmp_path, &self.path).map_err(|why| {
            let _ = fs::remove_file(&tmp_path);
            UpdateError::Io(why)
        })
    }

    fn write_all(&self, path: &Path, records: &[HistoryRecord]) -> Result<(), UpdateError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(self.schema.header())?;

        for record in records {
            writer.write_record([
                record.date.format(DATE_FORMAT).to_string(),
                record.value.to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name: OsString = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("history"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn parse_record(date: &str, value: &str) -> Result<HistoryRecord, String> {
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|why| format!("invalid date '{}': {}", date, why))?;
    let value = text::parse_decimal(value, None).map_err(|why| why.to_string())?;

    Ok(HistoryRecord::new(date, value))
}
