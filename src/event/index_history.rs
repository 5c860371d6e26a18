use std::io;

use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    config::App,
    crawler::{investing::Investing, FetchError, IndexValue},
    history::{HistoryStore, UpdateError, UpdateResult},
    logging, report,
    util::datetime,
};

/// Why the fetch-then-update job stopped.
#[derive(Debug, Error)]
pub enum UpdateFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Update(#[from] UpdateError),
}

/// Fetches the current index value and records it under `today`.
///
/// The store is not touched when the fetch fails. The file work runs on the
/// blocking thread pool.
pub async fn update_today<F>(
    fetcher: &F,
    store: &HistoryStore,
    today: NaiveDate,
) -> Result<UpdateResult, UpdateFailure>
where
    F: IndexValue + Sync + ?Sized,
{
    let value = fetcher.fetch_index_value().await?;

    let store = store.clone();
    let result = tokio::task::spawn_blocking(move || store.update_history(today, value))
        .await
        .map_err(|why| UpdateError::Io(io::Error::other(why)))?;

    Ok(result?)
}

/// 排程與手動更新共用的入口
pub async fn execute(app: &App) -> Result<UpdateResult, UpdateFailure> {
    let fetcher = Investing::from_config(&app.source);
    let store = HistoryStore::new(app.history.path.clone(), app.history.schema.schema());
    let result = update_today(&fetcher, &store, datetime::today()).await;

    match &result {
        Ok(_) => logging::info_file_async(report::update_message(&result)),
        Err(_) => logging::error_file_async(report::update_message(&result)),
    }

    result
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::history::SchemaPreset;

    enum Fixed {
        Value(Decimal),
        MarkerMissing,
    }

    #[async_trait]
    impl IndexValue for Fixed {
        async fn fetch_index_value(&self) -> Result<Decimal, FetchError> {
            match self {
                Fixed::Value(v) => Ok(*v),
                Fixed::MarkerMissing => Err(FetchError::MarkerNotFound("div".to_string())),
            }
        }
    }

    fn tmp_store(name: &str) -> HistoryStore {
        let mut dir: PathBuf = std::env::temp_dir();
        dir.push(format!("masi_event_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        HistoryStore::new(dir.join("history.csv"), SchemaPreset::Seance.schema())
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_fetched_value_is_recorded() {
        let store = tmp_store("recorded");
        let fetcher = Fixed::Value(dec!(14210.33));

        let result = update_today(&fetcher, &store, ymd(2024, 5, 1)).await.unwrap();
        assert!(matches!(result, UpdateResult::Inserted(r) if r.value == dec!(14210.33)));

        let again = update_today(&fetcher, &store, ymd(2024, 5, 1)).await.unwrap();
        assert!(matches!(again, UpdateResult::AlreadyPresent(_)));
    }

    #[tokio::test]
    async fn test_marker_not_found_leaves_store_alone() {
        let store = tmp_store("marker");
        let fetcher = Fixed::MarkerMissing;

        let result = update_today(&fetcher, &store, ymd(2024, 5, 1)).await;
        assert!(matches!(
            result,
            Err(UpdateFailure::Fetch(FetchError::MarkerNotFound(_)))
        ));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_reported() {
        let store = tmp_store("schema");
        fs::write(store.path(), "X,Y\n").unwrap();
        let fetcher = Fixed::Value(dec!(1));

        let result = update_today(&fetcher, &store, ymd(2024, 5, 1)).await;
        assert!(matches!(
            result,
            Err(UpdateFailure::Update(UpdateError::SchemaMismatch { .. }))
        ));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "X,Y\n");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_update_runs_off_the_async_workers() {
        let store = tmp_store("blocking");
        let fetcher = Fixed::Value(dec!(14300));

        let first = update_today(&fetcher, &store, ymd(2024, 5, 2));
        let result = first.await.unwrap();
        assert!(matches!(result, UpdateResult::Inserted(_)));
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "Seance,MASI\n2024-05-02,14300\n"
        );
    }
}
