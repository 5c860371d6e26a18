use std::{future::Future, sync::Arc};

use anyhow::{Error, Result};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{config::App, event, logging};

/// 啟動排程並等待 Ctrl-C
pub async fn run(app: App) -> Result<()> {
    let mut sched = JobScheduler::new().await?;
    start(&sched, app).await?;

    tokio::signal::ctrl_c().await?;
    logging::info_console("Stopping scheduler".to_string());

    sched.shutdown().await?;
    Ok(())
}

/// 註冊每日更新 MASI 歷史檔的工作
pub async fn start(sched: &JobScheduler, app: App) -> Result<()> {
    let cron = app.schedule.update_cron.clone();
    let app = Arc::new(app);

    //                 sec  min   hour   day of month   month   day of week
    // 預設 "0 0 15 * * Mon-Fri"，UTC 時間
    let job = create_job(&cron, move || {
        let app = Arc::clone(&app);
        async move {
            event::index_history::execute(&app)
                .await
                .map(|_| ())
                .map_err(Error::from)
        }
    })?;

    sched.add(job).await?;
    sched.start().await?;

    logging::info_console(format!("Scheduled the MASI update at '{}'", cron));

    Ok(())
}

fn create_job<F, Fut>(cron_expr: &str, task: F) -> Result<Job>
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Error>> + Send,
{
    let expr = cron_expr.to_string();

    Ok(Job::new_async(cron_expr, move |_uuid, _l| {
        let task = task.clone();
        let expr = expr.clone();
        Box::pin(async move {
            if let Err(why) = task().await {
                logging::error_file_async(format!(
                    "Failed to execute task({}) because {:?}",
                    expr, why
                ));
            }
        })
    })?)
}
