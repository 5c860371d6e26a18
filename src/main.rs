use std::{env, process::ExitCode};

use anyhow::Result;
use chrono::NaiveDate;

use crate::{
    cli::Command,
    crawler::{investing::Investing, IndexValue},
    event::index_forecast::ForecastPlan,
    forecast::InferenceContext,
    history::HistoryStore,
    util::datetime,
};

pub mod cli;
pub mod config;
pub mod crawler;
pub mod event;
pub mod forecast;
pub mod history;
pub mod logging;
pub mod report;
pub mod scheduler;
pub mod util;

#[cfg(all(target_os = "linux", target_env = "musl"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(why) => {
            logging::error_file_async(format!("{:?}", why));
            logging::error_console(format!("{:#}", why));
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the command ran but reported a failure to the operator.
async fn run() -> Result<bool> {
    let command = cli::parse(env::args().skip(1))?;
    if command == Command::Help {
        println!("{}", cli::USAGE);
        return Ok(true);
    }

    let app = config::App::get()?;

    match command {
        Command::Fetch => {
            let result = Investing::from_config(&app.source)
                .fetch_index_value()
                .await;
            print(result.is_ok(), report::fetch_message(&result));
            Ok(result.is_ok())
        }
        Command::Update => {
            let result = event::index_history::execute(&app).await;
            print(result.is_ok(), report::update_message(&result));
            Ok(result.is_ok())
        }
        Command::Predict(target) => predict(&app, target),
        Command::Schedule => {
            scheduler::run(app).await?;
            Ok(true)
        }
        Command::Help => Ok(true),
    }
}

fn predict(app: &config::App, target: Option<NaiveDate>) -> Result<bool> {
    let target = match event::index_forecast::plan_forecast(datetime::today(), target) {
        Ok(ForecastPlan::Target(date)) => date,
        Ok(ForecastPlan::MarketClosed) => {
            logging::info_console("The exchange is closed today (weekend), no forecast.".to_string());
            return Ok(true);
        }
        Err(why) => {
            logging::error_console(why.to_string());
            return Ok(false);
        }
    };

    let context = match InferenceContext::load(&app.forecast) {
        Ok(c) => c,
        Err(why) => {
            print(false, report::forecast_message(&Err(why)));
            return Ok(false);
        }
    };

    let store = HistoryStore::new(app.history.path.clone(), app.history.schema.schema());
    let history = store.trailing_window(context.window())?;
    let result = context.forecast(&history, target);
    print(result.is_ok(), report::forecast_message(&result));

    Ok(result.is_ok())
}

fn print(ok: bool, msg: String) {
    if ok {
        logging::info_console(msg);
    } else {
        logging::error_console(msg);
    }
}
