use std::env;
use std::sync::Arc;

use axum::Router;
use chrono::FixedOffset;
use chrono::Utc;
use framework::asset::asset_path;
use framework::exception;
use framework::exception::CoreRsResult;
use framework::json;
use framework::log;
use framework::schedule::Scheduler;
use framework::shutdown::Shutdown;
use framework::task;
use framework::validate::Validator;
use framework::web::server::HttpServerConfig;
use framework::web::server::start_http_server;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::AppConfig;
use crate::job::archive_closed_issues;
use crate::job::archive_closed_issues_job;
use crate::linear::Linear;

mod archive;
mod config;
mod filter;
mod job;
mod linear;
mod web;

pub struct AppState {
    config: AppConfig,
    linear: Linear,
    run_lock: Mutex<()>,
}

impl AppState {
    fn new(config: AppConfig) -> CoreRsResult<Self> {
        config.validate()?;
        let linear = Linear::new(&config.linear_uri, config.api_key()?)?;
        Ok(AppState {
            config,
            linear,
            run_lock: Mutex::new(()),
        })
    }

    #[cfg(test)]
    fn for_test(cron_secret: Option<&str>) -> Self {
        let mut config: AppConfig = json::from_json(r#"{"linear_uri":"http://127.0.0.1:9/graphql"}"#).unwrap();
        config.api_key = Some("lin_api_test".to_owned());
        config.cron_secret = cron_secret.map(str::to_owned);
        AppState::new(config).unwrap()
    }
}

#[tokio::main]
async fn main() -> CoreRsResult<()> {
    log::init();

    let mut config: AppConfig = json::load_file(&asset_path("assets/conf.json")?)?;
    config.apply_env(|key| env::var(key).ok());
    let state = Arc::new(AppState::new(config)?);

    if env::args().skip(1).any(|arg| arg == "--once") {
        return run_once(&state).await;
    }

    let shutdown = Shutdown::new();
    let http_signal = shutdown.subscribe();
    let scheduler_signal = shutdown.subscribe();
    shutdown.listen();

    let scheduler_state = state.clone();
    let schedule_time = state.config.schedule_time;
    task::spawn_task(async move {
        let utc = FixedOffset::east_opt(0).ok_or_else(|| exception!(message = "invalid utc offset"))?;
        let mut scheduler = Scheduler::new(utc);
        scheduler.schedule_daily("archive-closed-issues-job", archive_closed_issues_job, schedule_time);
        scheduler.start(scheduler_state, scheduler_signal).await
    });

    let bind_address = state.config.bind_address.clone();
    let app = Router::new();
    let app = app.merge(web::routes());
    let app = app.with_state(state);
    start_http_server(app, http_signal, HttpServerConfig { bind_address }).await?;

    task::shutdown().await;

    Ok(())
}

async fn run_once(state: &AppState) -> CoreRsResult<()> {
    info!(started_at = %Utc::now(), "run archive job once");
    let mut report = None;
    let succeeded = log::start_action("archive", async {
        report = Some(archive_closed_issues(state).await?);
        Ok(())
    })
    .await;
    match report {
        Some(report) if succeeded => {
            info!(
                "done, mode={}, total_candidates={}, archived_count={}",
                report.mode, report.total_candidates, report.archived_count
            );
            for issue in &report.preview {
                info!("preview: {} - {} ({})", issue.identifier, issue.title, issue.url);
            }
            Ok(())
        }
        _ => Err(exception!(message = "archive job failed")),
    }
}
