use std::sync::Arc;

use framework::exception;
use framework::exception::CoreRsResult;
use framework::exception::Severity;
use framework::exception::error_code;
use framework::schedule::JobContext;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::AppState;
use crate::archive;
use crate::archive::LogListener;
use crate::archive::PreviewIssue;
use crate::archive::RunMode;
use crate::archive::RunResult;
use crate::filter;
use crate::filter::IssueFilter;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveReport {
    pub ok: bool,
    pub mode: RunMode,
    pub archive_after_days: u64,
    pub team_key: Option<String>,
    pub total_candidates: usize,
    pub archived_count: usize,
    pub preview: Vec<PreviewIssue>,
}

impl ArchiveReport {
    fn new(mode: RunMode, archive_after_days: u64, team_key: Option<&str>, result: &RunResult) -> Self {
        ArchiveReport {
            ok: true,
            mode,
            archive_after_days,
            team_key: team_key.map(str::to_owned),
            total_candidates: result.total_candidates,
            archived_count: result.archived_count,
            preview: result.preview_sample().to_vec(),
        }
    }
}

pub async fn archive_closed_issues_job(state: Arc<AppState>, context: JobContext) -> CoreRsResult<()> {
    debug!(scheduled_time = %context.scheduled_time, "archive closed issues");
    archive_closed_issues(&state).await?;
    Ok(())
}

pub async fn archive_closed_issues(state: &AppState) -> CoreRsResult<ArchiveReport> {
    let _guard = state.run_lock.try_lock().map_err(|err| {
        exception!(
            severity = Severity::Warn,
            code = error_code::CONFLICT,
            message = "archive job is already running",
            source = err
        )
    })?;

    let config = &state.config;
    let mode = RunMode::from_dry_run(config.dry_run);
    let archive_after_days = filter::effective_days(config.archive_after_days);
    let team_key = config.team_key();
    info!(
        "archive issues closed more than {archive_after_days} days ago, team={}, mode={mode}",
        team_key.unwrap_or("all")
    );

    let filter = IssueFilter::closed_before(config.archive_after_days, team_key);
    debug!(
        mode = %mode,
        completed_before = filter.completed_before(),
        team_key = filter.team_key(),
        "context"
    );
    let result = archive::run(&state.linear, &filter, mode, config.page_size, &LogListener).await?;

    info!(
        "archive job finished, total_candidates={}, archived_count={}",
        result.total_candidates, result.archived_count
    );
    debug!(
        total_candidates = result.total_candidates,
        archived_count = result.archived_count,
        "stats"
    );
    Ok(ArchiveReport::new(mode, archive_after_days, team_key, &result))
}

#[cfg(test)]
mod tests {
    use framework::exception::error_code;
    use framework::json;

    use super::ArchiveReport;
    use crate::AppState;
    use crate::archive::PreviewIssue;
    use crate::archive::RunMode;
    use crate::archive::RunResult;

    fn preview_issue(number: usize) -> PreviewIssue {
        PreviewIssue {
            id: format!("id-{number}"),
            identifier: format!("ENG-{number}"),
            title: format!("issue {number}"),
            url: format!("https://linear.app/acme/issue/ENG-{number}"),
        }
    }

    #[test]
    fn preview_report() {
        let result = RunResult {
            total_candidates: 60,
            archived_count: 0,
            preview_issues: (1..=60).map(preview_issue).collect(),
        };

        let report = ArchiveReport::new(RunMode::Preview, 14, None, &result);

        assert_eq!(report.preview.len(), 20);
        assert_eq!(report.preview.first(), Some(&preview_issue(1)));
        assert_eq!(report.preview.last(), Some(&preview_issue(20)));
    }

    #[test]
    fn report_json() {
        let result = RunResult {
            total_candidates: 62,
            archived_count: 62,
            preview_issues: Vec::new(),
        };

        let report = ArchiveReport::new(RunMode::Execute, 30, Some("ENG"), &result);

        assert_eq!(
            json::to_json(&report).unwrap(),
            r#"{"ok":true,"mode":"archive","archiveAfterDays":30,"teamKey":"ENG","totalCandidates":62,"archivedCount":62,"preview":[]}"#
        );
    }

    #[tokio::test]
    async fn concurrent_run_is_rejected() {
        let state = AppState::for_test(None);
        let _running = state.run_lock.try_lock().unwrap();

        let error = super::archive_closed_issues(&state).await.err().unwrap();

        assert!(error.has_code(error_code::CONFLICT));
    }
}
