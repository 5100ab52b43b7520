use std::fmt::Display;
use std::fmt::Formatter;

use framework::exception::CoreRsResult;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::filter::IssueFilter;

pub const PREVIEW_LIMIT: usize = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default)]
pub struct IssuePage {
    pub issues: Vec<Issue>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Remote issue tracker the archive run reads from and mutates.
pub trait IssueTracker {
    fn list_issues(
        &self,
        filter: &IssueFilter,
        page_size: usize,
        cursor: Option<&str>,
    ) -> impl Future<Output = CoreRsResult<IssuePage>> + Send;

    fn archive_issue(&self, id: &str) -> impl Future<Output = CoreRsResult<()>> + Send;
}

/// Observes a run without affecting it.
pub trait ArchiveListener {
    fn on_page_fetched(&self) {}

    fn on_issue_processed(&self, _message: &str) {}
}

impl ArchiveListener for () {}

pub struct LogListener;

impl ArchiveListener for LogListener {
    fn on_page_fetched(&self) {
        debug!("fetch issue page");
    }

    fn on_issue_processed(&self, message: &str) {
        info!("{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunMode {
    #[serde(rename = "dry-run")]
    Preview,
    #[serde(rename = "archive")]
    Execute,
}

impl RunMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { RunMode::Preview } else { RunMode::Execute }
    }
}

impl Display for RunMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Preview => write!(f, "dry-run"),
            RunMode::Execute => write!(f, "archive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewIssue {
    pub id: String,
    pub identifier: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Default)]
pub struct RunResult {
    pub total_candidates: usize,
    pub archived_count: usize,
    pub preview_issues: Vec<PreviewIssue>,
}

impl RunResult {
    /// First issues in fetch order, at most [`PREVIEW_LIMIT`].
    pub fn preview_sample(&self) -> &[PreviewIssue] {
        let end = self.preview_issues.len().min(PREVIEW_LIMIT);
        self.preview_issues.get(..end).unwrap_or_default()
    }
}

/// Lists every issue matching `filter` and archives it, or only collects it in preview mode.
///
/// Preview pages forward with the cursor of the previous page. Execute mode always asks
/// for the first page again, archived issues drop out of the filter so the next
/// candidates move to the front.
pub async fn run<T, L>(
    tracker: &T,
    filter: &IssueFilter,
    mode: RunMode,
    page_size: usize,
    listener: &L,
) -> CoreRsResult<RunResult>
where
    T: IssueTracker,
    L: ArchiveListener,
{
    let mut result = RunResult::default();
    let mut cursor: Option<String> = None;

    loop {
        listener.on_page_fetched();
        let request_cursor = match mode {
            RunMode::Preview => cursor.as_deref(),
            RunMode::Execute => None,
        };
        let IssuePage {
            issues,
            end_cursor,
            has_next_page,
        } = tracker.list_issues(filter, page_size, request_cursor).await?;

        if issues.is_empty() {
            break;
        }
        let fetched = issues.len();
        result.total_candidates += fetched;
        debug!(fetched, "stats");

        let mut archived_in_page = 0;
        for issue in issues {
            let Some(id) = issue.id.filter(|id| !id.is_empty()) else {
                continue;
            };
            match mode {
                RunMode::Preview => {
                    listener.on_issue_processed(&format!(
                        "[Dry Run] Would archive: {} - {}",
                        issue.identifier, issue.title
                    ));
                    result.preview_issues.push(PreviewIssue {
                        id,
                        identifier: issue.identifier,
                        title: issue.title,
                        url: issue.url,
                    });
                }
                RunMode::Execute => {
                    tracker.archive_issue(&id).await?;
                    listener.on_issue_processed(&format!("[Archived] {} - {}", issue.identifier, issue.title));
                    result.archived_count += 1;
                    archived_in_page += 1;
                }
            }
        }

        match mode {
            RunMode::Preview => {
                if !has_next_page {
                    break;
                }
                if end_cursor.is_none() {
                    warn!("next page reported without end cursor, stop paging");
                    break;
                }
                cursor = end_cursor;
            }
            RunMode::Execute => {
                if fetched < page_size {
                    break;
                }
                // nothing left the filter, the front page would come back unchanged
                if archived_in_page == 0 {
                    warn!(fetched, "no issue archived in full page, stop paging");
                    break;
                }
            }
        }
    }

    Ok(result)
}
