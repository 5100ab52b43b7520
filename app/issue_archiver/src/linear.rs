use std::fmt::Debug;

use framework::exception;
use framework::exception::CoreRsResult;
use framework::exception::error_code;
use framework::http::HttpClient;
use framework::http::HttpClientConfig;
use framework::http::HttpRequest;
use framework::http::Method;
use framework::http::header;
use framework::json;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::Instrument;
use tracing::debug;
use tracing::debug_span;

use crate::archive::Issue;
use crate::archive::IssuePage;
use crate::archive::IssueTracker;
use crate::filter::IssueFilter;

const ISSUES_QUERY: &str = r"query Issues($first: Int!, $after: String, $filter: IssueFilter) {
  issues(first: $first, after: $after, filter: $filter) {
    nodes { id identifier title url }
    pageInfo { hasNextPage endCursor }
  }
}";

const ARCHIVE_ISSUE_MUTATION: &str = r"mutation IssueArchive($id: String!) {
  issueArchive(id: $id) { success }
}";

pub struct Linear {
    uri: String,
    api_key: String,
    client: HttpClient,
}

impl Linear {
    pub fn new(uri: &str, api_key: &str) -> CoreRsResult<Self> {
        Ok(Self {
            uri: uri.to_owned(),
            api_key: api_key.to_owned(),
            client: HttpClient::new(HttpClientConfig::default())?,
        })
    }

    async fn graphql<V, D>(&self, operation: &str, query: &'static str, variables: V) -> CoreRsResult<D>
    where
        V: Serialize + Debug,
        D: DeserializeOwned,
    {
        let mut request = HttpRequest::new(Method::POST, self.uri.clone());
        request.header(header::AUTHORIZATION, self.api_key.as_str());
        request.json_body(&GraphqlRequest { query, variables })?;
        let response = self.client.execute(request).await?;
        if response.status != 200 {
            return Err(exception!(
                code = error_code::REMOTE_SERVICE_ERROR,
                message = format!(
                    "linear request failed, operation={operation}, status={}, body={}",
                    response.status, response.body
                )
            ));
        }
        json::from_json::<GraphqlResponse<D>>(&response.body)?.data(operation)
    }
}

impl IssueTracker for Linear {
    async fn list_issues(
        &self,
        filter: &IssueFilter,
        page_size: usize,
        cursor: Option<&str>,
    ) -> CoreRsResult<IssuePage> {
        let span = debug_span!("linear");
        async {
            debug!(page_size, cursor, "list issues");
            let variables = IssuesVariables {
                first: page_size,
                after: cursor,
                filter,
            };
            let data: IssuesData = self.graphql("issues", ISSUES_QUERY, variables).await?;
            Ok(data.issues.into())
        }
        .instrument(span)
        .await
    }

    async fn archive_issue(&self, id: &str) -> CoreRsResult<()> {
        let span = debug_span!("linear");
        async {
            debug!(id, "archive issue");
            let data: IssueArchiveData = self
                .graphql("issueArchive", ARCHIVE_ISSUE_MUTATION, ArchiveVariables { id })
                .await?;
            if !data.issue_archive.success {
                return Err(exception!(
                    code = error_code::REMOTE_SERVICE_ERROR,
                    message = format!("failed to archive issue, id={id}")
                ));
            }
            Ok(())
        }
        .instrument(span)
        .await
    }
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<V> {
    query: &'static str,
    variables: V,
}

#[derive(Debug, Serialize)]
struct IssuesVariables<'a> {
    first: usize,
    after: Option<&'a str>,
    filter: &'a IssueFilter,
}

#[derive(Debug, Serialize)]
struct ArchiveVariables<'a> {
    id: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<D> {
    data: Option<D>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

impl<D> GraphqlResponse<D> {
    fn data(self, operation: &str) -> CoreRsResult<D> {
        if !self.errors.is_empty() {
            let messages: Vec<String> = self.errors.into_iter().map(|error| error.message).collect();
            return Err(exception!(
                code = error_code::REMOTE_SERVICE_ERROR,
                message = format!("linear returned errors, operation={operation}, errors={messages:?}")
            ));
        }
        self.data.ok_or_else(|| {
            exception!(
                code = error_code::REMOTE_SERVICE_ERROR,
                message = format!("linear returned no data, operation={operation}")
            )
        })
    }
}

#[derive(Debug, Deserialize)]
struct IssuesData {
    issues: IssueConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueConnection {
    nodes: Vec<Issue>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

impl From<IssueConnection> for IssuePage {
    fn from(connection: IssueConnection) -> Self {
        IssuePage {
            issues: connection.nodes,
            end_cursor: connection.page_info.end_cursor,
            has_next_page: connection.page_info.has_next_page,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueArchiveData {
    issue_archive: IssueArchivePayload,
}

#[derive(Debug, Deserialize)]
struct IssueArchivePayload {
    success: bool,
}
