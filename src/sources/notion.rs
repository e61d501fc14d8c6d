use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::{FetchRequest, PLACEHOLDER, Task, TaskSource};

const NOTION_API_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2025-09-03";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Client abstraction (for testability)
// ---------------------------------------------------------------------------

pub trait NotionClient: Send + Sync {
    /// Run a structured query against a data source and return the raw response.
    fn query_data_source(&self, token: &str, data_source_id: &str, body: &Value)
    -> Result<Value>;
}

pub struct DefaultNotionClient {
    agent: ureq::Agent,
    base_url: String,
}

impl DefaultNotionClient {
    pub fn new() -> Self {
        Self::with_base_url(NOTION_API_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for DefaultNotionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NotionClient for DefaultNotionClient {
    fn query_data_source(
        &self,
        token: &str,
        data_source_id: &str,
        body: &Value,
    ) -> Result<Value> {
        let url = format!("{}/data_sources/{data_source_id}/query", self.base_url);

        match self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {token}"))
            .set("Notion-Version", NOTION_VERSION)
            .set("Content-Type", "application/json")
            .send_json(body)
        {
            Ok(response) => response
                .into_json()
                .map_err(|e| Error::TaskSource(format!("failed to parse Notion response: {e}"))),
            Err(ureq::Error::Status(code, response)) => Err(Error::TaskSource(format!(
                "Notion API returned {code}: {}",
                api_error_message(response)
            ))),
            Err(e) => Err(Error::TaskSource(format!("Notion API request failed: {e}"))),
        }
    }
}

/// Pull the human-readable `message` out of a Notion error body.
fn api_error_message(response: ureq::Response) -> String {
    response
        .into_json::<Value>()
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "no error message".to_string())
}

// ---------------------------------------------------------------------------
// Query construction
// ---------------------------------------------------------------------------

/// AND of one `does_not_equal` clause per done status, then the due-date
/// `on_or_before` clause.
pub fn build_filter(request: &FetchRequest) -> Value {
    let mut clauses: Vec<Value> = request
        .done_statuses
        .iter()
        .map(|done| {
            serde_json::json!({
                "property": request.fields.status,
                "status": { "does_not_equal": done },
            })
        })
        .collect();

    clauses.push(serde_json::json!({
        "property": request.fields.due_date,
        "date": { "on_or_before": request.today },
    }));

    serde_json::json!({ "and": clauses })
}

/// Full request body for the data-source query endpoint.
pub fn build_query(request: &FetchRequest) -> Value {
    serde_json::json!({
        "filter": build_filter(request),
        "sorts": [
            {
                "property": request.fields.due_date,
                "direction": "ascending",
            }
        ],
    })
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<PageNode>,
    #[serde(default)]
    has_more: bool,
}

/// Properties stay untyped: a record whose property has an unexpected shape
/// normalizes to placeholders instead of failing the whole batch.
#[derive(Debug, Clone, Deserialize)]
pub struct PageNode {
    pub id: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

pub fn normalize_page(page: &PageNode, request: &FetchRequest) -> Task {
    let fields = &request.fields;
    let property = |name: &str| page.properties.get(name);

    Task {
        id: page.id.clone(),
        name: or_placeholder(title_text(property(&fields.name))),
        status: or_placeholder(option_name(property(&fields.status))),
        assignee: or_placeholder(first_person_name(property(&fields.assignee))),
        is_past_due: is_past_due(date_start(property(&fields.due_date)), &request.today),
    }
}

/// Strictly-before comparison on the date part, so a task due today is not
/// past due even though the remote filter includes it.
pub fn is_past_due(due: Option<&str>, today: &str) -> bool {
    due.map(date_only).is_some_and(|due| due < today)
}

fn date_only(value: &str) -> &str {
    value.split_once('T').map_or(value, |(date, _)| date)
}

fn title_text(property: Option<&Value>) -> Option<&str> {
    property?
        .get("title")?
        .get(0)?
        .get("text")?
        .get("content")?
        .as_str()
}

/// Select options come first; native Notion status properties are accepted too.
fn option_name(property: Option<&Value>) -> Option<&str> {
    let property = property?;
    ["select", "status"]
        .iter()
        .find_map(|kind| property.get(*kind)?.get("name")?.as_str())
}

fn first_person_name(property: Option<&Value>) -> Option<&str> {
    property?.get("people")?.get(0)?.get("name")?.as_str()
}

fn date_start(property: Option<&Value>) -> Option<&str> {
    property?.get("date")?.get("start")?.as_str()
}

fn or_placeholder(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(PLACEHOLDER)
        .to_string()
}

// ---------------------------------------------------------------------------
// NotionSource
// ---------------------------------------------------------------------------

pub struct NotionSource {
    client: Box<dyn NotionClient>,
}

impl NotionSource {
    pub fn new() -> Self {
        Self::with_client(Box::new(DefaultNotionClient::new()))
    }

    pub fn with_client(client: Box<dyn NotionClient>) -> Self {
        Self { client }
    }
}

impl Default for NotionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSource for NotionSource {
    fn fetch_tasks(&self, request: &FetchRequest) -> Result<Vec<Task>> {
        let query = build_query(request);
        debug!(
            data_source_id = %request.data_source_id,
            today = %request.today,
            done_statuses = request.done_statuses.len(),
            "querying Notion data source"
        );

        let data =
            self.client
                .query_data_source(&request.notion_token, &request.data_source_id, &query)?;

        let response: QueryResponse = serde_json::from_value(data)
            .map_err(|e| Error::TaskSource(format!("failed to parse Notion query results: {e}")))?;

        if response.has_more {
            warn!(
                returned = response.results.len(),
                "Notion reported more results than fit in one page; showing the first page only"
            );
        }

        let tasks: Vec<Task> = response
            .results
            .iter()
            .map(|page| normalize_page(page, request))
            .collect();

        debug!(count = tasks.len(), "fetched Notion tasks");
        Ok(tasks)
    }
}
