use crate::sources::{FetchRequest, FieldMapping, Task};

/// Create a `Task` with sensible defaults for tests.
pub fn make_task(id: &str, is_past_due: bool) -> Task {
    Task {
        id: id.to_string(),
        name: format!("Task {id}"),
        status: "In Progress".to_string(),
        assignee: "Ada Lovelace".to_string(),
        is_past_due,
    }
}

/// Fetch request with a fixed token and data source id.
pub fn make_request(fields: FieldMapping, done_statuses: &[&str], today: &str) -> FetchRequest {
    FetchRequest {
        notion_token: "secret-token".to_string(),
        data_source_id: "data-source-id".to_string(),
        fields,
        done_statuses: done_statuses.iter().map(|s| s.to_string()).collect(),
        today: today.to_string(),
    }
}

/// A Notion page as returned by a data-source query, using the default
/// property names.
pub fn notion_page(
    id: &str,
    name: &str,
    status: &str,
    assignee: &str,
    due: Option<&str>,
) -> serde_json::Value {
    serde_json::json!({
        "object": "page",
        "id": id,
        "properties": {
            "Name": { "title": [ { "text": { "content": name } } ] },
            "Status": { "select": { "name": status } },
            "Assignee": { "people": [ { "name": assignee } ] },
            "Due": { "date": due.map(|start| serde_json::json!({ "start": start })) },
        }
    })
}
