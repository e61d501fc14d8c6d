use notion_tasks::display::{NameFormat, TemplateData, TerminalRenderer};
use notion_tasks::sources::{PLACEHOLDER, Task};

fn task(id: &str, name: &str, assignee: &str, is_past_due: bool) -> Task {
    Task {
        id: id.to_string(),
        name: name.to_string(),
        status: "In Progress".to_string(),
        assignee: assignee.to_string(),
        is_past_due,
    }
}

fn render(format: NameFormat, loading: bool, tasks: &[Task]) -> String {
    TerminalRenderer::new(Vec::new(), format)
        .unwrap()
        .render_to_string(TemplateData { loading, tasks })
        .unwrap()
}

#[test]
fn loading_state_shows_loading_only() {
    let text = render(NameFormat::Full, true, &[]);
    assert_eq!(text.trim(), "Loading tasks...");
}

#[test]
fn loading_state_ignores_stale_tasks() {
    let tasks = vec![task("1", "Task 1", "User 1", false)];
    let text = render(NameFormat::Full, true, &tasks);
    assert!(text.contains("Loading"));
    assert!(!text.contains("Task 1"));
}

#[test]
fn empty_state_shows_no_tasks_message() {
    let text = render(NameFormat::Full, false, &[]);
    assert_eq!(text.trim(), "No tasks due");
}

#[test]
fn task_list_has_title_and_every_task() {
    let tasks = vec![
        task("1", "Task 1", "User 1", false),
        task("2", "Task 2", "User 2", false),
    ];
    let text = render(NameFormat::Full, false, &tasks);

    assert!(text.starts_with("Tasks"));
    assert!(text.contains("Task 1"));
    assert!(text.contains("Task 2"));
    assert!(text.contains("User 1"));
    assert!(text.contains("User 2"));
    assert!(!text.contains('!'));
}

#[test]
fn task_lines_keep_source_order() {
    let tasks = vec![
        task("1", "Overdue report", "Jordan Welch", true),
        task("2", "Standup notes", "Ada Lovelace", false),
    ];
    let text = render(NameFormat::First, false, &tasks);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Tasks");
    assert!(lines[1].starts_with('!'));
    assert!(lines[1].contains("Overdue report"));
    assert!(lines[1].contains("[In Progress]"));
    assert!(lines[1].ends_with("Jordan"));
    assert!(!lines[2].starts_with('!'));
    assert!(lines[2].ends_with("Ada"));
}

#[test]
fn last_name_and_initials_formats() {
    let tasks = vec![task("1", "Task 1", "Jordan Welch", false)];
    assert!(render(NameFormat::Last, false, &tasks).contains("Welch"));
    assert!(!render(NameFormat::Last, false, &tasks).contains("Jordan"));
    assert!(render(NameFormat::Initials, false, &tasks).contains("JW"));
}

#[test]
fn placeholder_fields_render_as_dash() {
    let tasks = vec![Task {
        id: "page-id".to_string(),
        name: PLACEHOLDER.to_string(),
        status: PLACEHOLDER.to_string(),
        assignee: PLACEHOLDER.to_string(),
        is_past_due: false,
    }];
    let text = render(NameFormat::Initials, false, &tasks);
    let line = text.lines().find(|l| l.contains("[-]")).unwrap();
    assert!(line.trim_end().ends_with('-'));
}
