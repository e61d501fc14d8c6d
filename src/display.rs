use std::io::Write;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::sources::Task;

const TASKS_TEMPLATE: &str = include_str!("templates/tasks.txt");
const TASKS_TEMPLATE_NAME: &str = "tasks";

/// How an assignee's display name is shortened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameFormat {
    #[default]
    Full,
    First,
    Last,
    Initials,
}

impl FromStr for NameFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "full" => Ok(NameFormat::Full),
            "first" => Ok(NameFormat::First),
            "last" => Ok(NameFormat::Last),
            "initials" => Ok(NameFormat::Initials),
            other => Err(Error::ConfigValidation(format!(
                "unknown name_format: {other} (expected: full, first, last, initials)"
            ))),
        }
    }
}

impl NameFormat {
    pub fn apply(&self, name: &str) -> String {
        match self {
            NameFormat::Full => name.to_string(),
            NameFormat::First => name.split(' ').next().unwrap_or(name).to_string(),
            NameFormat::Last => name.rsplit(' ').next().unwrap_or(name).to_string(),
            NameFormat::Initials => name
                .split(' ')
                .filter_map(|part| part.chars().next())
                .collect(),
        }
    }
}

/// What the display shows. `loading` and an empty task list are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateData<'a> {
    pub loading: bool,
    pub tasks: &'a [Task],
}

#[derive(Serialize)]
struct RenderContext<'a> {
    loading: bool,
    empty: bool,
    tasks: &'a [Task],
}

pub trait Renderer: Send {
    fn render(&mut self, data: TemplateData<'_>) -> Result<()>;
}

/// Renders the task list as plain text to any writer (stdout in the binary).
pub struct TerminalRenderer<W: Write> {
    engine: upon::Engine<'static>,
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, name_format: NameFormat) -> Result<Self> {
        let mut engine = upon::Engine::new();
        engine.add_filter("name", move |name: String| name_format.apply(&name));
        engine
            .add_template(TASKS_TEMPLATE_NAME, TASKS_TEMPLATE)
            .map_err(|e| Error::Render(format!("failed to compile task template: {e}")))?;
        Ok(Self { engine, out })
    }

    pub fn render_to_string(&self, data: TemplateData<'_>) -> Result<String> {
        let context = RenderContext {
            loading: data.loading,
            empty: data.tasks.is_empty(),
            tasks: data.tasks,
        };
        self.engine
            .get_template(TASKS_TEMPLATE_NAME)
            .ok_or_else(|| Error::Render(format!("template not found: {TASKS_TEMPLATE_NAME}")))?
            .render(&context)
            .to_string()
            .map_err(|e| Error::Render(format!("failed to render tasks: {e}")))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn render(&mut self, data: TemplateData<'_>) -> Result<()> {
        let text = self.render_to_string(data)?;
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}
