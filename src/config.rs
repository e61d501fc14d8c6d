use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::cli::Cli;
use crate::clock::ReferenceZone;
use crate::display::NameFormat;
use crate::error::{Error, Result};
use crate::sources::FieldMapping;

/// Environment variable consulted for the Notion integration token.
pub const TOKEN_ENV: &str = "NOTION_TOKEN";

pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 60_000;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub notion_token: Option<String>,
    pub data_source_id: Option<String>,
    pub update_interval: Option<u64>,
    pub assignee_field: Option<String>,
    pub due_date_field: Option<String>,
    pub name_field: Option<String>,
    pub status_field: Option<String>,
    pub done_statuses: Option<Vec<String>>,
    pub name_format: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Clone, PartialEq)]
pub struct Config {
    pub notion_token: String,
    pub data_source_id: String,
    /// Milliseconds between fetch cycles.
    pub update_interval: u64,
    pub fields: FieldMapping,
    pub done_statuses: Vec<String>,
    pub name_format: NameFormat,
    pub timezone: ReferenceZone,
    pub once: bool,
    pub json: bool,
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notion_token: String::new(),
            data_source_id: String::new(),
            update_interval: DEFAULT_UPDATE_INTERVAL_MS,
            fields: FieldMapping::default(),
            done_statuses: vec!["Done".to_string()],
            name_format: NameFormat::default(),
            timezone: ReferenceZone::default(),
            once: false,
            json: false,
            dry_run: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("notion_token", &redact(&self.notion_token))
            .field("data_source_id", &self.data_source_id)
            .field("update_interval", &self.update_interval)
            .field("fields", &self.fields)
            .field("done_statuses", &self.done_statuses)
            .field("name_format", &self.name_format)
            .field("timezone", &self.timezone)
            .field("once", &self.once)
            .field("json", &self.json)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<redacted>" }
}

impl Config {
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = Path::new(&cli.config);
        let file_config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            parse_config(&content)?
        } else {
            return Err(Error::ConfigNotFound(config_path.to_path_buf()));
        };

        let token = resolve_token(file_config.notion_token.clone());
        merge(file_config, cli, token)
    }
}

/// The environment variable wins over the config file. A missing token is not
/// an error here; the first query fails authentication instead.
pub fn resolve_token(file_token: Option<String>) -> String {
    if let Ok(token) = std::env::var(TOKEN_ENV)
        && !token.is_empty()
    {
        return token;
    }

    file_token.unwrap_or_else(|| {
        warn!("no Notion token in ${TOKEN_ENV} or config file; queries will fail to authenticate");
        String::new()
    })
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ConfigFile) -> Result<()> {
    if let Some(interval) = config.update_interval
        && interval == 0
    {
        return Err(Error::ConfigValidation(
            "update_interval must be > 0".to_string(),
        ));
    }
    for (key, value) in [
        ("assignee_field", &config.assignee_field),
        ("due_date_field", &config.due_date_field),
        ("name_field", &config.name_field),
        ("status_field", &config.status_field),
    ] {
        if let Some(value) = value
            && value.trim().is_empty()
        {
            return Err(Error::ConfigValidation(format!("{key} must not be empty")));
        }
    }
    if let Some(ref format) = config.name_format {
        format.parse::<NameFormat>()?;
    }
    if let Some(ref timezone) = config.timezone {
        timezone.parse::<ReferenceZone>()?;
    }
    Ok(())
}

pub fn merge(file: ConfigFile, cli: &Cli, notion_token: String) -> Result<Config> {
    let defaults = FieldMapping::default();

    if cli.update_interval == Some(0) {
        return Err(Error::ConfigValidation(
            "update_interval must be > 0".to_string(),
        ));
    }

    let name_format = match cli.name_format.as_ref().or(file.name_format.as_ref()) {
        Some(format) => format.parse()?,
        None => NameFormat::default(),
    };
    let timezone = match cli.timezone.as_ref().or(file.timezone.as_ref()) {
        Some(zone) => zone.parse()?,
        None => ReferenceZone::default(),
    };

    Ok(Config {
        notion_token,
        data_source_id: cli
            .data_source_id
            .clone()
            .or(file.data_source_id)
            .unwrap_or_default(),
        update_interval: cli
            .update_interval
            .or(file.update_interval)
            .unwrap_or(DEFAULT_UPDATE_INTERVAL_MS),
        fields: FieldMapping {
            name: file.name_field.unwrap_or(defaults.name),
            status: file.status_field.unwrap_or(defaults.status),
            assignee: file.assignee_field.unwrap_or(defaults.assignee),
            due_date: file.due_date_field.unwrap_or(defaults.due_date),
        },
        done_statuses: file
            .done_statuses
            .unwrap_or_else(|| vec!["Done".to_string()]),
        name_format,
        timezone,
        once: cli.once || cli.json,
        json: cli.json,
        dry_run: cli.dry_run,
    })
}
