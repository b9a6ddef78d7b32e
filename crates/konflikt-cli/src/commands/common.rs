use std::env;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use konflikt_core::db::{Database, SqliteStorage, Storage};
use konflikt_core::{ConflictId, ConflictRecord, ConflictService, EngineConfig};
use serde::Serialize;

use crate::error::CliError;

/// Paths and engine settings shared by every command
#[derive(Debug, Clone)]
pub struct CliContext {
    pub db_path: PathBuf,
    pub config: EngineConfig,
}

#[derive(Debug, Serialize)]
pub struct ConflictListItem {
    pub id: String,
    pub table: String,
    pub record_id: String,
    pub title: String,
    pub fields: Vec<String>,
    pub detected_at: String,
    pub relative_time: String,
    pub status: String,
    pub resolution: Option<String>,
    pub resolved_at: Option<String>,
}

pub fn open_database(path: &Path) -> Result<Database, CliError> {
    Ok(Database::open(path)?)
}

/// Build a service over `db` that logs every event it emits.
pub fn open_service<'a>(
    db: &'a Database,
    config: &EngineConfig,
) -> ConflictService<SqliteStorage<'a>> {
    let mut service =
        ConflictService::with_config(SqliteStorage::new(db.connection()), config.clone());
    service.subscribe(|event| tracing::debug!(event = event.name(), "Conflict event"));
    service
}

pub fn normalize_conflict_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyConflictId)
    } else {
        Ok(trimmed.to_ascii_lowercase())
    }
}

/// Resolve a full conflict id or a unique id prefix.
pub fn resolve_conflict_id<S: Storage>(
    query: &str,
    service: &ConflictService<S>,
) -> Result<ConflictId, CliError> {
    if let Ok(id) = query.parse::<ConflictId>() {
        if service.get_conflict(&id).is_some() {
            return Ok(id);
        }
    }

    let matching = service
        .conflicts()
        .iter()
        .filter(|conflict| conflict.id.as_str().starts_with(query))
        .map(|conflict| conflict.id)
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Err(CliError::ConflictNotFound(query.to_string())),
        [id] => Ok(*id),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(ConflictId::as_str)
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousConflictId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn format_conflict_lines(conflicts: &[&ConflictRecord]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    conflicts
        .iter()
        .map(|conflict| {
            let id = conflict.id.to_string();
            let short_id = id.chars().take(13).collect::<String>();
            let target = format!("{}/{}", conflict.table, conflict.record_id);
            let title = truncate(&conflict.record_title, 30);
            let relative_time =
                format_relative_time(conflict.detected_at.timestamp_millis(), now_ms);

            format!(
                "{short_id:<13}  {target:<24}  {title:<30}  {:<10}  {relative_time}",
                field_summary(conflict)
            )
        })
        .collect()
}

pub fn format_history_lines(conflicts: &[&ConflictRecord]) -> Vec<String> {
    conflicts
        .iter()
        .map(|conflict| {
            let resolved_at = conflict
                .resolved_at
                .map_or_else(|| "-".to_string(), format_timestamp);
            let resolution = conflict
                .resolution
                .map_or("-", konflikt_core::Resolution::as_str);

            format!(
                "{resolved_at}  {resolution:<12}  {}/{}  {}",
                conflict.table, conflict.record_id, conflict.record_title
            )
        })
        .collect()
}

pub fn conflict_to_list_item(conflict: &ConflictRecord) -> ConflictListItem {
    let now_ms = Utc::now().timestamp_millis();

    ConflictListItem {
        id: conflict.id.to_string(),
        table: conflict.table.clone(),
        record_id: conflict.record_id.clone(),
        title: conflict.record_title.clone(),
        fields: conflict
            .conflicting_fields
            .iter()
            .map(|diff| diff.field.clone())
            .collect(),
        detected_at: conflict.detected_at.to_rfc3339(),
        relative_time: format_relative_time(conflict.detected_at.timestamp_millis(), now_ms),
        status: if conflict.is_pending() {
            "pending".to_string()
        } else {
            "resolved".to_string()
        },
        resolution: conflict.resolution.map(|resolution| resolution.to_string()),
        resolved_at: conflict.resolved_at.map(|at| at.to_rfc3339()),
    }
}

fn field_summary(conflict: &ConflictRecord) -> String {
    match conflict.conflicting_fields.len() {
        1 => "1 field".to_string(),
        count => format!("{count} fields"),
    }
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = text.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("KONFLIKT_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("konflikt")
        .join("konflikt.db")
}

pub fn resolve_config_path(cli_config_path: Option<PathBuf>) -> PathBuf {
    cli_config_path.unwrap_or_else(default_config_path)
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("konflikt")
        .join("config.json")
}

/// Config file (when present) with `KONFLIKT_*` environment overrides.
pub fn load_config(path: &Path) -> Result<EngineConfig, CliError> {
    EngineConfig::load_from_path(path)
        .and_then(EngineConfig::with_env_overrides)
        .map_err(|error| CliError::Config(format!("{}: {error}", path.display())))
}
