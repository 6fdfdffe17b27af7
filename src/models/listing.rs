//! List output shaping
//!
//! Turns a model list into quiet IDs, table rows or JSON. Malformed entries
//! (no tags, or an ID too short for a short ID) are skipped with a warning
//! instead of failing the whole listing.

use crate::errors::{ClientError, Result};
use crate::protocol::Model;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::warn;

pub const TABLE_HEADER: [&str; 7] = [
    "MODEL",
    "PARAMETERS",
    "QUANTIZATION",
    "ARCHITECTURE",
    "MODEL ID",
    "CREATED",
    "SIZE",
];

/// One row of the model table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelRow {
    pub model: String,
    pub parameters: String,
    pub quantization: String,
    pub architecture: String,
    pub id: String,
    pub created: String,
    pub size: String,
}

impl ModelRow {
    fn cells(&self) -> [&str; 7] {
        [
            self.model.as_str(),
            self.parameters.as_str(),
            self.quantization.as_str(),
            self.architecture.as_str(),
            self.id.as_str(),
            self.created.as_str(),
            self.size.as_str(),
        ]
    }
}

/// One short ID per line
pub fn quiet_ids(models: &[Model]) -> String {
    let mut out = String::new();
    for model in models {
        match model.short_id() {
            Some(short_id) => {
                out.push_str(short_id);
                out.push('\n');
            }
            None => warn!(model = %model, "invalid image ID for model"),
        }
    }
    out
}

/// Table rows relative to `now`
pub fn rows(models: &[Model], now: DateTime<Utc>) -> Vec<ModelRow> {
    models
        .iter()
        .filter_map(|model| {
            let Some(name) = model.name() else {
                warn!(model = %model, "no tags found for model");
                return None;
            };
            let Some(short_id) = model.short_id() else {
                warn!(model = %model, "invalid image ID for model");
                return None;
            };
            let created = model
                .created_at()
                .map(|created| format!("{} ago", human_duration(now - created)))
                .unwrap_or_default();

            Some(ModelRow {
                model: name.to_string(),
                parameters: model.config.parameters.clone(),
                quantization: model.config.quantization.clone(),
                architecture: model.config.architecture.clone(),
                id: short_id.to_string(),
                created,
                size: model.config.size.clone(),
            })
        })
        .collect()
}

/// Left-aligned columns separated by two spaces
pub fn format_table(rows: &[ModelRow]) -> String {
    let mut widths = TABLE_HEADER.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_line = |cells: [&str; 7]| {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    };

    push_line(TABLE_HEADER);
    for row in rows {
        push_line(row.cells());
    }
    out
}

/// Pretty-printed JSON of a model or a model list
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| ClientError::wrap("error marshaling models", e))
}

/// Approximate, human-friendly rendering of an elapsed duration
pub fn human_duration(elapsed: Duration) -> String {
    let seconds = elapsed.num_seconds();
    let minutes = elapsed.num_minutes();
    let hours = (elapsed.num_minutes() as f64 / 60.0).round() as i64;

    if seconds < 1 {
        "Less than a second".to_string()
    } else if seconds == 1 {
        "1 second".to_string()
    } else if seconds < 60 {
        format!("{} seconds", seconds)
    } else if minutes == 1 {
        "About a minute".to_string()
    } else if minutes < 60 {
        format!("{} minutes", minutes)
    } else if hours == 1 {
        "About an hour".to_string()
    } else if hours < 48 {
        format!("{} hours", hours)
    } else if hours < 24 * 7 * 2 {
        format!("{} days", hours / 24)
    } else if hours < 24 * 30 * 2 {
        format!("{} weeks", hours / 24 / 7)
    } else if hours < 24 * 365 * 2 {
        format!("{} months", hours / 24 / 30)
    } else {
        format!("{} years", hours / 24 / 365)
    }
}
