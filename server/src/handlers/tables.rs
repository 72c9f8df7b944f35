//! Table handlers - run engine operations against registry tables.

use chrono::Utc;
use serde::Deserialize;
use tabula_engine::{
    Command, CommandOutcome, EngineSnapshot, ExportFormat, ExportPayload, View,
};

use crate::error::Result;
use crate::registry::TableRegistry;

/// Query string for export.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    /// `csv` (default) or `json`
    #[serde(default)]
    pub format: Option<String>,
    /// Append today's date to the filename
    #[serde(default)]
    pub dated: bool,
}

/// Current view of a table.
pub async fn handle_view(registry: &TableRegistry, name: &str) -> Result<View> {
    let table = registry.get(name)?;
    let engine = table.lock().await;
    Ok(engine.view())
}

/// Apply one command to a table.
pub async fn handle_command(
    registry: &TableRegistry,
    name: &str,
    command: Command,
) -> Result<CommandOutcome> {
    let table = registry.get(name)?;
    let mut engine = table.lock().await;

    let command_name = command.name();
    let mutates = command.mutates_records();
    let outcome = engine.execute(command)?;

    if mutates {
        tracing::info!(
            table = %name,
            command = command_name,
            applied = outcome.applied,
            total = engine.len(),
            "Records changed"
        );
    } else {
        tracing::debug!(table = %name, command = command_name, "Command applied");
    }

    Ok(outcome)
}

/// Export the filtered view of a table.
pub async fn handle_export(
    registry: &TableRegistry,
    name: &str,
    query: ExportQuery,
) -> Result<ExportPayload> {
    let format: ExportFormat = query.format.as_deref().unwrap_or("csv").parse()?;

    let table = registry.get(name)?;
    let engine = table.lock().await;

    let payload = if query.dated {
        engine.export_view_dated(format, Utc::now().date_naive())?
    } else {
        engine.export_view(format)?
    };

    tracing::debug!(table = %name, filename = %payload.filename, "Exported view");
    Ok(payload)
}

/// Full state of a table.
pub async fn handle_snapshot(registry: &TableRegistry, name: &str) -> Result<EngineSnapshot> {
    let table = registry.get(name)?;
    let engine = table.lock().await;
    Ok(engine.export_state())
}

/// Replace the state of a table.
///
/// The table keeps its registry name whatever name the snapshot carries.
pub async fn handle_restore(
    registry: &TableRegistry,
    name: &str,
    mut snapshot: EngineSnapshot,
) -> Result<View> {
    let table = registry.get(name)?;
    let mut engine = table.lock().await;

    snapshot.name = name.to_string();
    engine.import_state(snapshot)?;

    tracing::info!(table = %name, records = engine.len(), "Table restored from snapshot");
    Ok(engine.view())
}
