//! In-place editor updates of the page model.
//!
//! The authoring environment sends update messages of the form
//! `{ "cmd": "...", "path": "...", "data": ... }`, optionally wrapped as
//! `{ "msg": { ... } }`. Each message parses into an [`EditorCommand`] which
//! the [`EditorClient`] applies to the managed store before notifying the
//! affected listeners and emitting [`crate::PageModelEvent::Loaded`].
//!
//! Insert commands are expressed relative to an existing sibling: `path`
//! names the sibling, `data.key` the name of the new item and `data.value`
//! its model.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::manager::ModelManager;
use crate::model::Model;
use crate::path;

/// Errors raised while parsing editor messages.
#[non_exhaustive]
#[derive(Debug, Clone, Error)]
pub enum EditorError {
    /// A required message field is absent or not a string
    #[error("Not enough data received to update the page model: missing '{0}'")]
    MissingField(&'static str),

    /// The command is not one of the supported ones
    #[error("Unsupported editor command: {0}")]
    UnsupportedCommand(String),

    /// The command payload has the wrong shape
    #[error("Invalid payload for editor command '{cmd}': {reason}")]
    InvalidPayload { cmd: String, reason: String },
}

impl EditorError {
    /// Check if the message lacked a required field.
    pub fn is_missing_field(&self) -> bool {
        matches!(self, EditorError::MissingField(_))
    }

    /// Check if the command is not supported.
    pub fn is_unsupported_command(&self) -> bool {
        matches!(self, EditorError::UnsupportedCommand(_))
    }
}

// Conversion from EditorError to the main Error type
impl From<EditorError> for crate::Error {
    fn from(err: EditorError) -> Self {
        crate::Error::Editor(err)
    }
}

/// A parsed editor update.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    /// Replace the item at `path` with the `value` field of `data`
    Replace { path: String, data: Value },
    /// Delete the item at `path`
    Delete { path: String },
    /// Insert `value` as item `key` before the sibling at `path`
    InsertBefore { path: String, key: String, value: Model },
    /// Insert `value` as item `key` after the sibling at `path`
    InsertAfter { path: String, key: String, value: Model },
}

impl EditorCommand {
    /// Parses an editor message, unwrapping an optional `msg` envelope.
    pub fn from_message(message: &Value) -> Result<Self, EditorError> {
        let message = message.get("msg").unwrap_or(message);

        let cmd = non_empty_str(message, "cmd").ok_or(EditorError::MissingField("cmd"))?;
        let path = non_empty_str(message, "path")
            .ok_or(EditorError::MissingField("path"))?
            .to_string();
        let data = message.get("data").cloned().unwrap_or(Value::Null);

        match cmd {
            "replace" => Ok(EditorCommand::Replace { path, data }),
            "delete" => Ok(EditorCommand::Delete { path }),
            "insertBefore" => {
                let (key, value) = insert_payload(cmd, data)?;
                Ok(EditorCommand::InsertBefore { path, key, value })
            }
            "insertAfter" => {
                let (key, value) = insert_payload(cmd, data)?;
                Ok(EditorCommand::InsertAfter { path, key, value })
            }
            other => Err(EditorError::UnsupportedCommand(other.to_string())),
        }
    }

    /// Path the command was addressed to.
    pub fn path(&self) -> &str {
        match self {
            EditorCommand::Replace { path, .. }
            | EditorCommand::Delete { path }
            | EditorCommand::InsertBefore { path, .. }
            | EditorCommand::InsertAfter { path, .. } => path,
        }
    }
}

impl TryFrom<&Value> for EditorCommand {
    type Error = EditorError;

    fn try_from(message: &Value) -> Result<Self, Self::Error> {
        Self::from_message(message)
    }
}

fn non_empty_str<'a>(message: &'a Value, field: &str) -> Option<&'a str> {
    message
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

fn insert_payload(cmd: &str, data: Value) -> Result<(String, Model), EditorError> {
    let invalid = |reason: String| EditorError::InvalidPayload {
        cmd: cmd.to_string(),
        reason,
    };

    let Value::Object(mut data) = data else {
        return Err(invalid("data must be an object".to_string()));
    };

    let key = data
        .get("key")
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| invalid("missing 'key'".to_string()))?
        .to_string();

    let value = data
        .remove("value")
        .ok_or_else(|| invalid("missing 'value'".to_string()))?;
    let value = Model::try_from(value).map_err(|e| invalid(e.to_string()))?;

    Ok((key, value))
}

/// Applies editor commands to a [`ModelManager`].
#[derive(Debug, Clone)]
pub struct EditorClient {
    manager: Arc<ModelManager>,
}

impl EditorClient {
    pub fn new(manager: Arc<ModelManager>) -> Self {
        Self { manager }
    }

    /// Applies a command, notifies the listeners of the touched path and
    /// emits the updated tree.
    ///
    /// - `Replace` notifies the replaced path.
    /// - `Delete` and the inserts notify the parent of `path`.
    pub fn apply(&self, command: EditorCommand) -> crate::Result<()> {
        debug!(?command, "Applying editor command");

        match command {
            EditorCommand::Replace { path, data } => {
                self.manager
                    .with_store_mut(|store| store.set_data(&path, data))?;
                self.manager.notify_listeners(&path);
            }
            EditorCommand::Delete { path } => {
                self.manager.with_store_mut(|store| store.remove_data(&path))?;
                if let Some(parent) = path::parent_node_path(&path) {
                    self.manager.notify_listeners(parent);
                }
            }
            EditorCommand::InsertBefore { path, key, value } => {
                self.insert(&path, &key, value, true)?;
            }
            EditorCommand::InsertAfter { path, key, value } => {
                self.insert(&path, &key, value, false)?;
            }
        }

        self.manager.emit_loaded()?;
        Ok(())
    }

    /// Parses and applies an editor message. Failures are logged and
    /// returned.
    pub fn handle_message(&self, message: &Value) -> crate::Result<()> {
        let result = EditorCommand::from_message(message)
            .map_err(crate::Error::from)
            .and_then(|command| self.apply(command));

        if let Err(e) = &result {
            error!("Editor update not applied: {e}");
        }
        result
    }

    /// Applies every message received on `updates` until the sender side is
    /// closed. Invalid messages are logged and skipped.
    pub async fn listen(&self, mut updates: mpsc::Receiver<Value>) {
        while let Some(message) = updates.recv().await {
            // Failures are logged by handle_message
            let _ = self.handle_message(&message);
        }
        debug!("Editor update channel closed");
    }

    fn insert(
        &self,
        sibling_path: &str,
        key: &str,
        value: Model,
        insert_before: bool,
    ) -> crate::Result<()> {
        let Some(parent) = path::parent_node_path(sibling_path) else {
            warn!(sibling_path, "Sibling has no parent, item not inserted");
            return Ok(());
        };

        let sibling = path::node_name(sibling_path);
        let item_path = format!("{parent}/{key}");

        self.manager.with_store_mut(|store| {
            store.insert_data(&item_path, value, sibling, insert_before)
        })?;
        self.manager.notify_listeners(parent);
        Ok(())
    }
}
