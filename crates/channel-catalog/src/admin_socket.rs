//! Unix socket server for admin commands.
//!
//! The catalog's write path: one JSON command per line in, one JSON response
//! per line out.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::export::DEFAULT_EXPORT_FILE;
use crate::models::ContentUpdate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

/// Admin command sent over the socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum AdminCommand {
    /// Create a content
    CreateContent {
        title: String,
        #[serde(default)]
        metadata: Option<serde_json::Value>,
        #[serde(default)]
        rating: Option<f64>,
    },
    /// Update metadata and/or rating of a content
    UpdateContent { id: u64, update: ContentUpdate },
    /// Delete a content and its references
    DeleteContent { id: u64 },
    /// Attach a file to a content
    AttachFile { content_id: u64, file_name: String },
    /// Create a group
    CreateGroup { name: String },
    /// Delete a group and untag channels
    DeleteGroup { id: u64 },
    /// Create an empty channel
    CreateChannel { title: String, language: String },
    /// Replace the contents of a channel
    SetContents {
        channel_id: u64,
        content_ids: Vec<u64>,
    },
    /// Replace the subchannels of a channel
    SetSubchannels {
        channel_id: u64,
        subchannel_ids: Vec<u64>,
    },
    /// Replace the group tags of a channel
    SetGroups { channel_id: u64, group_ids: Vec<u64> },
    /// Delete a channel and its references
    DeleteChannel { id: u64 },
    /// Check a channel's structure
    ValidateChannel { id: u64 },
    /// Compute a channel's average rating
    ChannelRating { id: u64 },
    /// Export ranked channel ratings to a file
    ExportRatings {
        #[serde(default)]
        path: Option<String>,
    },
    /// Ping (health check)
    Ping,
}

/// Response from admin command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdminResponse {
    Ok { message: String },
    Error { kind: String, error: String },
    Record { record: serde_json::Value },
    Rating { channel_id: u64, rating: Option<f64> },
    Pong,
}

impl From<Error> for AdminResponse {
    fn from(e: Error) -> Self {
        AdminResponse::Error {
            kind: e.kind().to_string(),
            error: e.to_string(),
        }
    }
}

fn record<T: Serialize>(result: Result<T>) -> AdminResponse {
    match result.and_then(|value| serde_json::to_value(value).map_err(Error::from)) {
        Ok(record) => AdminResponse::Record { record },
        Err(e) => e.into(),
    }
}

fn done(result: Result<()>, message: String) -> AdminResponse {
    match result {
        Ok(()) => AdminResponse::Ok { message },
        Err(e) => e.into(),
    }
}

/// Admin socket server.
pub struct AdminSocket {
    catalog: Arc<Catalog>,
    socket_path: PathBuf,
}

impl AdminSocket {
    /// Create a new admin socket server.
    pub fn new(catalog: Arc<Catalog>, socket_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            socket_path: socket_path.into(),
        }
    }

    /// Run the admin socket server.
    pub async fn run(&self) -> Result<()> {
        // Remove existing socket file if present
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        tracing::info!("Admin socket listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let catalog = Arc::clone(&self.catalog);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, catalog).await {
                            tracing::error!("Admin connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept admin connection: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, catalog: Arc<Catalog>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    while reader.read_line(&mut line).await? > 0 {
        let response = match serde_json::from_str::<AdminCommand>(&line) {
            Ok(cmd) => execute_command(cmd, &catalog),
            Err(e) => AdminResponse::Error {
                kind: "invalid_command".to_string(),
                error: format!("Invalid command: {}", e),
            },
        };

        let response_json = serde_json::to_string(&response)? + "\n";
        writer.write_all(response_json.as_bytes()).await?;
        line.clear();
    }

    Ok(())
}

/// Run one admin command against the catalog.
pub fn execute_command(cmd: AdminCommand, catalog: &Catalog) -> AdminResponse {
    match cmd {
        AdminCommand::CreateContent {
            title,
            metadata,
            rating,
        } => {
            let metadata = metadata.unwrap_or_else(|| serde_json::json!({}));
            record(catalog.create_content(title, metadata, rating))
        }

        AdminCommand::UpdateContent { id, update } => record(catalog.update_content(id, update)),

        AdminCommand::DeleteContent { id } => {
            done(catalog.delete_content(id), format!("Deleted content {}", id))
        }

        AdminCommand::AttachFile {
            content_id,
            file_name,
        } => record(catalog.attach_file(content_id, file_name)),

        AdminCommand::CreateGroup { name } => record(catalog.create_group(name)),

        AdminCommand::DeleteGroup { id } => {
            done(catalog.delete_group(id), format!("Deleted group {}", id))
        }

        AdminCommand::CreateChannel { title, language } => {
            record(catalog.create_channel(title, language))
        }

        AdminCommand::SetContents {
            channel_id,
            content_ids,
        } => record(catalog.set_contents(channel_id, content_ids)),

        AdminCommand::SetSubchannels {
            channel_id,
            subchannel_ids,
        } => record(catalog.set_subchannels(channel_id, subchannel_ids)),

        AdminCommand::SetGroups {
            channel_id,
            group_ids,
        } => record(catalog.set_groups(channel_id, group_ids)),

        AdminCommand::DeleteChannel { id } => {
            done(catalog.delete_channel(id), format!("Deleted channel {}", id))
        }

        AdminCommand::ValidateChannel { id } => match catalog.validate_channel(id) {
            Ok(kind) => AdminResponse::Ok {
                message: format!("Channel {} is valid ({:?})", id, kind),
            },
            Err(e) => e.into(),
        },

        AdminCommand::ChannelRating { id } => match catalog.average_rating(id) {
            Ok(rating) => AdminResponse::Rating {
                channel_id: id,
                rating,
            },
            Err(e) => e.into(),
        },

        AdminCommand::ExportRatings { path } => {
            let path = path.unwrap_or_else(|| DEFAULT_EXPORT_FILE.to_string());
            match catalog.export_ratings_to_path(&path) {
                Ok(rows) => AdminResponse::Ok {
                    message: format!("Exported {} channel ratings to {}", rows, path),
                },
                Err(e) => e.into(),
            }
        }

        AdminCommand::Ping => AdminResponse::Pong,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::catalog;
    use serde_json::json;

    fn record_id(response: AdminResponse) -> u64 {
        match response {
            AdminResponse::Record { record } => record["id"].as_u64().unwrap(),
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn command_wire_format() {
        let cmd: AdminCommand = serde_json::from_str(
            r#"{"cmd": "set_contents", "channel_id": 1, "content_ids": [2, 3]}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            AdminCommand::SetContents {
                channel_id: 1,
                content_ids: vec![2, 3]
            }
        );

        let cmd: AdminCommand = serde_json::from_str(
            r#"{"cmd": "update_content", "id": 4, "update": {"rating": null}}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            AdminCommand::UpdateContent {
                id: 4,
                update: ContentUpdate::new().with_rating(None)
            }
        );
    }

    #[test]
    fn build_and_rate_through_commands() {
        let (_dir, catalog) = catalog();
        let content = record_id(execute_command(
            AdminCommand::CreateContent {
                title: "Content 1".into(),
                metadata: Some(json!({"genre": "Comedy"})),
                rating: Some(8.5),
            },
            &catalog,
        ));
        let channel = record_id(execute_command(
            AdminCommand::CreateChannel {
                title: "Channel 1".into(),
                language: "EN".into(),
            },
            &catalog,
        ));
        execute_command(
            AdminCommand::SetContents {
                channel_id: channel,
                content_ids: vec![content],
            },
            &catalog,
        );

        assert_eq!(
            execute_command(AdminCommand::ChannelRating { id: channel }, &catalog),
            AdminResponse::Rating {
                channel_id: channel,
                rating: Some(8.5)
            }
        );
    }

    #[test]
    fn errors_carry_kind() {
        let (_dir, catalog) = catalog();
        let response = execute_command(
            AdminCommand::CreateContent {
                title: "Bad".into(),
                metadata: None,
                rating: Some(11.0),
            },
            &catalog,
        );
        assert!(matches!(
            response,
            AdminResponse::Error { ref kind, .. } if kind == "invalid_rating"
        ));

        let response = execute_command(AdminCommand::ValidateChannel { id: 1 }, &catalog);
        assert!(matches!(
            response,
            AdminResponse::Error { ref kind, .. } if kind == "not_found"
        ));
    }

    #[tokio::test]
    async fn serves_commands_over_stream() {
        let (_dir, catalog) = catalog();
        let (client, server) = UnixStream::pair().unwrap();
        let server_task = tokio::spawn(handle_connection(server, Arc::new(catalog)));

        let (reader, mut writer) = client.into_split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        writer.write_all(b"{\"cmd\": \"ping\"}\n").await.unwrap();
        reader.read_line(&mut line).await.unwrap();
        let response: AdminResponse = serde_json::from_str(&line).unwrap();
        assert_eq!(response, AdminResponse::Pong);

        line.clear();
        writer.write_all(b"not json\n").await.unwrap();
        reader.read_line(&mut line).await.unwrap();
        let response: AdminResponse = serde_json::from_str(&line).unwrap();
        assert!(matches!(response, AdminResponse::Error { .. }));

        drop(writer);
        server_task.await.unwrap().unwrap();
    }
}
