//! catalog-admin CLI tool
//!
//! Edits the catalog held by a running catalog-node.
//!
//! Usage:
//!   catalog-admin create-content <title> [rating] [metadata_json]
//!   catalog-admin set-rating <content_id> <rating|none>
//!   catalog-admin set-metadata <content_id> <metadata_json>
//!   catalog-admin create-channel <title> <language>
//!   catalog-admin set-contents <channel_id> [content_id ...]
//!   catalog-admin rating <channel_id>
//!   catalog-admin export [path]
//!   catalog-admin ping

use channel_catalog::admin_socket::{AdminCommand, AdminResponse};
use channel_catalog::models::ContentUpdate;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

fn print_usage() {
    eprintln!("catalog-admin - Edit a running catalog node");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  catalog-admin create-content <title> [rating] [metadata_json]");
    eprintln!("  catalog-admin set-rating <content_id> <rating|none>");
    eprintln!("  catalog-admin set-metadata <content_id> <metadata_json>");
    eprintln!("  catalog-admin delete-content <content_id>");
    eprintln!("  catalog-admin attach-file <content_id> <file_name>");
    eprintln!("  catalog-admin create-group <name>");
    eprintln!("  catalog-admin delete-group <group_id>");
    eprintln!("  catalog-admin create-channel <title> <language>");
    eprintln!("  catalog-admin set-contents <channel_id> [content_id ...]");
    eprintln!("  catalog-admin set-subchannels <channel_id> [channel_id ...]");
    eprintln!("  catalog-admin set-groups <channel_id> [group_id ...]");
    eprintln!("  catalog-admin delete-channel <channel_id>");
    eprintln!("  catalog-admin validate <channel_id>");
    eprintln!("  catalog-admin rating <channel_id>");
    eprintln!("  catalog-admin export [path]          Write ranked ratings (default: channel_ratings.csv)");
    eprintln!("  catalog-admin ping                   Check if daemon is running");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CATALOG_ADMIN_SOCKET  Path to admin socket (default: ./catalog-data/admin.sock)");
}

fn get_socket_path() -> PathBuf {
    std::env::var("CATALOG_ADMIN_SOCKET")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./catalog-data/admin.sock"))
}

fn send_command(cmd: &AdminCommand) -> Result<AdminResponse, String> {
    let socket_path = get_socket_path();

    let mut stream = UnixStream::connect(&socket_path).map_err(|e| {
        format!(
            "Failed to connect to catalog-node at {:?}: {}\n\
             Is the catalog-node running?",
            socket_path, e
        )
    })?;

    // Send command
    let cmd_json = serde_json::to_string(cmd).map_err(|e| e.to_string())?;
    writeln!(stream, "{}", cmd_json).map_err(|e| e.to_string())?;

    // Read response
    let mut reader = BufReader::new(&stream);
    let mut response_line = String::new();
    reader
        .read_line(&mut response_line)
        .map_err(|e| e.to_string())?;

    serde_json::from_str(&response_line).map_err(|e| format!("Invalid response: {}", e))
}

fn required<'a>(args: &'a [String], index: usize, what: &str) -> Result<&'a str, String> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a {} argument", args[0], what))
}

fn id(args: &[String], index: usize, what: &str) -> Result<u64, String> {
    let raw = required(args, index, what)?;
    raw.parse()
        .map_err(|_| format!("{} must be a numeric id, got {:?}", what, raw))
}

fn ids(args: &[String], from: usize) -> Result<Vec<u64>, String> {
    args.iter()
        .skip(from)
        .map(|raw| {
            raw.parse()
                .map_err(|_| format!("expected a numeric id, got {:?}", raw))
        })
        .collect()
}

fn rating(raw: &str) -> Result<Option<f64>, String> {
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| format!("rating must be a number or \"none\", got {:?}", raw))
}

fn json(raw: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid metadata JSON: {}", e))
}

/// Parse command-line arguments (without the program name).
fn parse_command(args: &[String]) -> Result<AdminCommand, String> {
    let cmd = match args[0].as_str() {
        "create-content" => AdminCommand::CreateContent {
            title: required(args, 1, "title")?.to_string(),
            rating: match args.get(2) {
                Some(raw) => rating(raw)?,
                None => None,
            },
            metadata: args.get(3).map(|raw| json(raw)).transpose()?,
        },
        "set-rating" => AdminCommand::UpdateContent {
            id: id(args, 1, "content_id")?,
            update: ContentUpdate::new().with_rating(rating(required(args, 2, "rating")?)?),
        },
        "set-metadata" => AdminCommand::UpdateContent {
            id: id(args, 1, "content_id")?,
            update: ContentUpdate::new().with_metadata(json(required(args, 2, "metadata_json")?)?),
        },
        "delete-content" => AdminCommand::DeleteContent {
            id: id(args, 1, "content_id")?,
        },
        "attach-file" => AdminCommand::AttachFile {
            content_id: id(args, 1, "content_id")?,
            file_name: required(args, 2, "file_name")?.to_string(),
        },
        "create-group" => AdminCommand::CreateGroup {
            name: required(args, 1, "name")?.to_string(),
        },
        "delete-group" => AdminCommand::DeleteGroup {
            id: id(args, 1, "group_id")?,
        },
        "create-channel" => AdminCommand::CreateChannel {
            title: required(args, 1, "title")?.to_string(),
            language: required(args, 2, "language")?.to_string(),
        },
        "set-contents" => AdminCommand::SetContents {
            channel_id: id(args, 1, "channel_id")?,
            content_ids: ids(args, 2)?,
        },
        "set-subchannels" => AdminCommand::SetSubchannels {
            channel_id: id(args, 1, "channel_id")?,
            subchannel_ids: ids(args, 2)?,
        },
        "set-groups" => AdminCommand::SetGroups {
            channel_id: id(args, 1, "channel_id")?,
            group_ids: ids(args, 2)?,
        },
        "delete-channel" => AdminCommand::DeleteChannel {
            id: id(args, 1, "channel_id")?,
        },
        "validate" => AdminCommand::ValidateChannel {
            id: id(args, 1, "channel_id")?,
        },
        "rating" => AdminCommand::ChannelRating {
            id: id(args, 1, "channel_id")?,
        },
        "export" => AdminCommand::ExportRatings {
            path: args.get(1).cloned(),
        },
        "ping" => AdminCommand::Ping,
        other => return Err(format!("Unknown command: {}", other)),
    };
    Ok(cmd)
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        print_usage();
        std::process::exit(1);
    }

    if matches!(args[0].as_str(), "-h" | "--help" | "help") {
        print_usage();
        std::process::exit(0);
    }

    let cmd = match parse_command(&args) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    match send_command(&cmd) {
        Ok(response) => match response {
            AdminResponse::Ok { message } => {
                println!("{}", message);
            }
            AdminResponse::Error { kind, error } => {
                eprintln!("Error ({}): {}", kind, error);
                std::process::exit(1);
            }
            AdminResponse::Record { record } => {
                match serde_json::to_string_pretty(&record) {
                    Ok(text) => println!("{}", text),
                    Err(_) => println!("{}", record),
                }
            }
            AdminResponse::Rating { channel_id, rating } => match rating {
                Some(rating) => println!("channel {}: {:.2}", channel_id, rating),
                None => println!("channel {}: no rating", channel_id),
            },
            AdminResponse::Pong => {
                println!("pong - catalog-node is running");
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
