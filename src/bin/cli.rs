//! LandLedger CLI
//!
//! Command-line interface for registry operations over the HTTP API:
//! - Inspect properties, sales and bids
//! - Check wallet roles
//! - Send and read chat messages
//! - Trigger chat backups
//! - Generate a config file

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "landledger")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Blockchain land registry service CLI")]
#[command(
    long_about = "LandLedger talks to a running landledger service.\nInspect the registry, rank bids, check roles, and read chat without a dashboard."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8086", global = true)]
    pub api_url: String,

    /// Output format (plain, json)
    #[arg(short, long, default_value = "plain", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a property record
    Property {
        /// Property id
        id: u64,
    },

    /// List properties owned by a wallet
    Owner {
        /// Owner wallet address
        address: String,
    },

    /// List all sales
    Sales,

    /// Show the ranked bids of a sale
    Bids {
        /// Sale id
        id: u64,
    },

    /// Show the derived role of a wallet
    Role {
        /// Wallet address
        address: String,
    },

    /// Show a wallet's profile document
    Profile {
        /// Wallet address
        address: String,
    },

    /// Read a conversation
    Chat {
        /// First participant
        a: String,
        /// Second participant
        b: String,
    },

    /// Send a chat message
    Send {
        /// Sender wallet address
        #[arg(long)]
        from: String,
        /// Recipient wallet address
        #[arg(long)]
        to: String,
        /// Message content
        content: String,
    },

    /// Show a wallet's inbox
    Inbox {
        /// Wallet address
        address: String,
    },

    /// Show service health and chat sync status
    Status,

    /// Trigger a chat cloud backup cycle
    Backup,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.api_url.trim_end_matches('/');

    match cli.command {
        Commands::Property { id } => {
            let value = get_json(&client, &format!("{base}/api/v1/properties/{id}")).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print_property(&value);
            }
        }

        Commands::Owner { address } => {
            let value =
                get_json(&client, &format!("{base}/api/v1/owners/{address}/properties")).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                let empty = Vec::new();
                let list = value.as_array().unwrap_or(&empty);
                println!("{} properties", list.len());
                for p in list {
                    print_property(p);
                    println!();
                }
            }
        }

        Commands::Sales => {
            let value = get_json(&client, &format!("{base}/api/v1/sales")).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                let empty = Vec::new();
                for s in value.as_array().unwrap_or(&empty) {
                    println!(
                        "sale {}  property {}  price {} wei  state {}",
                        s["id"], s["property_id"], s["price"], s["state"]
                    );
                }
            }
        }

        Commands::Bids { id } => {
            let value = get_json(&client, &format!("{base}/api/v1/sales/{id}/bids")).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                let empty = Vec::new();
                let bids = value.as_array().unwrap_or(&empty);
                if bids.is_empty() {
                    println!("No standing bids");
                }
                for bid in bids {
                    let marker = if bid["highest"].as_bool().unwrap_or(false) {
                        "  <- highest"
                    } else {
                        ""
                    };
                    println!(
                        "{}  offers {} wei  ({}){}",
                        bid["buyer"].as_str().unwrap_or("?"),
                        bid["price"],
                        bid["state"].as_str().unwrap_or("?"),
                        marker
                    );
                }
            }
        }

        Commands::Role { address } => {
            let value = get_json(&client, &format!("{base}/api/v1/roles/{address}")).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!(
                    "{} is {}",
                    value["address"].as_str().unwrap_or("?"),
                    value["role"].as_str().unwrap_or("?")
                );
                if value["inspector"].as_bool().unwrap_or(false) {
                    println!("  inspector for location {}", value["inspector_location"]);
                }
                if value["employee"].as_bool().unwrap_or(false) {
                    println!("  employee of department {}", value["employee_department"]);
                }
            }
        }

        Commands::Profile { address } => {
            let value = get_json(&client, &format!("{base}/api/v1/users/{address}")).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }

        Commands::Chat { a, b } => {
            let value = get_json(&client, &format!("{base}/api/v1/chat/{a}/{b}")).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                let empty = Vec::new();
                for msg in value["messages"].as_array().unwrap_or(&empty) {
                    println!(
                        "[{}] {}: {}",
                        msg["timestamp"],
                        msg["sender"].as_str().unwrap_or("?"),
                        msg["content"].as_str().unwrap_or("")
                    );
                }
            }
        }

        Commands::Send { from, to, content } => {
            let body = serde_json::json!({
                "from": from,
                "to": to,
                "content": content,
            });

            let response = client
                .post(format!("{base}/api/v1/chat"))
                .json(&body)
                .send()
                .await?;

            if response.status().is_success() {
                println!("Sent");
            } else {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                eprintln!("Send failed ({status}): {text}");
                std::process::exit(1);
            }
        }

        Commands::Inbox { address } => {
            let value = get_json(&client, &format!("{base}/api/v1/inbox/{address}")).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                let empty = Vec::new();
                let entries = value.as_array().unwrap_or(&empty);
                if entries.is_empty() {
                    println!("Inbox empty");
                }
                for entry in entries {
                    println!(
                        "{}  ({} unread)  last: {}",
                        entry["partner"].as_str().unwrap_or("?"),
                        entry["unread"],
                        entry["last_message"].as_str().unwrap_or("")
                    );
                }
            }
        }

        Commands::Status => {
            let value = get_json(&client, &format!("{base}/health")).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }

        Commands::Backup => {
            let response = client
                .post(format!("{base}/api/v1/chat/backup"))
                .send()
                .await?;

            let status = response.status();
            let value: Value = response.json().await?;
            if status.is_success() {
                println!(
                    "Pinned {} conversations, {} inboxes ({} failures)",
                    value["conversations_pinned"], value["inboxes_pinned"], value["failures"]
                );
            } else {
                eprintln!("Backup failed: {}", serde_json::to_string_pretty(&value)?);
                std::process::exit(1);
            }
        }

        Commands::Config { output } => {
            let content = landledger::config::generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{content}"),
            }
        }
    }

    Ok(())
}

/// GET a JSON document, exiting nonzero on API errors
async fn get_json(client: &reqwest::Client, url: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let response = client.get(url).send().await?;
    let status = response.status();
    let value: Value = response.json().await?;

    if !status.is_success() {
        eprintln!(
            "Request failed ({status}): {}",
            value["error"]["message"].as_str().unwrap_or("unknown error")
        );
        std::process::exit(1);
    }

    Ok(value)
}

/// Pretty-print one property record
fn print_property(p: &Value) {
    println!(
        "property {}  survey {}  state {}",
        p["id"],
        p["survey_number"].as_str().unwrap_or("?"),
        p["state"].as_str().unwrap_or("?")
    );
    println!(
        "  owner {}  area {} sqm  value {} wei",
        p["owner"].as_str().unwrap_or("?"),
        p["area"],
        p["market_value"]
    );
    if let Some(reason) = p["rejection_reason"].as_str() {
        if !reason.is_empty() {
            println!("  rejected: {reason}");
        }
    }
}
