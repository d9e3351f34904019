use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "reqlog-cli")]
#[command(about = "Inspect and change the detail level of a running reqlog", long_about = None)]
struct Cli {
    /// Base URL of the level-control surface.
    #[arg(short, long, default_value = "http://localhost:8080/logging")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current detail level
    Level,
    /// Change the detail level (none, minimal, normal, verbose, debug)
    Set { level: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Level => {
            let res = client.get(base).send().await?;
            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: control surface returned status {}", status);
                return Ok(());
            }
            let json: Value = res.json().await?;
            println!("{}", json["level"].as_str().unwrap_or("unknown"));
        }
        Commands::Set { level } => {
            let res = client
                .put(format!("{}/set", base))
                .json(&json!({ "level": level }))
                .send()
                .await?;
            match res.status() {
                StatusCode::ACCEPTED => println!("level set to {}", level),
                StatusCode::ALREADY_REPORTED => println!("level already {}", level),
                status => {
                    eprintln!("Error: control surface returned status {}", status);
                    if let Ok(text) = res.text().await {
                        eprintln!("Response: {}", text.trim_end());
                    }
                }
            }
        }
    }

    Ok(())
}
