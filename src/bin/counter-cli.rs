use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "counter-cli")]
#[command(about = "Command line client for the visit counter API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Service and store health
    Health,
    /// Service name, version and endpoints
    Meta,
    /// Current counter value
    Get,
    /// Increment the counter
    Incr {
        /// Number of increments to send
        #[arg(short, long, default_value_t = 1)]
        times: u32,
    },
    /// Host and store location of the serving instance
    Info,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Meta => {
            let res = client.get(format!("{}/", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Get => {
            let res = client.get(format!("{}/api/counter", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Incr { times } => {
            for _ in 0..times {
                let res = client.post(format!("{}/api/counter", base)).send().await?;
                print_response(res).await?;
            }
        }
        Commands::Info => {
            let res = client.get(format!("{}/api/info", base)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
