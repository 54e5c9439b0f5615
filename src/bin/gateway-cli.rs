use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the resume gateway", long_about = None)]
struct Cli {
    #[arg(short, long, env = "GATEWAY_ADMIN_URL", default_value = "http://127.0.0.1:3001")]
    url: String,

    #[arg(short, long, env = "GATEWAY_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// Show rate limiter occupancy and limits
    Limiter,
    /// Show stored artifact count and retention
    Artifacts,
    /// Reclaim expired limiter entries and artifacts now
    Sweep,
}

impl Commands {
    fn endpoint(&self) -> (Method, &'static str) {
        match self {
            Commands::Status => (Method::GET, "/admin/status"),
            Commands::Limiter => (Method::GET, "/admin/limiter"),
            Commands::Artifacts => (Method::GET, "/admin/artifacts"),
            Commands::Sweep => (Method::POST, "/admin/sweep"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let (method, path) = cli.command.endpoint();
    let res = client
        .request(method, format!("{}{}", cli.url.trim_end_matches('/'), path))
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
