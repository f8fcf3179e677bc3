use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for steam-gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Admin API key.
    #[arg(short, long, env = "GATEWAY_ADMIN_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show gateway state and method count
    Status,
    /// Show cache statistics
    Cache,
    /// Show scheduler queue and cooldown
    Scheduler,
    /// Call a remote method through the gateway
    Call {
        interface: String,
        method: String,
        version: String,
        /// Query parameters as name=value
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// Bypass the cache
        #[arg(long)]
        nocache: bool,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got `{}`", raw))
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

    let res = match cli.command {
        Commands::Status => admin_get(&client, &cli.url, "status", headers).await?,
        Commands::Cache => admin_get(&client, &cli.url, "cache", headers).await?,
        Commands::Scheduler => admin_get(&client, &cli.url, "scheduler", headers).await?,
        Commands::Call {
            interface,
            method,
            version,
            mut params,
            nocache,
        } => {
            if nocache {
                params.push(("nocache".to_string(), "1".to_string()));
            }
            client
                .get(format!("{}/api/{}/{}/{}", cli.url, interface, method, version))
                .query(&params)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn admin_get(
    client: &reqwest::Client,
    base: &str,
    path: &str,
    headers: HeaderMap,
) -> Result<reqwest::Response, reqwest::Error> {
    client
        .get(format!("{}/admin/{}", base, path))
        .headers(headers)
        .send()
        .await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Some(retry) = res.headers().get("retry-after").and_then(|v| v.to_str().ok()) {
            eprintln!("Retry after: {}s", retry);
        }
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
