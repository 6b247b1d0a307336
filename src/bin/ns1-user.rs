//! Reads one JSON request from stdin, applies it against NS1, and prints the
//! response document to stdout.

use anyhow::Context;
use ns1_provider::api::{handle, parse_request};
use ns1_provider::core::config::ProviderConfig;
use ns1_provider::provider::Provider;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ns1_provider::setup_logging();

    let config = ProviderConfig::from_env().map_err(anyhow::Error::msg)?;
    let provider = Provider::from_config(&config).context("building NS1 client")?;

    let mut body = String::new();
    tokio::io::stdin()
        .read_to_string(&mut body)
        .await
        .context("reading request from stdin")?;
    let request = parse_request(&body).context("parsing request")?;

    let response = handle(&provider, request).await;
    let failed = response.get("ok").and_then(serde_json::Value::as_bool) == Some(false);

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(serde_json::to_string_pretty(&response)?.as_bytes())
        .await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
