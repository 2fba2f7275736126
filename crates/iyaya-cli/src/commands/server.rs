use anyhow::Result;
use iyaya_client::IyayaClient;

use crate::output::print_success;

pub async fn status(client: &IyayaClient, server: &str) -> Result<()> {
    let body = client.health().await?;
    let status = body
        .get("status")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    print_success(&format!("{server} is reachable (status: {status})"));
    Ok(())
}
