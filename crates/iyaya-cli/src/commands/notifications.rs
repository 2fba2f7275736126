use anyhow::Result;
use iyaya_client::IyayaClient;

use crate::cli::OutputFormat;
use crate::output::{print_notifications, print_success};

pub async fn list(client: &IyayaClient, format: OutputFormat) -> Result<()> {
    let notifications = client.notifications().list().await?;
    print_notifications(&notifications, format);
    Ok(())
}

pub async fn mark_read(client: &IyayaClient, id: &str) -> Result<()> {
    client.notifications().mark_read(id).await?;
    print_success(&format!("Marked notification {id} read"));
    Ok(())
}

pub async fn unread(client: &IyayaClient) -> Result<()> {
    let count = client.notifications().unread_count().await?;
    println!("{count}");
    Ok(())
}
