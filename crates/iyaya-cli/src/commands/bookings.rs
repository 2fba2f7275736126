use anyhow::Result;
use iyaya_client::IyayaClient;

use crate::cli::OutputFormat;
use crate::output::{print_booking, print_bookings, print_success};

pub async fn list(client: &IyayaClient, format: OutputFormat) -> Result<()> {
    let page = client.bookings().my_bookings().await?;
    print_bookings(&page, format);
    Ok(())
}

pub async fn get(client: &IyayaClient, id: &str, format: OutputFormat) -> Result<()> {
    let booking = client.bookings().get(id).await?;
    print_booking(&booking, format);
    Ok(())
}

pub async fn cancel(client: &IyayaClient, id: &str) -> Result<()> {
    client.bookings().cancel(id).await?;
    print_success(&format!("Cancelled booking {id}"));
    Ok(())
}
