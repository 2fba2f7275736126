use anyhow::Result;
use iyaya_client::IyayaClient;

use crate::cli::OutputFormat;
use crate::commands::parse_params;
use crate::output::{print_caregiver, print_caregivers};

pub async fn search(client: &IyayaClient, params: &[String], format: OutputFormat) -> Result<()> {
    let filters = parse_params(params)?;
    let page = client.caregivers().search(&filters).await?;
    print_caregivers(&page, format);
    Ok(())
}

pub async fn get(client: &IyayaClient, id: &str, format: OutputFormat) -> Result<()> {
    let caregiver = client.caregivers().get(id).await?;
    print_caregiver(&caregiver, format);
    Ok(())
}
