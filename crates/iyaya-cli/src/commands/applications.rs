use anyhow::Result;
use iyaya_client::IyayaClient;

use crate::cli::OutputFormat;
use crate::output::{print_applications, print_success};

pub async fn mine(client: &IyayaClient, format: OutputFormat) -> Result<()> {
    let applications = client.applications().my_applications().await?;
    print_applications(&applications, format);
    Ok(())
}

pub async fn for_job(client: &IyayaClient, job_id: &str, format: OutputFormat) -> Result<()> {
    let applications = client.applications().for_job(job_id).await?;
    print_applications(&applications, format);
    Ok(())
}

pub async fn apply(client: &IyayaClient, job_id: &str, message: Option<&str>) -> Result<()> {
    let application = client.applications().apply(job_id, message).await?;
    print_success(&format!(
        "Applied to job {job_id} (application {})",
        application.id
    ));
    Ok(())
}
