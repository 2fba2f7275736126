use anyhow::Result;
use iyaya_client::IyayaClient;
use iyaya_client::services::jobs::NewJob;

use crate::cli::{CreateJobArgs, OutputFormat};
use crate::commands::parse_params;
use crate::output::{print_jobs, print_json, print_success};

pub async fn list(client: &IyayaClient, params: &[String], format: OutputFormat) -> Result<()> {
    let filters = parse_params(params)?;
    let page = client.jobs().list(&filters).await?;
    print_jobs(&page, format);
    Ok(())
}

pub async fn mine(client: &IyayaClient, format: OutputFormat) -> Result<()> {
    let page = client.jobs().my_jobs().await?;
    print_jobs(&page, format);
    Ok(())
}

pub async fn get(client: &IyayaClient, id: &str) -> Result<()> {
    let job = client.jobs().get(id).await?;
    print_json(&job);
    Ok(())
}

pub async fn create(client: &IyayaClient, args: &CreateJobArgs) -> Result<()> {
    let job = client
        .jobs()
        .create(&NewJob {
            title: args.title.clone(),
            description: args.description.clone(),
            location: args.location.clone(),
            hourly_rate: args.rate,
        })
        .await?;
    print_success(&format!("Created job {} ({})", job.title, job.id));
    Ok(())
}

pub async fn close(client: &IyayaClient, id: &str) -> Result<()> {
    client.jobs().close(id).await?;
    print_success(&format!("Closed job {id}"));
    Ok(())
}

pub async fn delete(client: &IyayaClient, id: &str) -> Result<()> {
    client.jobs().delete(id).await?;
    print_success(&format!("Deleted job {id}"));
    Ok(())
}
