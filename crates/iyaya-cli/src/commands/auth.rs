use anyhow::Result;
use iyaya_client::IyayaClient;

use crate::cli::{LoginArgs, OutputFormat, RegisterArgs};
use crate::output::{print_json, print_success};

pub async fn login(client: &IyayaClient, args: &LoginArgs) -> Result<()> {
    let session = client.auth().login(&args.email, &args.password).await?;
    print_success(&format!(
        "Signed in as {} <{}>",
        session.user.name, session.user.email
    ));
    Ok(())
}

pub async fn register(client: &IyayaClient, args: &RegisterArgs) -> Result<()> {
    let session = client
        .auth()
        .register(&args.name, &args.email, &args.password, &args.role)
        .await?;
    print_success(&format!(
        "Account created, signed in as {}",
        session.user.email
    ));
    Ok(())
}

pub async fn logout(client: &IyayaClient) -> Result<()> {
    client.auth().logout().await?;
    print_success("Signed out");
    Ok(())
}

pub async fn whoami(client: &IyayaClient, format: OutputFormat) -> Result<()> {
    if !client.auth().is_signed_in() {
        println!("Not signed in.");
        return Ok(());
    }
    let profile = client.auth().profile().await?;
    match format {
        OutputFormat::Json => print_json(&profile),
        OutputFormat::Table => {
            println!("{} <{}>", profile.name, profile.email);
        }
    }
    Ok(())
}
