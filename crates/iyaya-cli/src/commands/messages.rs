use std::time::Duration;

use anyhow::Result;
use iyaya_client::IyayaClient;

use crate::cli::OutputFormat;
use crate::output::{print_conversations, print_message_line, print_messages, print_success};

const WATCH_INTERVAL: Duration = Duration::from_secs(5);

pub async fn list(client: &IyayaClient, format: OutputFormat) -> Result<()> {
    let conversations = client.messaging().conversations().await?;
    print_conversations(&conversations, format);
    Ok(())
}

pub async fn show(client: &IyayaClient, conversation_id: &str, format: OutputFormat) -> Result<()> {
    let messages = client.messaging().messages(conversation_id).await?;
    print_messages(&messages, format);
    Ok(())
}

pub async fn send(client: &IyayaClient, conversation_id: &str, text: &str) -> Result<()> {
    client.messaging().send(conversation_id, text).await?;
    print_success("Message sent");
    Ok(())
}

/// Streams new messages until interrupted.
pub async fn watch(client: &IyayaClient, conversation_id: &str) -> Result<()> {
    let (mut rx, subscription) = client
        .messaging()
        .subscribe(conversation_id, WATCH_INTERVAL);
    println!("Watching conversation {conversation_id} (Ctrl-C to stop)");

    loop {
        tokio::select! {
            batch = rx.recv() => match batch {
                Some(messages) => {
                    if let Some(newest) = messages.last() {
                        print_message_line(newest);
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    subscription.unsubscribe();
    Ok(())
}
