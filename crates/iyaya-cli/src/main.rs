mod cli;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use cli::{
    ApplicationsCommands, BookingsCommands, CaregiversCommands, Cli, Commands, ConfigCommands,
    JobsCommands, MessagesCommands, NotificationsCommands,
};
use iyaya_client::IyayaClient;
use iyaya_client::http::AssumeOnline;
use iyaya_client::token::{FileTokenStorage, StaticTokenProvider, TokenManager};
use iyaya_config::ClientConfig;
use output::print_error;

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let profile = &cli.profile;
    let format = cli.format.unwrap_or_default();

    match &cli.command {
        Commands::Login(args) => {
            let client = make_client(&cli, profile)?;
            commands::auth::login(&client, args).await?;
        }
        Commands::Register(args) => {
            let client = make_client(&cli, profile)?;
            commands::auth::register(&client, args).await?;
        }
        Commands::Logout => {
            let client = make_client(&cli, profile)?;
            commands::auth::logout(&client).await?;
        }
        Commands::Whoami => {
            let client = make_client(&cli, profile)?;
            commands::auth::whoami(&client, format).await?;
        }
        Commands::Status => {
            let server = config::resolve_server(&cli.server, profile)?;
            let client = make_client(&cli, profile)?;
            commands::server::status(&client, &server).await?;
        }
        Commands::Jobs(args) => {
            let client = make_client(&cli, profile)?;
            match &args.command {
                JobsCommands::List { params } => {
                    commands::jobs::list(&client, params, format).await?;
                }
                JobsCommands::Mine => commands::jobs::mine(&client, format).await?,
                JobsCommands::Get { id } => commands::jobs::get(&client, id).await?,
                JobsCommands::Create(create) => commands::jobs::create(&client, create).await?,
                JobsCommands::Close { id } => commands::jobs::close(&client, id).await?,
                JobsCommands::Delete { id } => commands::jobs::delete(&client, id).await?,
            }
        }
        Commands::Bookings(args) => {
            let client = make_client(&cli, profile)?;
            match &args.command {
                BookingsCommands::List => commands::bookings::list(&client, format).await?,
                BookingsCommands::Get { id } => {
                    commands::bookings::get(&client, id, format).await?;
                }
                BookingsCommands::Cancel { id } => commands::bookings::cancel(&client, id).await?,
            }
        }
        Commands::Caregivers(args) => {
            let client = make_client(&cli, profile)?;
            match &args.command {
                CaregiversCommands::Search { params } => {
                    commands::caregivers::search(&client, params, format).await?;
                }
                CaregiversCommands::Get { id } => {
                    commands::caregivers::get(&client, id, format).await?;
                }
            }
        }
        Commands::Applications(args) => {
            let client = make_client(&cli, profile)?;
            match &args.command {
                ApplicationsCommands::Mine => {
                    commands::applications::mine(&client, format).await?;
                }
                ApplicationsCommands::ForJob { job_id } => {
                    commands::applications::for_job(&client, job_id, format).await?;
                }
                ApplicationsCommands::Apply { job_id, message } => {
                    commands::applications::apply(&client, job_id, message.as_deref()).await?;
                }
            }
        }
        Commands::Messages(args) => {
            let client = make_client(&cli, profile)?;
            match &args.command {
                MessagesCommands::List => commands::messages::list(&client, format).await?,
                MessagesCommands::Show { conversation_id } => {
                    commands::messages::show(&client, conversation_id, format).await?;
                }
                MessagesCommands::Send {
                    conversation_id,
                    text,
                } => {
                    commands::messages::send(&client, conversation_id, text).await?;
                }
                MessagesCommands::Watch { conversation_id } => {
                    commands::messages::watch(&client, conversation_id).await?;
                }
            }
        }
        Commands::Notifications(args) => {
            let client = make_client(&cli, profile)?;
            match &args.command {
                NotificationsCommands::List => {
                    commands::notifications::list(&client, format).await?;
                }
                NotificationsCommands::Read { id } => {
                    commands::notifications::mark_read(&client, id).await?;
                }
                NotificationsCommands::Unread => commands::notifications::unread(&client).await?,
            }
        }
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => {
                let cfg = config::load_profile(profile)?;
                println!("{}: {}", "Profile".cyan(), profile);
                println!(
                    "{}: {}",
                    "Server".cyan(),
                    cfg.server.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "{}: {}",
                    "Format".cyan(),
                    cfg.format.as_deref().unwrap_or("json")
                );
            }
            ConfigCommands::Set(set_args) => {
                let mut cfg = config::load_profile(profile)?;
                match set_args.key.as_str() {
                    "server" => cfg.server = Some(set_args.value.clone()),
                    "format" => cfg.format = Some(set_args.value.clone()),
                    other => {
                        anyhow::bail!("Unknown config key: {other}. Valid keys: server, format")
                    }
                }
                config::save_profile(profile, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
    }

    Ok(())
}

fn make_client(cli: &Cli, profile: &str) -> Result<IyayaClient> {
    let server = config::resolve_server(&cli.server, profile)?;
    let config = ClientConfig::from_env()?.with_base_url(server);
    let tokens = TokenManager::new(
        Box::new(FileTokenStorage::for_profile(profile)?),
        Box::new(StaticTokenProvider::new(None)),
    );
    Ok(IyayaClient::with_parts(
        config,
        tokens,
        Box::new(AssumeOnline),
    )?)
}
