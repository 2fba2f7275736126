use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "iyaya")]
#[command(about = "Iyaya CLI — childcare marketplace from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server base URL (overrides config and IYAYA_API_URL env var)
    #[arg(short, long, global = true, env = "IYAYA_API_URL")]
    pub server: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "IYAYA_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session token
    Login(LoginArgs),
    /// Register a new account and sign in
    Register(RegisterArgs),
    /// Sign out (remove the stored token)
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Check server health
    Status,
    /// Job postings
    Jobs(JobsArgs),
    /// Bookings
    Bookings(BookingsArgs),
    /// Caregiver search
    Caregivers(CaregiversArgs),
    /// Job applications
    Applications(ApplicationsArgs),
    /// Conversations and messages
    Messages(MessagesArgs),
    /// Notifications
    Notifications(NotificationsArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,
    /// Account password
    #[arg(long)]
    pub password: String,
}

#[derive(clap::Args)]
pub struct RegisterArgs {
    /// Display name
    #[arg(long)]
    pub name: String,
    /// Account email
    #[arg(short, long)]
    pub email: String,
    /// Account password
    #[arg(long)]
    pub password: String,
    /// Account role (parent or caregiver)
    #[arg(long, default_value = "parent")]
    pub role: String,
}

#[derive(clap::Args)]
pub struct JobsArgs {
    #[command(subcommand)]
    pub command: JobsCommands,
}

#[derive(Subcommand)]
pub enum JobsCommands {
    /// List open jobs, with optional key=value filters (e.g. location=Makati)
    List { params: Vec<String> },
    /// List your own postings
    Mine,
    /// Show one job
    Get { id: String },
    /// Create a posting
    Create(CreateJobArgs),
    /// Close a posting
    Close { id: String },
    /// Delete a posting
    Delete { id: String },
}

#[derive(clap::Args)]
pub struct CreateJobArgs {
    /// Job title
    pub title: String,
    /// Free-form description
    #[arg(long)]
    pub description: Option<String>,
    /// Location
    #[arg(long)]
    pub location: Option<String>,
    /// Offered hourly rate
    #[arg(long)]
    pub rate: Option<f64>,
}

#[derive(clap::Args)]
pub struct BookingsArgs {
    #[command(subcommand)]
    pub command: BookingsCommands,
}

#[derive(Subcommand)]
pub enum BookingsCommands {
    /// List your bookings
    List,
    /// Show one booking
    Get { id: String },
    /// Cancel a booking
    Cancel { id: String },
}

#[derive(clap::Args)]
pub struct CaregiversArgs {
    #[command(subcommand)]
    pub command: CaregiversCommands,
}

#[derive(Subcommand)]
pub enum CaregiversCommands {
    /// Search caregivers, with optional key=value filters (e.g. skill=infant-care)
    Search { params: Vec<String> },
    /// Show one caregiver profile
    Get { id: String },
}

#[derive(clap::Args)]
pub struct ApplicationsArgs {
    #[command(subcommand)]
    pub command: ApplicationsCommands,
}

#[derive(Subcommand)]
pub enum ApplicationsCommands {
    /// List your applications
    Mine,
    /// List applications received for a job
    ForJob { job_id: String },
    /// Apply to a job
    Apply {
        job_id: String,
        /// Cover message
        #[arg(long)]
        message: Option<String>,
    },
}

#[derive(clap::Args)]
pub struct MessagesArgs {
    #[command(subcommand)]
    pub command: MessagesCommands,
}

#[derive(Subcommand)]
pub enum MessagesCommands {
    /// List conversations
    List,
    /// Show the messages of a conversation
    Show { conversation_id: String },
    /// Send a message
    Send { conversation_id: String, text: String },
    /// Poll a conversation and print new messages as they arrive
    Watch { conversation_id: String },
}

#[derive(clap::Args)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub command: NotificationsCommands,
}

#[derive(Subcommand)]
pub enum NotificationsCommands {
    /// List notifications
    List,
    /// Mark a notification read
    Read { id: String },
    /// Show the unread count
    Unread,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (server, format)
    pub key: String,
    /// Value
    pub value: String,
}
