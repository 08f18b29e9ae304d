//! `pushover` - send a notification, or run the MCP server with `pushover mcp`

mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pushover_core::branding;

#[derive(Parser, Debug)]
#[command(name = "pushover")]
#[command(version = branding::VERSION)]
#[command(about = "Send push notifications via Pushover")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    send: SendArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start MCP server mode
    Mcp(McpArgs),
}

#[derive(Args, Debug, Default)]
struct SendArgs {
    /// Message to send (required)
    #[arg(short, long)]
    message: Option<String>,

    /// Message title
    #[arg(short, long)]
    title: Option<String>,

    /// Priority (-2=lowest, -1=low, 0=normal, 1=high, 2=emergency)
    #[arg(short, long, allow_negative_numbers = true)]
    priority: Option<i64>,

    /// Sound name
    #[arg(short, long)]
    sound: Option<String>,

    /// Expire time in seconds
    #[arg(short, long)]
    expire: Option<u32>,

    /// Device name
    #[arg(short, long)]
    device: Option<String>,

    /// Message and title may also be given positionally
    #[arg(value_name = "MESSAGE [TITLE]", num_args = 0..=2)]
    positional: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
enum Transport {
    #[default]
    Stdio,
    Http,
}

#[derive(Args, Debug)]
struct McpArgs {
    /// Transport mode
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Enable token authentication for HTTP transport
    #[arg(long)]
    auth_enabled: bool,

    /// Generate a token and exit
    #[arg(long)]
    generate_token: bool,

    /// Token expiration in hours (default: 744 = 31 days)
    #[arg(long, default_value_t = 744, allow_negative_numbers = true)]
    token_expiration: i64,

    /// Role for token generation
    #[arg(long, default_value = "admin")]
    token_role: String,

    /// User ID for token generation
    #[arg(long, default_value = "user1")]
    token_user_id: String,

    /// Username for token generation
    #[arg(long, default_value = "admin")]
    token_username: String,

    /// Verify a token and print its claims
    #[arg(long, value_name = "TOKEN", conflicts_with = "generate_token")]
    token_info: Option<String>,
}

/// Filter used when `RUST_LOG` is not set
fn default_env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::new("info")
        .add_directive("pushover_core=debug".parse().unwrap())
        .add_directive("pushover_gateway=debug".parse().unwrap())
        .add_directive("pushover=debug".parse().unwrap())
}

/// Logs go to stderr in every mode; stdout belongs to the stdio MCP
/// transport and to send-mode output
fn init_tracing() {
    use std::io::IsTerminal;
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_env_filter());

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Mcp(args)) => commands::mcp::run(args).await,
        None => commands::send::run(cli.send).await,
    }
}
