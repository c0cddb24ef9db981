mod cli;
mod core;

use clap::{Parser, Subcommand};

use crate::core::config::AppConfig;

#[derive(Parser)]
#[command(name = "keywatch", about = "OpenRouter API key usage and limits dashboard", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format (text|json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args, Default)]
struct KeysOpts {
    /// Include disabled keys
    #[arg(long)]
    include_disabled: bool,

    /// Only show keys whose name or label contains this text
    #[arg(long)]
    filter: Option<String>,

    /// Only show keys in this state (normal|near|over)
    #[arg(long)]
    state: Option<String>,

    /// Sort order (name|usage|ratio|expiry)
    #[arg(short, long)]
    sort: Option<String>,

    /// Skip this many keys in the provider's listing
    #[arg(long)]
    offset: Option<u32>,

    /// Show remaining limit, per-window and BYOK usage
    #[arg(short, long)]
    all: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and display every API key (default)
    Keys(KeysOpts),
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init,
    /// Validate config file and report the provisioning key source
    Check,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    crate::core::logging::init(cli.verbose);

    match cli.command {
        None | Some(Commands::Keys(_)) => {
            let keys = match cli.command {
                Some(Commands::Keys(keys)) => keys,
                _ => KeysOpts::default(),
            };

            let config = AppConfig::load().unwrap_or_else(|e| {
                tracing::warn!("{}, using defaults", e);
                AppConfig::default()
            });

            let output_opts = cli::output::OutputOptions {
                format: cli::output::OutputFormat::resolve(
                    cli.json,
                    cli.format.as_deref(),
                    &config.settings.default_format,
                ),
                pretty: cli.pretty,
                use_color: cli::output::detect_color(cli.no_color, &config.settings.color),
                show_all: keys.all,
            };

            let args = cli::keys_cmd::KeysArgs {
                include_disabled: keys.include_disabled,
                filter: keys.filter,
                state: keys.state,
                sort: keys.sort,
                offset: keys.offset,
            };
            cli::keys_cmd::run(args, &config, &output_opts).await?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init => cli::config_cmd::init()?,
            ConfigAction::Check => cli::config_cmd::check()?,
            ConfigAction::Path => cli::config_cmd::path()?,
        },
    }

    Ok(())
}
