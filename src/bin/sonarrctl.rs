//! Small command line harness around the Sonarr client.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sonarr_provider::sonarr::{AddOptions, Series, SonarrClient};

#[derive(Parser)]
#[command(name = "sonarrctl")]
#[command(version)]
#[command(about = "Talk to a Sonarr instance from the command line", long_about = None)]
struct Cli {
    /// Sonarr base URL
    #[arg(long, env = "SONARR_URL")]
    url: String,

    /// Sonarr API key
    #[arg(long, env = "SONARR_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Log debug output to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the instance's system status
    Status,

    /// Manage series
    #[command(subcommand)]
    Series(SeriesCommand),
}

#[derive(Subcommand)]
enum SeriesCommand {
    /// List every series in the library
    List,

    /// Show one series
    Get {
        /// Series id
        id: i32,
    },

    /// Search TVDB through Sonarr
    Lookup {
        /// Search term
        term: String,
    },

    /// Add a series to the library
    Add {
        /// TVDB id of the series
        #[arg(long)]
        tvdb_id: i32,

        /// Root folder path
        #[arg(long)]
        path: String,

        /// Quality profile id
        #[arg(long)]
        quality_profile: i32,

        /// Episodes to monitor: all, future, missing, ...
        #[arg(long)]
        monitor: Option<String>,
    },

    /// Remove a series
    Delete {
        /// Series id
        id: i32,

        /// Also delete the files on disk
        #[arg(long)]
        delete_files: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    sonarr_provider::init_logging_with_default(if cli.debug { "debug" } else { "warn" });

    let client = SonarrClient::new(cli.url, cli.api_key).context("Failed to create Sonarr client")?;

    match cli.command {
        Command::Status => {
            let status = client
                .get_system_status()
                .await
                .context("Unable to communicate with Sonarr")?;
            eprintln!("{}", status);
            print_json(&status)
        }
        Command::Series(SeriesCommand::List) => {
            let series = client.get_all_series().await.context("Failed to list series")?;
            print_json(&series)
        }
        Command::Series(SeriesCommand::Get { id }) => {
            let series = client
                .get_series(id)
                .await
                .context("Failed to get series")?
                .with_context(|| format!("No series with id {}", id))?;
            print_json(&series)
        }
        Command::Series(SeriesCommand::Lookup { term }) => {
            let results = client
                .lookup_series(&term)
                .await
                .context("Failed to look up series")?;
            print_json(&results)
        }
        Command::Series(SeriesCommand::Add {
            tvdb_id,
            path,
            quality_profile,
            monitor,
        }) => {
            let request = Series {
                tvdb_id,
                root_folder_path: path,
                quality_profile_id: quality_profile,
                monitored: true,
                add_options: monitor.map(|monitor| AddOptions { monitor }),
                ..Default::default()
            };
            let created = client
                .create_series(&request)
                .await
                .context("Failed to add series")?;
            print_json(&created)
        }
        Command::Series(SeriesCommand::Delete { id, delete_files }) => {
            client
                .delete_series(id, delete_files)
                .await
                .context("Failed to delete series")?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
    }
}
