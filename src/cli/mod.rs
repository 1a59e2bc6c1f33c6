use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::security::SecurityDefinitions;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "user-access-api")]
#[command(about = "User REST API with role-based basic auth")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Address to bind")]
        host: Option<String>,
        #[arg(long, help = "Port to bind")]
        port: Option<u16>,
    },

    #[command(about = "Print the generated Swagger document")]
    Docs,

    #[command(about = "List the effective access rules")]
    Rules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            let mut config = config.clone();
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if config.is_production() && !config.security.docs_require_auth {
                tracing::warn!("API documentation is served without authentication in production");
            }
            crate::server::serve(&config).await
        }
        Commands::Docs => {
            let state = AppState::from_config(config)?;
            // The document is JSON regardless of the output flag
            println!("{}", serde_json::to_string_pretty(state.docs.as_ref())?);
            Ok(())
        }
        Commands::Rules => print_rules(config, output_format),
    }
}

fn print_rules(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let rules = match &config.security.definitions_file {
        Some(path) => SecurityDefinitions::load(path)?.access_rules()?,
        None => crate::security::default_access_rules()?,
    };

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rules.views())?),
        OutputFormat::Text => {
            if rules.is_empty() {
                println!("No access rules defined");
            }
            for (idx, rule) in rules.iter().enumerate() {
                println!("{:>2}. {}", idx + 1, rule);
            }
        }
    }
    Ok(())
}
