use clap::Subcommand;

use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Print the configuration after env overrides (secrets omitted)")]
    Show,
}

pub fn handle(cmd: ConfigCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let config = config::config();
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
                OutputFormat::Text => {
                    println!("environment: {:?}", config.environment);
                    println!("port:        {}", config.api.port);
                    println!("in_memory:   {}", config.database.in_memory);
                    println!("upload:      {}", match config.upload.cloudinary_credentials() {
                        Some((cloud, _, _)) => format!("cloudinary ({})", cloud),
                        None => "disabled".to_string(),
                    });
                }
            }
            Ok(())
        }
    }
}
