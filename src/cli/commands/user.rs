use clap::Subcommand;

use crate::cli::OutputFormat;
use crate::config;
use crate::database::{users, DatabaseManager};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user that profiles can be attached to")]
    Add {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Email address")]
        email: String,
    },

    #[command(about = "Show a user by id")]
    Show {
        #[arg(help = "User id")]
        id: i32,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config::config().database)?;

    let user = match cmd {
        UserCommands::Add { name, email } => users::insert_user(&pool, &name, &email).await?,
        UserCommands::Show { id } => users::find_user(&pool, id).await?,
    };

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
        OutputFormat::Text => println!("{}\t{}\t{}", user.id, user.name, user.email),
    }
    Ok(())
}
