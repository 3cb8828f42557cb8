use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::OutputFormat;
use crate::config;

pub fn handle(user_id: i32, hours: Option<u64>, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;
    let hours = hours.unwrap_or(security.jwt_expiry_hours);

    let claims = Claims::new(user_id, hours)?;
    let token = generate_jwt(&claims, &security.jwt_secret)?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "token": token, "user_id": user_id, "expires_at": claims.exp })
        ),
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
