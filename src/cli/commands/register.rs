use crate::config::Config;

use super::{open_state, read_password};

pub async fn cmd_register(config: &Config, username: &str) -> anyhow::Result<()> {
    let state = open_state(config).await?;

    let password = read_password(username)?;
    let user = state.auth_service.register(username, &password).await?;
    println!("✓ Registered '{}' (ID: {})", user.username, user.user_id);

    Ok(())
}
