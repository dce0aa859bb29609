use crate::config::Config;
use crate::services::AuthError;

use super::open_state;

pub async fn cmd_delete_user(config: &Config, username: &str) -> anyhow::Result<()> {
    let state = open_state(config).await?;

    let user = match state.auth_service.find_by_username(username).await {
        Ok(user) => user,
        Err(AuthError::UserNotFound) => anyhow::bail!("User '{username}' not found"),
        Err(e) => return Err(e.into()),
    };

    println!(
        "Delete '{}' (ID: {}) and all of their search history?",
        user.username, user.user_id
    );
    println!("Enter 'y' to confirm, anything else to cancel:");

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    if input.trim().eq_ignore_ascii_case("y") {
        state.history_service.delete_account(user.user_id).await?;
        println!("✓ Deleted: {}", user.username);
    } else {
        println!("Cancelled.");
    }

    Ok(())
}
