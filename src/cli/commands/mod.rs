mod delete_user;
mod history;
mod register;
mod search;

pub use delete_user::cmd_delete_user;
pub use history::{HistoryView, cmd_history};
pub use register::cmd_register;
pub use search::cmd_search;

use std::io::Write;

use crate::config::Config;
use crate::state::SharedState;

/// Connects and brings the schema up to date before a one-shot command.
async fn open_state(config: &Config) -> anyhow::Result<SharedState> {
    let state = SharedState::new(config.clone()).await?;
    state.store.migrate().await?;
    Ok(state)
}

fn read_password(username: &str) -> anyhow::Result<String> {
    print!("Password for '{username}': ");
    std::io::stdout().flush()?;

    let mut password = String::new();
    std::io::stdin().read_line(&mut password)?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}
