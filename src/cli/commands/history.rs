use crate::config::Config;
use crate::db::HistoryRecord;
use crate::services::AuthError;
use crate::state::SharedState;

use super::open_state;

/// Which slice of the history to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    All,
    Popular { limit: Option<u64> },
    Keyword(String),
}

pub async fn cmd_history(config: &Config, username: &str, view: HistoryView) -> anyhow::Result<()> {
    let state = open_state(config).await?;
    show_history(&state, username, view).await
}

async fn show_history(state: &SharedState, username: &str, view: HistoryView) -> anyhow::Result<()> {
    let user = match state.auth_service.find_by_username(username).await {
        Ok(user) => user,
        Err(AuthError::UserNotFound) => anyhow::bail!("User '{username}' not found"),
        Err(e) => return Err(e.into()),
    };

    let history = &state.history_service;

    match view {
        HistoryView::Popular { limit } => {
            let top = history.top_searches(user.user_id, limit).await?;
            if top.is_empty() {
                println!("No search history.");
                return Ok(());
            }
            println!("Most found places for {}:", user.username);
            println!("{:-<70}", "");
            for (rank, entry) in top.iter().enumerate() {
                println!("{:>3}. {} ({}x)", rank + 1, entry.place_name, entry.search_count);
                println!("     {}", entry.address);
            }
        }
        HistoryView::All => {
            let records = history.get_history(user.user_id).await?;
            print_records(&format!("Search history for {}", user.username), &records);
        }
        HistoryView::Keyword(keyword) => {
            let records = history.search_by_keyword(user.user_id, &keyword).await?;
            print_records(&format!("Matches for '{}'", keyword.trim()), &records);
        }
    }

    Ok(())
}

fn print_records(title: &str, records: &[HistoryRecord]) {
    if records.is_empty() {
        println!("No search history.");
        return;
    }

    println!("{title} ({}):", records.len());
    println!("{:-<70}", "");
    for record in records {
        println!("• {}", record.place_name);
        println!("  {} | {}", record.address, record.timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn state_with_user() -> SharedState {
        let mut config = Config::default();
        config.general.database_path = "sqlite::memory:".to_string();
        config.security.argon2_memory_cost_kib = 1024;
        config.security.argon2_time_cost = 1;

        let state = SharedState::new(config).await.unwrap();
        state.store.migrate().await.unwrap();
        state
            .auth_service
            .register("traveller", "password123")
            .await
            .unwrap();
        state
    }

    #[tokio::test]
    async fn rejected_views_are_errors() {
        let state = state_with_user().await;

        assert!(
            show_history(&state, "traveller", HistoryView::Keyword("c".into()))
                .await
                .is_err()
        );
        assert!(
            show_history(&state, "traveller", HistoryView::Popular { limit: Some(0) })
                .await
                .is_err()
        );

        let err = show_history(&state, "nobody", HistoryView::All)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User 'nobody' not found");
    }

    #[tokio::test]
    async fn valid_views_succeed() {
        let state = state_with_user().await;

        show_history(&state, "traveller", HistoryView::All).await.unwrap();
        show_history(&state, "traveller", HistoryView::Popular { limit: None })
            .await
            .unwrap();
        show_history(&state, "traveller", HistoryView::Keyword("cafe".into()))
            .await
            .unwrap();
    }
}
