pub mod prelude;

pub mod search_history;
pub mod users;
