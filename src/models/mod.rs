pub mod auth;
pub mod chat;
pub mod clue;
pub mod leaderboard;
pub mod package;
pub mod profile;
pub mod side_quest;

pub use auth::*;
pub use chat::*;
pub use clue::*;
pub use leaderboard::*;
pub use package::*;
pub use profile::*;
pub use side_quest::*;
