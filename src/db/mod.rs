mod connection;
pub mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use connection::Database;
pub use repositories::frames::FrameInsert;
pub use repositories::sessions::CompletionError;
