pub mod aggregation;
mod app;
pub mod assessment;
pub mod catalog;
pub mod classifier;
pub mod db;
pub mod graph;
pub mod ingest;
pub mod oracle;
pub mod personality;
pub mod settings;
pub mod utils;

pub use app::{App, Dashboard, DATABASE_FILE, FRAMES_DIR, SETTINGS_FILE};
pub use utils::logging::init_logging;
