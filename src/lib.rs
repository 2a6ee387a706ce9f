pub mod app;
pub mod collector;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod state;
pub mod store;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use store::Store;
