pub mod app;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod modal;
pub mod models;
pub mod state;
pub mod ui;
pub mod wizard;

pub use app::router;
pub use config::Config;
pub use gateway::Gateway;
pub use state::AppState;
