pub mod api;
pub mod config;
pub mod db;
pub mod document;
pub mod error;
pub mod extraction;
pub mod models;
pub mod review;
pub mod services;
pub mod state;

pub use api::router;
pub use state::AppState;
