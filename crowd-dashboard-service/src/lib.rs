pub mod app;
pub mod components;
pub mod config;
pub mod error;
pub mod html;
pub mod pages;
pub mod routes;
pub mod server;
pub mod session;

pub use app::{App, DashboardState, Health};
pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
