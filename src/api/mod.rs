pub mod error;
pub mod handlers;
pub mod server;
pub mod upstream;

pub use error::ApiError;
pub use server::{create_router, serve, AppState};
pub use upstream::UpstreamClient;
