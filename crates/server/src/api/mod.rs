pub mod error;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod routes;
pub mod ws;

pub use error::ApiError;
pub use routes::create_router;
