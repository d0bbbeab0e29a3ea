//! Server-rendered pages for browsing instances and their crawls.

pub mod handlers;
pub mod render;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
