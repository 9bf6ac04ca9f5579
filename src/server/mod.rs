pub mod handlers;
pub mod pipeline;
pub mod render;
pub mod router;
pub mod types;
