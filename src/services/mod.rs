pub mod draw_service;
pub mod user_service;

pub use draw_service::*;
pub use user_service::*;
