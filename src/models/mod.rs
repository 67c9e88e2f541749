pub mod common;
pub mod draw;
pub mod user;

pub use common::*;
pub use draw::*;
pub use user::*;
