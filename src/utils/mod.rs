pub mod jwt;
pub mod pagination;
pub mod validation;

pub use jwt::*;
pub use pagination::*;
