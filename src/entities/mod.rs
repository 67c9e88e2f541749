pub mod businesses;
pub mod draw_participants;
pub mod draws;
pub mod users;

pub use businesses as business_entity;
pub use draw_participants as draw_participant_entity;
pub use draws as draw_entity;
pub use draws::{DrawStatus, DrawType};
pub use users as user_entity;
pub use users::UserRole;
