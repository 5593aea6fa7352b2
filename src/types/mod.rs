mod models;
mod permission;

pub use models::{Import, User, Version};
pub use permission::{Access, Identity};
