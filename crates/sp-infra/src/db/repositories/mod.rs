mod active_activity_repo;
mod binding_repo;

pub use active_activity_repo::*;
pub use binding_repo::*;
