pub mod active_activity_row;
pub mod binding_row;

pub use active_activity_row::{ActiveActivityRow, NewActiveActivityRow};
pub use binding_row::{BindingRow, NewBindingRow};
