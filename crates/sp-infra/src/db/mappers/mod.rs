pub mod active_activity_mapper;
pub mod binding_mapper;

pub use active_activity_mapper::ActiveActivityRowMapper;
pub use binding_mapper::BindingRowMapper;
