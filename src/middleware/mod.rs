pub mod actor;
pub mod object_id;
