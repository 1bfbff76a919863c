pub mod destination_service;
pub mod query;
pub mod user_service;
