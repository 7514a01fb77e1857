pub mod actor;
pub mod tenant;
