pub mod credential;
pub mod request;
pub mod roster;
pub mod settings;
pub mod shift_definition;
pub mod source_link;
pub mod tenant;
