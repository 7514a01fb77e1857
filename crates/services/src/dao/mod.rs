pub mod base;
pub mod credential;
pub mod flags;
pub mod request;
pub mod roster;
pub mod shift_definition;
pub mod source_link;
pub mod tenant;

pub use base::{BaseDao, DaoError, DaoResult};
