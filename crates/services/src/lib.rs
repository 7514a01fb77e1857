pub mod auth;
pub mod cache;
pub mod clock;
pub mod dao;
pub mod roster;

pub use auth::PasswordService;
pub use cache::TenantCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use dao::*;
