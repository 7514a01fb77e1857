pub mod cell;
pub mod merge;

pub use cell::{CellEdit, apply_cell_edit, date_position, ensure_in_override};
pub use merge::{base_headers, merge};
