pub mod format;
pub mod handle;

pub use format::{format_fdv, format_money, format_price, format_qty};
pub use handle::sanitize_handle;
