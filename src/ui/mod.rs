pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{header, section, status, success, summary_row, warn};
pub use table::{TableBuilder, render};
pub use theme::{theme, Theme};
