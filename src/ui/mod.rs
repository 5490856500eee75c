pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{header, info, section, success, warn};
pub use table::{petition_table, signature_table, stats_table, TableBuilder};
pub use theme::{theme, Theme};
