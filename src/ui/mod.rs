pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    dim, error, header, info, muted, section, success, summary_row, timing, warn,
};
pub use progress::{SeedProgress, Spinner};
pub use table::{TableBuilder, goals_table, stats_table};
pub use theme::{theme, Theme};
