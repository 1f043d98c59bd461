pub mod metric;
pub mod record;

pub use metric::*;
pub use record::*;
