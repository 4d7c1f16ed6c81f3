pub mod formatter;

pub use formatter::{ResponseFormatter, ResponseView};
