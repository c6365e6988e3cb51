mod format;
mod quality;

pub use format::MediaFormat;
pub use quality::{select_format_spec, FormatSpec};
