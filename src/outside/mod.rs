mod command;
mod tool;
mod ytdl;

pub use command::StreamLine;
pub use ytdl::{DownloadJob, MediaTool, Ytdl};
