mod command;
mod ffmpeg;
mod ytdl;

pub use ffmpeg::{Ffmpeg, MetadataEmbedder};
pub use ytdl::{StreamTransfer, TransferRequest, YtDlp};
