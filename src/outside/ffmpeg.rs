use std::{ffi::OsStr, path::Path};

use miette::{Context, IntoDiagnostic};
use tracing::debug;

use super::command::{assert_success_command, FFMPEG, FFXXX_DEFAULT_ARGS};
use crate::result::{err_msg, Result};

pub trait MetadataEmbedder {
    /// Write a free-text comment into the media container of the file, in place.
    fn embed_comment(&self, file: &Path, comment: &str) -> Result<()>;
}

/// Interface for the [ffmpeg](https://ffmpeg.org) program
#[derive(Debug)]
pub struct Ffmpeg;

impl Ffmpeg {
    /// Verify that the `ffmpeg` binary is reachable
    pub fn new() -> Result<Self> {
        assert_success_command(FFMPEG, |cmd| cmd.arg("-version"))?;

        Ok(Self)
    }
}

impl MetadataEmbedder for Ffmpeg {
    fn embed_comment(&self, file: &Path, comment: &str) -> Result<()> {
        let dir = file
            .parent()
            .ok_or_else(|| err_msg(format!("{} has no parent directory", file.display())))?;
        let extension = file
            .extension()
            .map_or(String::new(), |ext| format!(".{}", ext.to_string_lossy()));

        // Remux next to the original so that the final rename stays on the same filesystem
        let tmp = tempfile::Builder::new()
            .prefix(".embed-")
            .suffix(&extension)
            .tempfile_in(dir)
            .into_diagnostic()
            .wrap_err("Could not create tempfile")?;

        debug!("Embedding comment into {}", file.display());
        assert_success_command(FFMPEG, |cmd| {
            cmd.args(FFXXX_DEFAULT_ARGS)
                .arg("-y")
                .args([OsStr::new("-i"), file.as_os_str()])
                .args(["-map", "0"])
                .args(["-c", "copy"])
                .args(["-metadata", &format!("comment={comment}")])
                .arg(tmp.path())
        })
        .map_err(|err| err.wrap_err_with(|| "Could not remux with the comment"))?;

        tmp.persist(file)
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not replace {}", file.display()))?;

        Ok(())
    }
}
