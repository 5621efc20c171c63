use std::{ffi::OsStr, path::PathBuf, process::Command};

use tracing::{debug, warn};

use super::command::{assert_success_command, run_command, Capture, YT_DLP};
use crate::{result::Result, site::random_user_agent};

/// Number of fragments downloaded concurrently
const CONCURRENT_FRAGMENTS: &str = "2";
const FILE_ACCESS_RETRIES: &str = "4";
const RETRIES: &str = "100";
/// Seconds to wait between two retries
const RETRY_SLEEP: &str = "2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub stream_url: String,

    /// Page the stream is supposed to be played from
    pub referer: String,

    pub destination: PathBuf,
}

/// Interface for transferring a stream to a file
pub trait StreamTransfer {
    /// Transfer the stream, blocking until the transfer ends.
    ///
    /// Whether the transfer succeeded is not reported here:
    /// callers must check the destination file themselves.
    /// An error means the transfer could not be started at all.
    fn transfer(&self, request: &TransferRequest) -> Result<()>;
}

/// Interface for the [yt-dlp](https://github.com/yt-dlp/yt-dlp) program
#[derive(Debug)]
pub struct YtDlp;

impl YtDlp {
    /// Verify that the `yt-dlp` binary is reachable
    pub fn new() -> Result<Self> {
        assert_success_command(YT_DLP, |cmd| cmd.arg("--version"))?;

        Ok(Self)
    }
}

/// Add the arguments of a robust transfer: bounded parallelism and retries,
/// and no truncated file if a fragment is gone for good
fn transfer_args<'c>(
    cmd: &'c mut Command,
    request: &TransferRequest,
    user_agent: &str,
) -> &'c mut Command {
    cmd.arg(&request.stream_url)
        .arg("--ignore-config")
        .args(["--user-agent", user_agent])
        .args(["--add-header", &format!("Referer: {}", request.referer)])
        .arg("--abort-on-unavailable-fragments")
        .args(["-N", CONCURRENT_FRAGMENTS])
        .args(["--file-access-retries", FILE_ACCESS_RETRIES])
        .args(["--retries", RETRIES])
        .args(["--retry-sleep", RETRY_SLEEP])
        .args([OsStr::new("-o"), request.destination.as_os_str()])
}

impl StreamTransfer for YtDlp {
    fn transfer(&self, request: &TransferRequest) -> Result<()> {
        let user_agent = random_user_agent();
        debug!("Transfer user agent: {user_agent}");

        let res = run_command(
            YT_DLP,
            |cmd| transfer_args(cmd, request, user_agent),
            Capture::empty(),
        )?;

        if !res.status.success() {
            warn!("{YT_DLP} exited with {}", res.status);
        }

        Ok(())
    }
}
