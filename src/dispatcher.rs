use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use miette::{Context, IntoDiagnostic};
use tracing::{info, warn};

use crate::{
    identity::VideoListing,
    ledger::Ledger,
    outside::{MetadataEmbedder, StreamTransfer, TransferRequest},
    result::{Error, Result},
    site::sanitize_label,
    web::LivenessProbe,
};

/// What happened to one listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Transferred, annotated, and recorded in the ledger
    Downloaded(PathBuf),

    /// The ledger already has the video ID
    AlreadyArchived,

    /// The resolver found no stream
    Unresolved,

    /// The stream did not answer with a 200 status.
    /// `None` if the server could not be reached.
    LinkDead(Option<u16>),

    /// The transfer could not run, or ended without producing the destination file
    TransferFailed,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Downloaded(path) => write!(f, "Saved {}", path.display()),
            Outcome::AlreadyArchived => write!(f, "Already archived"),
            Outcome::Unresolved => write!(f, "No stream found"),
            Outcome::LinkDead(Some(status)) => write!(f, "Dead link (status {status})"),
            Outcome::LinkDead(None) => write!(f, "Dead link (unreachable)"),
            Outcome::TransferFailed => write!(f, "Transfer failed"),
        }
    }
}

/// Everything needed to download one listing
#[derive(Debug)]
pub struct DownloadJob<'a> {
    pub listing: &'a VideoListing,
    pub performer: &'a str,
    pub stream_url: String,
    pub source_site: Option<String>,
}

impl DownloadJob<'_> {
    /// The listing URL, kept in the file as an audit trail
    pub fn provenance_url(&self) -> &str {
        &self.listing.listing_url
    }
}

pub struct Dispatcher<'a> {
    downloads_folder: &'a Path,
    referer: &'a str,
    probe: &'a dyn LivenessProbe,
    transfer: &'a dyn StreamTransfer,
    embedder: &'a dyn MetadataEmbedder,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        downloads_folder: &'a Path,
        referer: &'a str,
        probe: &'a dyn LivenessProbe,
        transfer: &'a dyn StreamTransfer,
        embedder: &'a dyn MetadataEmbedder,
    ) -> Self {
        Self {
            downloads_folder,
            referer,
            probe,
            transfer,
            embedder,
        }
    }

    /// Download the job's stream and record it in the ledger.
    ///
    /// The ID is recorded only once the file exists and carries its provenance.
    /// Dead links and failed transfers are reported as an [`Outcome`] and leave
    /// the ledger untouched. An error is returned if the comment could not be embedded,
    /// in which case the file stays on disk but is not recorded.
    pub fn dispatch(&self, job: &DownloadJob<'_>, ledger: &mut Ledger) -> Result<Outcome> {
        match self.probe.status(&job.stream_url) {
            Ok(200) => (),
            Ok(status) => {
                warn!("Stream answered with status {status}: {}", job.stream_url);
                return Ok(Outcome::LinkDead(Some(status)));
            }
            Err(err) => {
                let report = miette::Report::from(err);
                warn!("Stream unreachable: {report}");
                return Ok(Outcome::LinkDead(None));
            }
        }

        let destination = self.destination_dir(job).join(&job.listing.filename);
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)
                .into_diagnostic()
                .wrap_err("Could not create the download folder")?;
        }

        info!("Downloading into {}", destination.display());
        let request = TransferRequest {
            stream_url: job.stream_url.clone(),
            referer: self.referer.to_owned(),
            destination: destination.clone(),
        };
        if let Err(err) = self.transfer.transfer(&request) {
            let report = miette::Report::from(err);
            warn!("Transfer could not run: {report:?}");
            return Ok(Outcome::TransferFailed);
        }

        if !destination.exists() {
            warn!("Transfer did not produce {}", destination.display());
            return Ok(Outcome::TransferFailed);
        }

        info!("Embedding metadata");
        self.embedder
            .embed_comment(&destination, job.provenance_url())
            .map_err(|err| Error::Embed {
                file: destination.clone(),
                report: err.into(),
            })?;

        info!("Archiving {}", job.listing.video_id);
        ledger.record(job.listing.video_id)?;

        Ok(Outcome::Downloaded(destination))
    }

    /// `<downloads>/<source site>/<performer>`, or `<downloads>/<performer>`
    /// when the source site is unknown
    fn destination_dir(&self, job: &DownloadJob<'_>) -> PathBuf {
        match job.source_site.as_deref().and_then(sanitize_label) {
            Some(site) => self.downloads_folder.join(site).join(job.performer),
            None => {
                warn!(
                    "Unknown source site for {}, saving directly under the performer folder",
                    job.provenance_url()
                );
                self.downloads_folder.join(job.performer)
            }
        }
    }
}
