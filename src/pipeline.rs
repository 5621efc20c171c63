use std::fmt::Display;

use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    config::Settings,
    crawler::collect_listing_urls,
    dispatcher::{Dispatcher, DownloadJob, Outcome},
    identity::{last_path_segment, performer_from_item_segment, VideoListing},
    ledger::Ledger,
    result::{Error, Result},
    site::is_single_item,
    web::{DocumentFetcher, LinkResolver, Resolved},
};

/// Counts of what happened to the listings of one target
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub listings: usize,
    pub downloaded: usize,
    pub already_archived: usize,
    pub unresolved: usize,
    pub dead_links: usize,
    pub failed_transfers: usize,
    pub unparsable: usize,
    pub unannotated: usize,
}

impl Summary {
    fn add(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Downloaded(_) => self.downloaded += 1,
            Outcome::AlreadyArchived => self.already_archived += 1,
            Outcome::Unresolved => self.unresolved += 1,
            Outcome::LinkDead(_) => self.dead_links += 1,
            Outcome::TransferFailed => self.failed_transfers += 1,
        }
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} listings: {} downloaded, {} already archived, {} without stream, \
            {} dead links, {} failed transfers, {} unparsable, {} not annotated",
            self.listings,
            self.downloaded,
            self.already_archived,
            self.unresolved,
            self.dead_links,
            self.failed_transfers,
            self.unparsable,
            self.unannotated,
        )
    }
}

/// Name under which the target's videos are filed and archived
pub fn performer_name(url: &str) -> String {
    let segment = last_path_segment(url);
    if is_single_item(url) {
        performer_from_item_segment(&segment)
    } else {
        segment
    }
}

/// Crawl, resolve, deduplicate, and download the videos of a target, one at a time
pub struct Pipeline<'a> {
    settings: &'a Settings,
    fetcher: &'a dyn DocumentFetcher,
    resolver: &'a dyn LinkResolver,
    dispatcher: Dispatcher<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        settings: &'a Settings,
        fetcher: &'a dyn DocumentFetcher,
        resolver: &'a dyn LinkResolver,
        dispatcher: Dispatcher<'a>,
    ) -> Self {
        Self {
            settings,
            fetcher,
            resolver,
            dispatcher,
        }
    }

    /// Process every listing of the target.
    ///
    /// Returns an error, without going further, if a page cannot be fetched
    /// or if the archive is corrupted. Problems confined to one listing are logged
    /// and counted in the summary.
    pub fn run(&self, target: &Url) -> Result<Summary> {
        let entry_url = target.as_str();
        let performer = performer_name(entry_url);
        info!("Main URL: {entry_url}");

        info!("Requesting base document");
        let entry_document = self.fetcher.fetch(entry_url)?;

        info!("Fetching performer pages");
        let listings = collect_listing_urls(self.fetcher, entry_url, &entry_document)?;
        drop(entry_document);

        let mut ledger = Ledger::open_or_create(self.settings.archive_path(&performer))?;
        info!("{} videos already archived", ledger.len());

        let mut summary = Summary {
            listings: listings.len(),
            ..Summary::default()
        };

        let total = listings.len();
        for (idx, listing_url) in listings.iter().enumerate() {
            let listing = match VideoListing::parse(&performer, listing_url) {
                Ok(listing) => listing,
                Err(err) => {
                    warn!("Skipping {listing_url}: {err}");
                    summary.unparsable += 1;
                    continue;
                }
            };

            info!("Video {} out of {total}: {}", idx + 1, listing.filename);
            debug!("Captured at {}", listing.capture_timestamp);
            match self.process(&performer, &listing, &mut ledger) {
                Ok(outcome) => {
                    debug!("{outcome}");
                    summary.add(&outcome);
                }
                Err(err @ Error::Embed { .. }) => {
                    error!("{:?}", miette::Report::from(err));
                    summary.unannotated += 1;
                }
                Err(err) => return Err(err),
            }
        }

        info!("Finished downloading {performer}");
        Ok(summary)
    }

    fn process(
        &self,
        performer: &str,
        listing: &VideoListing,
        ledger: &mut Ledger,
    ) -> Result<Outcome> {
        if ledger.contains(listing.video_id) {
            info!("Video already in archive");
            return Ok(Outcome::AlreadyArchived);
        }

        info!("Intercepting from: {}", listing.listing_url);
        let Resolved {
            stream_url,
            source_site,
        } = self.resolver.resolve(&listing.listing_url)?;

        let Some(stream_url) = stream_url else {
            error!("Could not get video link");
            return Ok(Outcome::Unresolved);
        };
        debug!("Stream: {stream_url}");

        let job = DownloadJob {
            listing,
            performer,
            stream_url,
            source_site,
        };
        self.dispatcher.dispatch(&job, ledger)
    }
}
