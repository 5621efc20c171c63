use scraper::{ElementRef, Html};
use tracing::{debug, warn};

use super::{absolute_link, DocumentFetcher};
use crate::{
    result::Result,
    site::{embed_frames, player_source, player_video, source_site_link},
};

/// What could be found behind a listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    /// Direct URL of the media stream. `None` when the video is gone
    pub stream_url: Option<String>,

    /// Name of the site the video was captured from
    pub source_site: Option<String>,
}

/// Interface for turning a listing into a downloadable stream
pub trait LinkResolver {
    /// Find the stream behind the listing.
    ///
    /// A missing stream is not an error. Failing to fetch the listing page is.
    fn resolve(&self, listing_url: &str) -> Result<Resolved>;
}

/// Resolver reading the static HTML of the listing page and of its embedded frames
pub struct SitePageResolver<'a> {
    fetcher: &'a dyn DocumentFetcher,
}

impl<'a> SitePageResolver<'a> {
    pub fn new(fetcher: &'a dyn DocumentFetcher) -> Self {
        Self { fetcher }
    }

    /// Look inside the embedded frames, in document order, until one has a player
    fn stream_from_frames(&self, listing_url: &str, doc: &Html) -> Option<String> {
        let frames: Vec<String> = doc
            .select(embed_frames())
            .filter_map(|el| el.value().attr("src"))
            .filter_map(|src| absolute_link(listing_url, src))
            .collect();

        for frame_url in frames {
            debug!("Looking for the player in frame {frame_url}");
            match self.fetcher.fetch(&frame_url) {
                Ok(frame) => {
                    if let Some(stream) = player_stream(&frame_url, &frame) {
                        return Some(stream);
                    }
                }
                Err(err) => {
                    let report = miette::Report::from(err);
                    warn!("Could not fetch frame {frame_url}: {report}");
                }
            }
        }

        None
    }
}

impl LinkResolver for SitePageResolver<'_> {
    fn resolve(&self, listing_url: &str) -> Result<Resolved> {
        let doc = self.fetcher.fetch(listing_url)?;

        let source_site = doc
            .select(source_site_link())
            .next()
            .map(element_text)
            .filter(|s| !s.is_empty());

        let stream_url = player_stream(listing_url, &doc)
            .or_else(|| self.stream_from_frames(listing_url, &doc));

        Ok(Resolved {
            stream_url,
            source_site,
        })
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_owned()
}

/// Find the `src` of the player video, either on the element itself or on its sources
fn player_stream(page_url: &str, doc: &Html) -> Option<String> {
    let video = doc.select(player_video()).filter_map(|el| el.value().attr("src"));
    let sources = doc.select(player_source()).filter_map(|el| el.value().attr("src"));

    video
        .chain(sources)
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .find_map(|src| absolute_link(page_url, src))
}
