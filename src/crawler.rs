use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::{
    result::Result,
    site::{self, is_single_item},
    web::{absolute_link, DocumentFetcher},
};

/// Return every link of the pagination control, in document order
pub fn discover_pages(entry_url: &str, entry_document: &Html) -> Vec<String> {
    hrefs(entry_url, entry_document, site::pagination_links())
}

/// Return every listing link of a page, in document order
pub fn listing_links(page_url: &str, page: &Html) -> Vec<String> {
    hrefs(page_url, page, site::listing_links())
}

fn hrefs(page_url: &str, doc: &Html, links: &Selector) -> Vec<String> {
    doc.select(links)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| absolute_link(page_url, href))
        .collect()
}

/// Accumulate the listing URLs of every page reachable from the entry page.
///
/// A single-item permalink is its own only listing and no pagination is looked for.
/// The first page is the already fetched entry document, other pages are fetched in order.
/// Listings are concatenated in page order without deduplication.
pub fn collect_listing_urls(
    fetcher: &dyn DocumentFetcher,
    entry_url: &str,
    entry_document: &Html,
) -> Result<Vec<String>> {
    if is_single_item(entry_url) {
        debug!("Single video URL, skipping pagination");
        return Ok(vec![entry_url.to_owned()]);
    }

    let pages = discover_pages(entry_url, entry_document);
    let Some(first_page) = pages.first() else {
        debug!("No pagination found, the entry page is the only page");
        return Ok(listing_links(entry_url, entry_document));
    };

    let total_pages = pages.len();
    let mut listings = Vec::new();
    for (idx, page_url) in pages.iter().enumerate() {
        info!("Fetching links from page {} out of {total_pages}", idx + 1);

        let links = if page_url == first_page {
            listing_links(page_url, entry_document)
        } else {
            listing_links(page_url, &fetcher.fetch(page_url)?)
        };

        debug!("{} links on page {page_url}", links.len());
        listings.extend(links);
    }

    Ok(listings)
}
