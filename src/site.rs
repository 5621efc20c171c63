//! Everything that is specific to the crawled site's markup and URL scheme.

use std::sync::OnceLock;

use scraper::Selector;

/// Tag written in front of every ID in the archive files
pub const ARCHIVE_TAG: &str = "showcamrips";

pub const DEFAULT_BASE_URL: &str = "https://www.showcamrips.com/";

/// Path component shared by every single-video permalink
const SINGLE_ITEM_PATH: &str = "/show-cam-sex-movies/";
const SINGLE_ITEM_EXT: &str = ".html";

/// Define functions returning a CSS selector parsed on first use
macro_rules! cached_selectors {
    ($($(#[$doc:meta])* $name:ident => $css:literal;)*) => {
        $(
            $(#[$doc])*
            pub fn $name() -> &'static Selector {
                static SELECTOR: OnceLock<Selector> = OnceLock::new();
                SELECTOR.get_or_init(|| Selector::parse($css).unwrap())
            }
        )*
    };
}

cached_selectors! {
    /// Links of the pagination control
    pagination_links => ".pages a[href]";

    /// Links to the video pages on a listing page
    listing_links => "a.moiclick1[href]";

    /// Link to the source site in the title block of a video page
    source_site_link => r#"span.tl h3 a[href*="/site/"]"#;

    /// Player embedded in the video page or in one of its frames
    player_video => "video#myVideo[src]";
    player_source => "video#myVideo source[src], video source[src]";

    embed_frames => "iframe[src]";
}

const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

/// Pick one of the browser user agents at random
pub fn random_user_agent() -> &'static str {
    USER_AGENTS[fastrand::usize(..USER_AGENTS.len())]
}

/// Whether the URL points to a single video instead of a performer listing
pub fn is_single_item(url: &str) -> bool {
    url.contains(SINGLE_ITEM_PATH) && url.ends_with(SINGLE_ITEM_EXT)
}

/// Make a site label usable as a directory name.
///
/// Return `None` if nothing usable remains.
pub fn sanitize_label(label: &str) -> Option<String> {
    let label = label
        .split(['/', '\\', ':', '|', '~', '$', '#', '"', '\'', '*', '?', '<', '>'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if label.chars().all(|c| c == '.') {
        None
    } else {
        Some(label)
    }
}
