use std::sync::OnceLock;

use regex::Regex;
use time::{macros::format_description, PrimitiveDateTime};
use url::Url;

use crate::result::ParseError;

/// The video ID at the start of the segment
const VIDEO_ID: &str = r"^[0-9]+";

/// A `YYYYMMDD` or `YYYY-MM-DD` date, an optional separator,
/// then a 4 to 6 digits time, at the very end of the segment
const CAPTURE_TIMESTAMP: &str = r"([0-9]{4}-?[0-9]{2}-?[0-9]{2})[-_]?([0-9]{4,6})$";

fn video_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VIDEO_ID).unwrap())
}

fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CAPTURE_TIMESTAMP).unwrap())
}

/// One crawlable item, identified by the ID and capture time encoded in its URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoListing {
    pub listing_url: String,
    pub video_id: u64,
    pub capture_timestamp: String,
    /// `<performer> - <timestamp> - <id>.mp4`
    pub filename: String,
}

impl VideoListing {
    /// Identify the listing from the last segment of its URL and name its file
    pub fn parse(performer: &str, listing_url: &str) -> Result<Self, ParseError> {
        let segment = last_path_segment(listing_url);
        let video_id = extract_video_id(&segment)?;
        let capture_timestamp = extract_timestamp(&segment)?;

        Ok(Self {
            listing_url: listing_url.to_owned(),
            video_id,
            filename: format!("{performer} - {capture_timestamp} - {video_id}.mp4"),
            capture_timestamp,
        })
    }
}

/// Return the last non-empty component of the URL path, without any `.html` suffix.
///
/// Strings that are not absolute URLs are treated as a bare path.
pub fn last_path_segment(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(url) => url.path().to_owned(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_owned(),
    };

    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    segment.strip_suffix(".html").unwrap_or(segment).to_owned()
}

pub fn extract_video_id(segment: &str) -> Result<u64, ParseError> {
    let digits = video_id_re()
        .find(segment)
        .ok_or_else(|| ParseError::NoLeadingDigits(segment.to_owned()))?
        .as_str();

    // Only ASCII digits are matched, so the only possible failure is an overflow
    digits
        .parse()
        .map_err(|_| ParseError::IdOutOfRange(digits.to_owned()))
}

/// Extract the capture timestamp at the end of the segment,
/// formatted as `YYYY-MM-DD-HH-MM-SS`.
///
/// A time with less than 6 digits is right-padded with zeroes (`1530` is `15:30:00`).
pub fn extract_timestamp(segment: &str) -> Result<String, ParseError> {
    let cap = timestamp_re()
        .captures(segment)
        .ok_or_else(|| ParseError::NoTimestampMatch(segment.to_owned()))?;

    let date = cap[1].replace('-', "");
    let digits = format!("{date}{:0<6}", &cap[2]);

    let datetime = PrimitiveDateTime::parse(
        &digits,
        format_description!("[year][month][day][hour][minute][second]"),
    )
    .map_err(|_| ParseError::InvalidDateTime(digits.clone()))?;

    datetime
        .format(format_description!(
            "[year]-[month]-[day]-[hour]-[minute]-[second]"
        ))
        .map_err(|_| ParseError::InvalidDateTime(digits))
}

/// Guess the performer name of a single-item segment, which is what remains
/// between the leading ID and the trailing timestamp.
///
/// Fall back to the whole segment if nothing remains.
pub fn performer_from_item_segment(segment: &str) -> String {
    let start = video_id_re().find(segment).map_or(0, |m| m.end());
    let end = timestamp_re()
        .find(segment)
        .map_or(segment.len(), |m| m.start())
        .max(start);

    let name = segment[start..end].trim_matches(['-', '_', ' ']);
    if name.is_empty() {
        segment.to_owned()
    } else {
        name.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_of_performer_url() {
        assert_eq!(last_path_segment("https://site/model/jane/"), "jane");
        assert_eq!(last_path_segment("https://site/model/jane"), "jane");
        assert_eq!(last_path_segment("https://site/model/jane/?page=2"), "jane");
    }

    #[test]
    fn segment_strips_html_suffix_only() {
        assert_eq!(
            last_path_segment("https://site/show-cam-sex-movies/12345-jane-20240102-153000.html"),
            "12345-jane-20240102-153000"
        );
        // Only the exact suffix goes away, not trailing letters of the set
        assert_eq!(last_path_segment("https://site/a/lmth"), "lmth");
    }

    #[test]
    fn segment_of_relative_path() {
        assert_eq!(last_path_segment("/movies/42-x-20240102-1530.html"), "42-x-20240102-1530");
    }

    #[test]
    fn compact_timestamp() {
        let segment = "12345-20240102-153000";
        assert_eq!(extract_video_id(segment), Ok(12345));
        assert_eq!(
            extract_timestamp(segment).as_deref(),
            Ok("2024-01-02-15-30-00")
        );
    }

    #[test]
    fn hyphenated_date_and_short_time() {
        let segment = "999-2024-01-02_1530";
        assert_eq!(extract_video_id(segment), Ok(999));
        assert_eq!(
            extract_timestamp(segment).as_deref(),
            Ok("2024-01-02-15-30-00")
        );
    }

    #[test]
    fn hyphens_in_date_do_not_matter() {
        let a = extract_timestamp("7-jane-2023-12-31-235959").unwrap();
        let b = extract_timestamp("7-jane-20231231-235959").unwrap();
        assert_eq!(a, "2023-12-31-23-59-59");
        assert_eq!(a, b);
    }

    #[test]
    fn five_digit_time_is_padded() {
        assert_eq!(
            extract_timestamp("1-20240102-15301").as_deref(),
            Ok("2024-01-02-15-30-10")
        );
    }

    #[test]
    fn missing_video_id() {
        assert_eq!(
            extract_video_id("jane-20240102-153000"),
            Err(ParseError::NoLeadingDigits("jane-20240102-153000".into()))
        );
    }

    #[test]
    fn missing_timestamp() {
        assert!(matches!(
            extract_timestamp("12345-jane"),
            Err(ParseError::NoTimestampMatch(_))
        ));
    }

    #[test]
    fn invalid_calendar_values() {
        assert!(matches!(
            extract_timestamp("1-20241302-153000"),
            Err(ParseError::InvalidDateTime(_))
        ));
        assert!(matches!(
            extract_timestamp("1-20240230-153000"),
            Err(ParseError::InvalidDateTime(_))
        ));
        assert!(matches!(
            extract_timestamp("1-20240102-256000"),
            Err(ParseError::InvalidDateTime(_))
        ));
    }

    #[test]
    fn oversized_video_id() {
        let segment = "184467440737095516160-jane-20240102-153000";
        assert_eq!(
            extract_video_id(segment),
            Err(ParseError::IdOutOfRange("184467440737095516160".into()))
        );
        assert_eq!(extract_video_id("18446744073709551615-x"), Ok(u64::MAX));
    }

    #[test]
    fn listing_from_url() {
        let url = "https://site/show-cam-sex-movies/12345-jane-20240102-153000.html";
        let listing = VideoListing::parse("jane", url).unwrap();

        assert_eq!(listing.listing_url, url);
        assert_eq!(listing.video_id, 12345);
        assert_eq!(listing.capture_timestamp, "2024-01-02-15-30-00");
        assert_eq!(listing.filename, "jane - 2024-01-02-15-30-00 - 12345.mp4");
    }

    #[test]
    fn listing_with_short_time_gets_padded_filename() {
        let listing =
            VideoListing::parse("jane", "https://site/movies/999-jane-2024-01-02_1530.html").unwrap();

        assert_eq!(listing.video_id, 999);
        assert_eq!(listing.filename, "jane - 2024-01-02-15-30-00 - 999.mp4");
    }

    #[test]
    fn performer_of_single_item() {
        assert_eq!(
            performer_from_item_segment("12345-jane_doe-20240102-153000"),
            "jane_doe"
        );
        assert_eq!(
            performer_from_item_segment("12345-20240102-153000"),
            "12345-20240102-153000"
        );
    }
}
