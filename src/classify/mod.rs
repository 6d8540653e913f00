//! Maps a window title to a [Category] and a detail string. Browser windows are resolved to the
//! domain of the active tab through a [UrlSource].

use std::{fmt::Display, sync::Arc};

use clap::ValueEnum;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{relay::client::UrlSource, storage::entities::Category};

pub const DETAIL_NOT_APPLICABLE: &str = "N/A";
pub const DETAIL_URL_ERROR: &str = "Error fetching URL";
pub const DETAIL_URL_UNAVAILABLE: &str = "URL not available";
pub const UNKNOWN_TAB: &str = "Unknown Tab";

/// Substrings that browsers put at the end of their window titles.
pub const BROWSER_MARKERS: [&str; 8] = [
    "Edge", "Brave", "Chrome", "Chromium", "Firefox", "Opera", "Vivaldi", "Safari",
];

/// How browser windows are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BrowserDetection {
    /// The title has to contain one of [BROWSER_MARKERS].
    #[default]
    Markers,
    /// Every window counts as a browser. This is how the original tracker behaved.
    Everything,
}

impl Display for BrowserDetection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowserDetection::Markers => write!(f, "markers"),
            BrowserDetection::Everything => write!(f, "everything"),
        }
    }
}

impl BrowserDetection {
    /// Returns the marker that identified the browser, if any. [BrowserDetection::Everything]
    /// reports an empty marker for titles without one.
    pub fn browser_marker(&self, title: &str) -> Option<&'static str> {
        let marker = BROWSER_MARKERS.into_iter().find(|v| title.contains(v));
        match self {
            BrowserDetection::Markers => marker,
            BrowserDetection::Everything => Some(marker.unwrap_or("")),
        }
    }
}

pub struct Classifier {
    url_source: Box<dyn UrlSource>,
    detection: BrowserDetection,
}

impl Classifier {
    pub fn new(url_source: Box<dyn UrlSource>, detection: BrowserDetection) -> Self {
        Self {
            url_source,
            detection,
        }
    }

    #[instrument(skip(self))]
    pub async fn categorize(&self, title: &str) -> (Category, Arc<str>) {
        let Some(browser) = self.detection.browser_marker(title) else {
            return (Category::Application, DETAIL_NOT_APPLICABLE.into());
        };
        if !browser.is_empty() {
            debug!(tab = extract_tab_title(title, browser), "Browser window");
        }
        (Category::Browser, self.active_domain().await.into())
    }

    async fn active_domain(&self) -> String {
        match self.url_source.current_url().await {
            Ok(Some(url)) => domain_of(&url).unwrap_or_else(|| DETAIL_URL_UNAVAILABLE.into()),
            Ok(None) => DETAIL_URL_UNAVAILABLE.into(),
            Err(e) => {
                warn!("Failed to reach url relay {e:?}");
                DETAIL_URL_ERROR.into()
            }
        }
    }
}

/// Host component of `url`, for example `example.com` for `http://example.com/page`.
pub fn domain_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|v| v.host_str().map(|v| v.to_string()))
        .filter(|v| !v.is_empty())
}

/// Splits `Tab title - Browser` on the last separator. Returns the tab title when the trailing
/// segment names `browser_name`, [UNKNOWN_TAB] otherwise.
pub fn extract_tab_title<'a>(window_title: &'a str, browser_name: &str) -> &'a str {
    match window_title.rsplit_once(" - ") {
        Some((tab, browser)) if browser.contains(browser_name) => tab,
        _ => UNKNOWN_TAB,
    }
}
