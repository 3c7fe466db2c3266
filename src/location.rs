//! The application's addressable location.
//!
//! A desktop window has no address bar, so the location is a URL seeded
//! from the URI the app was opened with or from the configured share base.
//! Without either it is opaque: reads find nothing and writes are skipped.

use url::Url;

use crate::data::{PRODUCT_NAME, SHARE_PARAM};
use crate::error::LocationError;

pub trait ShareableLocation {
    /// The medicine name carried by the location, if any.
    fn read(&self) -> Result<Option<String>, LocationError>;
    /// Set (`Some`) or remove (`None`) the medicine name.
    fn write(&mut self, name: Option<&str>) -> Result<(), LocationError>;
    /// Absolute link for `name`, or `None` when the location is opaque.
    fn share_url(&self, name: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppLocation {
    current: Option<Url>,
}

impl AppLocation {
    pub fn new(launch_uri: Option<&str>, share_base_url: Option<&str>) -> Self {
        let current = [launch_uri, share_base_url]
            .into_iter()
            .flatten()
            .find_map(|raw| match addressable(raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::debug!("ignoring location candidate: {}", e);
                    None
                }
            });
        match current {
            Some(url) => Self { current: Some(url) },
            None => Self::opaque(),
        }
    }

    pub fn opaque() -> Self {
        Self { current: None }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_ref().map(Url::as_str)
    }
}

impl ShareableLocation for AppLocation {
    fn read(&self) -> Result<Option<String>, LocationError> {
        Ok(self
            .current
            .as_ref()
            .and_then(|url| query_param(url, SHARE_PARAM)))
    }

    fn write(&mut self, name: Option<&str>) -> Result<(), LocationError> {
        let Some(url) = self.current.as_mut() else {
            tracing::debug!("location is opaque, skipping update");
            return Ok(());
        };
        set_query_param(url, SHARE_PARAM, name);
        Ok(())
    }

    fn share_url(&self, name: &str) -> Option<String> {
        let mut url = self.current.clone()?;
        url.set_fragment(None);
        url.set_query(None);
        url.query_pairs_mut().append_pair(SHARE_PARAM, name);
        Some(url.into())
    }
}

/// What gets copied when sharing `name`.
pub fn share_text(location: &impl ShareableLocation, name: &str) -> String {
    location
        .share_url(name)
        .unwrap_or_else(|| format!("Search for \"{}\" on {}", name, PRODUCT_NAME))
}

/// Parse `raw` as a URL that can carry a query string. `mailto:`, `data:`,
/// `blob:` and the like cannot.
fn addressable(raw: &str) -> Result<Url, LocationError> {
    let url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() {
        return Err(LocationError::NotAddressable(raw.to_string()));
    }
    Ok(url)
}

/// First non-blank value of `key`.
pub fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.trim().is_empty())
}

/// Replace, add or remove `key` in the query, keeping other parameters.
pub fn set_query_param(url: &mut Url, key: &str, value: Option<&str>) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() && value.is_none() {
        url.set_query(None);
        return;
    }

    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (k, v) in &kept {
        pairs.append_pair(k, v);
    }
    if let Some(value) = value {
        pairs.append_pair(key, value);
    }
}
