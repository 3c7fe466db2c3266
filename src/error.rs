use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("no API key configured for the origin lookup service")]
    MissingApiKey,
    #[error("origin lookup request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("origin lookup service answered HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("origin lookup service returned no text")]
    EmptyResponse,
    #[error("failed to parse origin record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("origin record has unusable coordinates (lat {lat}, lng {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },
    #[error("lookup task did not complete: {0}")]
    Task(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read storage file {path}: {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write storage file {path}: {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage file is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("no storage location available")]
    Unavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("location is not a valid URL: {0}")]
    Parse(#[from] url::ParseError),
    #[error("location cannot carry a query: {0}")]
    NotAddressable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("failed to fetch boundary data: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("boundary data is not valid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),
    #[error("boundary data is not a FeatureCollection")]
    NotFeatureCollection,
}

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("nothing to share")]
    NothingToShare,
    #[error("no display available for clipboard access")]
    NoDisplay,
}
