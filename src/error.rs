#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    YAML(#[from] serde_yaml::Error),
    #[error(transparent)]
    Regex(#[from] fancy_regex::Error),
    #[error(transparent)]
    AhoCorasick(#[from] aho_corasick::BuildError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("rule table may not define a rule for `{0}`")]
    InvalidRule(String),
    #[error("invalid coordinate pair: {0:?} (expected \"lat,lon\")")]
    InvalidCoordinate(String),
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why the device position could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("geolocation is not supported on this device")]
    Unsupported,
    #[error("geolocation permission denied")]
    PermissionDenied,
    #[error("position unavailable: {0}")]
    Unavailable(String),
}
