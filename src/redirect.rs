use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, HeaderValue};

use crate::config::StoreUrls;
use crate::error::{Error, Result};
use crate::os_detector::OsDetector;
use crate::types::{OsClass, UaSignal};

/// Redirect targets, pre-validated as `Location` header values.
#[derive(Debug, Clone)]
pub struct StoreDestinations {
    ios: HeaderValue,
    android: HeaderValue,
    fallback: HeaderValue,
}

impl StoreDestinations {
    pub fn new(urls: &StoreUrls) -> Result<Self> {
        Ok(Self {
            ios: location(&urls.ios)?,
            android: location(&urls.android)?,
            fallback: location(&urls.fallback)?,
        })
    }

    pub fn for_class(&self, class: OsClass) -> &HeaderValue {
        match class {
            OsClass::Ios => &self.ios,
            OsClass::Android => &self.android,
            OsClass::Other => &self.fallback,
        }
    }

    pub fn fallback(&self) -> &HeaderValue {
        &self.fallback
    }
}

fn location(url: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(url).map_err(|e| Error::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Every `User-Agent` value of the request, joined.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so a
/// device name in a local script still leaves the OS markers readable.
pub fn user_agent_signal(headers: &HeaderMap) -> UaSignal {
    let values = headers.get_all(USER_AGENT).iter().map(|v| {
        let decoded = String::from_utf8_lossy(v.as_bytes());
        if let std::borrow::Cow::Owned(_) = decoded {
            tracing::debug!("user agent is not valid UTF-8, decoded lossily");
        }
        decoded
    });
    UaSignal::from_parts(values)
}

/// Classify the request's User-Agent. Never fails: an absent or garbled
/// header is classified like any other string.
pub fn classify_request(detector: &OsDetector, headers: &HeaderMap) -> OsClass {
    detector.detect(user_agent_signal(headers))
}
