/// Normalized User-Agent input: every header value joined by a single space,
/// lower-cased. Absent input is the empty signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UaSignal(String);

impl UaSignal {
    /// Join several header values (e.g. repeated `User-Agent` headers).
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = parts
            .into_iter()
            .map(|p| p.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(" ");
        Self(joined.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for UaSignal {
    fn from(ua: &str) -> Self {
        Self(ua.to_lowercase())
    }
}

impl From<String> for UaSignal {
    fn from(ua: String) -> Self {
        Self(ua.to_lowercase())
    }
}

impl From<&String> for UaSignal {
    fn from(ua: &String) -> Self {
        Self(ua.to_lowercase())
    }
}

impl From<&[&str]> for UaSignal {
    fn from(parts: &[&str]) -> Self {
        Self::from_parts(parts)
    }
}

impl From<&[String]> for UaSignal {
    fn from(parts: &[String]) -> Self {
        Self::from_parts(parts)
    }
}

impl From<Vec<String>> for UaSignal {
    fn from(parts: Vec<String>) -> Self {
        Self::from_parts(parts)
    }
}

impl From<Vec<&str>> for UaSignal {
    fn from(parts: Vec<&str>) -> Self {
        Self::from_parts(parts)
    }
}

impl<T: Into<UaSignal>> From<Option<T>> for UaSignal {
    fn from(ua: Option<T>) -> Self {
        ua.map(Into::into).unwrap_or_default()
    }
}
