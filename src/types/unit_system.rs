#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSystem {
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Pick the unit system for a locale identifier such as `en-US`.
    ///
    /// Only a locale mentioning the United States (`US`) selects imperial.
    pub fn from_locale(locale: &str) -> Self {
        if locale.contains("US") {
            Self::Imperial
        } else {
            Self::Metric
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }
}
