use serde::Serialize;

/// Result of querying one metric source for a single point-in-time value.
///
/// `Unavailable` means the hardware or sensor does not exist (or its driver
/// could not be loaded). It is never a stand-in for a zero reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Reading<T> {
    Value(T),
    Unavailable,
}

impl<T> Reading<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Reading::Value(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Reading::Value(v) => Some(v),
            Reading::Unavailable => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Reading::Value(v) => Some(v),
            Reading::Unavailable => None,
        }
    }
}

impl<T> From<Option<T>> for Reading<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Reading::Value(v),
            None => Reading::Unavailable,
        }
    }
}

/// A per-domain adapter over an OS or driver statistics API.
pub trait MetricSource {
    type Output;

    fn name(&self) -> &'static str;

    /// Must not panic on missing hardware; return `Reading::Unavailable` instead.
    fn sample(&mut self) -> Reading<Self::Output>;
}
