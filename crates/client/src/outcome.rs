//! Results for non-critical side effects.
//!
//! Favorites, notification badges and image uploads must never fail the
//! action around them. Operations for those features return a
//! [`SoftResult`]: always a value, plus a warning when the backend call
//! behind it did not go through.

/// A value with an optional warning explaining a degraded outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct SoftResult<T> {
    /// The outcome to act on, degraded or not.
    pub value: T,
    /// Why the value is a fallback, if it is one.
    pub warning: Option<String>,
}

impl<T> SoftResult<T> {
    /// A successful outcome.
    pub const fn ok(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    /// A fallback outcome with the reason it was used.
    pub fn degraded(value: T, warning: impl Into<String>) -> Self {
        Self {
            value,
            warning: Some(warning.into()),
        }
    }

    /// Whether the value is a fallback.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }

    /// Transform the value, keeping the warning.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SoftResult<U> {
        SoftResult {
            value: f(self.value),
            warning: self.warning,
        }
    }

    /// Drop the warning and keep the value.
    pub fn into_value(self) -> T {
        self.value
    }
}
