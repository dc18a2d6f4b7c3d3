//! Auto-expiring UI notifications.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Lifetime of a toast unless the caller picks another.
pub const DEFAULT_TOAST_LIFETIME: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub created_at: Instant,
    pub lifetime: Duration,
}

impl Toast {
    /// Whether the toast has outlived its lifetime at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.lifetime
    }
}

/// Toasts currently on screen, oldest first.
#[derive(Debug, Default)]
pub struct ToastQueue {
    next_id: u64,
    toasts: Vec<Toast>,
}

impl ToastQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a toast for [`DEFAULT_TOAST_LIFETIME`]. Returns its id.
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        self.push_with_lifetime(kind, message, DEFAULT_TOAST_LIFETIME)
    }

    pub fn push_with_lifetime(
        &mut self,
        kind: ToastKind,
        message: impl Into<String>,
        lifetime: Duration,
    ) -> u64 {
        self.next_id += 1;
        self.toasts.push(Toast {
            id: self.next_id,
            kind,
            message: message.into(),
            created_at: Instant::now(),
            lifetime,
        });
        self.next_id
    }

    /// Remove a toast. Returns whether it was still shown.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Drop every toast expired at `now`, returning them.
    pub fn expire(&mut self, now: Instant) -> Vec<Toast> {
        let (expired, live): (Vec<Toast>, Vec<Toast>) = std::mem::take(&mut self.toasts)
            .into_iter()
            .partition(|t| t.is_expired(now));
        self.toasts = live;
        expired
    }

    /// Toasts still live at `now`.
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().filter(move |t| !t.is_expired(now))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetime_expiry() {
        let mut queue = ToastQueue::new();
        let id = queue.push(ToastKind::Success, "Đã lưu");
        let created = queue.active(Instant::now()).next().map(|t| t.created_at);
        let Some(created) = created else {
            panic!("toast not active");
        };

        let almost = created + Duration::from_millis(2999);
        assert_eq!(queue.active(almost).count(), 1);
        assert!(queue.expire(almost).is_empty());

        let expired = queue.expire(created + DEFAULT_TOAST_LIFETIME);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, id);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dismiss_and_monotonic_ids() {
        let mut queue = ToastQueue::new();
        let a = queue.push(ToastKind::Info, "a");
        let b = queue.push_with_lifetime(ToastKind::Error, "b", Duration::from_secs(10));
        assert!(b > a);

        assert!(queue.dismiss(a));
        assert!(!queue.dismiss(a));
        let c = queue.push(ToastKind::Warning, "c");
        assert!(c > b);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_mixed_lifetimes() {
        let mut queue = ToastQueue::new();
        queue.push_with_lifetime(ToastKind::Info, "short", Duration::from_millis(100));
        queue.push_with_lifetime(ToastKind::Info, "long", Duration::from_secs(60));

        let later = Instant::now() + Duration::from_secs(1);
        let live: Vec<&str> = queue.active(later).map(|t| t.message.as_str()).collect();
        assert_eq!(live, vec!["long"]);
    }
}
