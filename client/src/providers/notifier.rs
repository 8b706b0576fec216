//! User-facing notices ("toasts").

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// An operation succeeded.
    Success,
    /// An operation failed.
    Error,
}

/// A short message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Message text
    pub message: String,
}

impl Notice {
    /// Success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    /// Error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Surfaces notices to the user.
pub trait Notifier: Send + Sync {
    /// Show `notice`.
    fn notify(&self, notice: Notice);
}

/// Notifier for headless use: writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!(text = %notice.message, "Notice"),
            NoticeLevel::Error => tracing::warn!(text = %notice.message, "Notice"),
        }
    }
}
