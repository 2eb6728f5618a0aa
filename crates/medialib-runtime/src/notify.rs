/// Kind of toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// Where user-facing messages go.
pub trait Notifier: Send + Sync {
    /// Non-blocking notification that dismisses itself.
    fn toast(&self, kind: ToastKind, message: &str);

    /// Blocking error the user has to acknowledge.
    fn alert(&self, message: &str);
}
