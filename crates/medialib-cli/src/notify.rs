use medialib_runtime::{Notifier, ToastKind};

/// Prints toasts to stdout and alerts to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

fn badge(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "ok",
        ToastKind::Error => "error",
        ToastKind::Info => "info",
    }
}

impl Notifier for ConsoleNotifier {
    fn toast(&self, kind: ToastKind, message: &str) {
        println!("[{}] {message}", badge(kind));
    }

    fn alert(&self, message: &str) {
        eprintln!("error: {message}");
    }
}
