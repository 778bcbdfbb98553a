//! Transient notices shown to the user. Business code pushes them on an unbounded
//! channel; the renderer drains it. A notice pushed after the renderer is gone is
//! dropped silently.

use std::fmt;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Success,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NoticeKind::Error => write!(f, "error: {}", self.message),
            NoticeKind::Success => write!(f, "ok: {}", self.message),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl Notifier {
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NoticeKind::Error, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NoticeKind::Success, message.into());
    }

    fn push(&self, kind: NoticeKind, message: String) {
        if self.tx.send(Notice { kind, message }).is_err() {
            debug!("notice dropped, no renderer attached");
        }
    }
}
