//! Capabilities the canvas consumes from its host.
//!
//! The engine never loads media, shows dialogs or displays toasts itself.
//! Hosts inject these traits; tests use in-memory fakes.

use crate::item::MediaRef;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Boxed future for async collaborators (no `Send` bound, single-threaded).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// What the media catalog knows about a reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// MIME-like type string, e.g. `image/png`.
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub name: String,
}

/// Resolves media references to catalog records.
pub trait MediaCatalog {
    fn resolve(&self, media_ref: &str) -> Option<MediaInfo>;
}

impl MediaCatalog for HashMap<MediaRef, MediaInfo> {
    fn resolve(&self, media_ref: &str) -> Option<MediaInfo> {
        self.get(media_ref).cloned()
    }
}

/// Reads a media asset's natural dimensions.
pub trait NaturalSizeProbe {
    /// `None` when the media fails to load.
    fn probe_natural_size<'a>(&'a self, media_ref: &'a str) -> BoxFuture<'a, Option<Size>>;
}

/// Probe backed by a fixed table of sizes.
#[derive(Debug, Clone, Default)]
pub struct StaticSizeProbe {
    sizes: HashMap<MediaRef, Size>,
}

impl StaticSizeProbe {
    pub fn new(sizes: HashMap<MediaRef, Size>) -> Self {
        Self { sizes }
    }
}

impl NaturalSizeProbe for StaticSizeProbe {
    fn probe_natural_size<'a>(&'a self, media_ref: &'a str) -> BoxFuture<'a, Option<Size>> {
        Box::pin(std::future::ready(self.sizes.get(media_ref).copied()))
    }
}

/// Asks the user to confirm a destructive action.
pub trait ConfirmationProvider {
    fn request_confirmation<'a>(&'a self, message: &'a str) -> BoxFuture<'a, bool>;
}

/// Answers every confirmation with a fixed response.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl ConfirmationProvider for AutoConfirm {
    fn request_confirmation<'a>(&'a self, message: &'a str) -> BoxFuture<'a, bool> {
        log::debug!("Auto-answering confirmation '{}' with {}", message, self.0);
        Box::pin(std::future::ready(self.0))
    }
}

/// Severity of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Fire-and-forget notifications.
pub trait Notifier {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Notifier that writes to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => log::info!("{}", message),
            NoticeLevel::Warning => log::warn!("{}", message),
            NoticeLevel::Error => log::error!("{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_probe() {
        let probe = StaticSizeProbe::new(HashMap::from([(
            "a".to_string(),
            Size::new(640.0, 480.0),
        )]));
        assert_eq!(
            pollster::block_on(probe.probe_natural_size("a")),
            Some(Size::new(640.0, 480.0))
        );
        assert_eq!(pollster::block_on(probe.probe_natural_size("b")), None);
    }

    #[test]
    fn test_auto_confirm() {
        assert!(pollster::block_on(AutoConfirm(true).request_confirmation("Delete?")));
        assert!(!pollster::block_on(AutoConfirm(false).request_confirmation("Delete?")));
    }

    #[test]
    fn test_catalog_map() {
        let catalog: HashMap<MediaRef, MediaInfo> = HashMap::from([(
            "m1".to_string(),
            MediaInfo {
                kind: "image/png".into(),
                url: "blob:1".into(),
                name: "cat.png".into(),
            },
        )]);
        assert_eq!(catalog.resolve("m1").map(|m| m.name), Some("cat.png".to_string()));
        assert!(catalog.resolve("missing").is_none());
    }
}
