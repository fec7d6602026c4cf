//! The one live preview of the service.
//!
//! Mounting reads the document once and builds its view tree; everything
//! after that (preview images, exports) works from the mounted tree and the
//! frozen document it was built from.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::models::resume::ResumeDocument;
use crate::templates::TemplateKind;
use crate::view::node::ViewNode;
use crate::view::preview::build_preview;

#[derive(Debug, Clone)]
pub struct MountedPreview {
    pub document: Arc<ResumeDocument>,
    pub template: TemplateKind,
    pub root: ViewNode,
    pub mounted_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct PreviewSurface {
    mounted: Mutex<Option<MountedPreview>>,
}

impl PreviewSurface {
    pub fn new() -> PreviewSurface {
        PreviewSurface::default()
    }

    /// Replaces whatever is mounted with the preview of `document`.
    pub fn mount(&self, document: Arc<ResumeDocument>) -> TemplateKind {
        let template = document.template_kind();
        let root = build_preview(&document, template.config());
        *self.lock() = Some(MountedPreview {
            document,
            template,
            root,
            mounted_at: Utc::now(),
        });
        tracing::debug!(?template, "Preview mounted");
        template
    }

    pub fn unmount(&self) {
        *self.lock() = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.lock().is_some()
    }

    /// Runs `f` against the mounted preview; `None` when nothing is mounted.
    pub fn with_mounted<R>(&self, f: impl FnOnce(&MountedPreview) -> R) -> Option<R> {
        self.lock().as_ref().map(f)
    }

    /// Like `with_mounted`, holding the lock for the whole call so no other
    /// reader sees the tree while `f` has it mutated.
    pub fn with_mounted_mut<R>(&self, f: impl FnOnce(&mut MountedPreview) -> R) -> Option<R> {
        self.lock().as_mut().map(f)
    }

    // A panic during capture poisons the lock; the guard has already restored
    // the tree by then, so the data is still good.
    fn lock(&self) -> MutexGuard<'_, Option<MountedPreview>> {
        self.mounted.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{PersonalInfo, TemplateDescriptor};

    fn doc(kind: TemplateKind) -> Arc<ResumeDocument> {
        Arc::new(ResumeDocument {
            template: TemplateDescriptor::for_kind(kind),
            personal: PersonalInfo {
                name: "Ada".into(),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[test]
    fn test_mount_and_unmount() {
        let surface = PreviewSurface::new();
        assert!(!surface.is_mounted());
        assert_eq!(surface.mount(doc(TemplateKind::Simple)), TemplateKind::Simple);
        assert!(surface.is_mounted());
        let id = surface.with_mounted(|m| m.root.id.clone()).flatten();
        assert_eq!(id.as_deref(), Some("resume-root"));
        surface.unmount();
        assert!(surface.with_mounted(|_| ()).is_none());
    }

    #[test]
    fn test_remount_replaces_document() {
        let surface = PreviewSurface::new();
        surface.mount(doc(TemplateKind::Creative));
        surface.mount(doc(TemplateKind::Professional));
        let template = surface.with_mounted(|m| m.template);
        assert_eq!(template, Some(TemplateKind::Professional));
    }

    #[test]
    fn test_survives_poisoned_lock() {
        let surface = Arc::new(PreviewSurface::new());
        surface.mount(doc(TemplateKind::Creative));
        let s = surface.clone();
        let _ = std::thread::spawn(move || {
            s.with_mounted_mut(|_| panic!("capture blew up"));
        })
        .join();
        assert!(surface.is_mounted());
    }
}
