/// Transient preview resources
///
/// A `PreviewHandle` owns in-memory image bytes plus the renderable
/// widget handle built from them. Handles are acquired through a shared
/// `PreviewGuard`, which counts live handles so the exactly-once release
/// discipline stays observable: every acquire must eventually be matched
/// by exactly one release, on every exit path.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use iced::widget::image;

/// Issues preview handles and tracks how many are currently live.
///
/// Cloning the guard shares the same counter, so a clone handed to a
/// background task still accounts against the same pool.
#[derive(Debug, Clone, Default)]
pub struct PreviewGuard {
    live: Arc<AtomicUsize>,
}

impl PreviewGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap raw image bytes in a tracked, renderable handle.
    pub fn acquire(&self, bytes: Vec<u8>) -> PreviewHandle {
        self.live.fetch_add(1, Ordering::Relaxed);
        PreviewHandle {
            inner: Some(PreviewInner {
                widget: image::Handle::from_bytes(bytes.clone()),
                bytes,
            }),
            live: Arc::clone(&self.live),
        }
    }

    /// Number of handles that have been acquired but not yet released.
    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct PreviewInner {
    widget: image::Handle,
    bytes: Vec<u8>,
}

/// An ownership-tracked reference to transient in-memory image bytes.
///
/// `release` is idempotent: calling it twice never double-decrements
/// the live count. Dropping an unreleased handle releases it.
#[derive(Debug)]
pub struct PreviewHandle {
    inner: Option<PreviewInner>,
    live: Arc<AtomicUsize>,
}

impl PreviewHandle {
    /// The widget handle for rendering, or `None` once released.
    /// Callers must not render a handle after releasing it.
    pub fn widget_handle(&self) -> Option<&image::Handle> {
        self.inner.as_ref().map(|inner| &inner.widget)
    }

    /// The underlying bytes, or `None` once released.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.inner.as_ref().map(|inner| inner.bytes.as_slice())
    }

    pub fn is_released(&self) -> bool {
        self.inner.is_none()
    }

    /// Invalidate the handle. Safe to call more than once.
    pub fn release(&mut self) {
        if self.inner.take().is_some() {
            self.live.fetch_sub(1, Ordering::Relaxed);
        }
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        // Backstop so teardown can never leak a live handle
        self.release();
    }
}
