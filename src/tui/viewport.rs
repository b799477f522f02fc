//! Viewport tracking for table sizing.
//!
//! A [`ViewportTracker`] reads the host window size once when mounted and
//! registers a single resize listener. The [`ListenerId`] returned by the host
//! is stored and is the only handle used to deregister, so mount and unmount
//! always act on the same listener.

use std::cell::Cell;
use std::rc::Rc;

use crate::models::LayoutConfig;

/// Current window size in terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportDimensions {
    pub width: u16,
    pub height: u16,
}

impl ViewportDimensions {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Table size derived from the viewport and the layout allowances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSize {
    pub width: u16,
    pub height: u16,
}

impl TableSize {
    #[must_use]
    pub fn from_viewport(dims: ViewportDimensions, layout: &LayoutConfig) -> Self {
        Self {
            width: dims.width.saturating_sub(layout.width_margin),
            height: dims.height.saturating_sub(layout.height_allowance),
        }
    }
}

/// Handle identifying one registered resize listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type ResizeListener = Box<dyn FnMut(ViewportDimensions)>;

/// A window that reports its size and notifies listeners on resize
pub trait WindowHost {
    fn inner_size(&self) -> ViewportDimensions;

    fn add_resize_listener(&mut self, listener: ResizeListener) -> ListenerId;

    /// Returns false if `id` was not registered.
    fn remove_resize_listener(&mut self, id: ListenerId) -> bool;
}

/// Listener registry backing [`WindowHost`] implementations
#[derive(Default)]
pub struct ResizeListeners {
    next_id: u64,
    listeners: Vec<(ListenerId, ResizeListener)>,
}

impl ResizeListeners {
    pub fn add(&mut self, listener: ResizeListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Invoke every listener once with the new size.
    pub fn dispatch(&mut self, dims: ViewportDimensions) {
        if self.is_empty() {
            return;
        }
        tracing::trace!(listeners = self.len(), "dispatching resize");
        for (_, listener) in self.listeners.iter_mut() {
            listener(dims);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for ResizeListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeListeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

/// The terminal as a window host.
///
/// Resize events arrive through the input channel and are forwarded with
/// [`TerminalWindow::dispatch_resize`].
#[derive(Debug, Default)]
pub struct TerminalWindow {
    listeners: ResizeListeners,
    fixed_size: Option<ViewportDimensions>,
}

/// Size assumed when the terminal cannot be queried
const FALLBACK_SIZE: ViewportDimensions = ViewportDimensions::new(80, 24);

impl TerminalWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// A window that always reports `dims` (headless rendering).
    #[cfg(test)]
    pub fn with_size(dims: ViewportDimensions) -> Self {
        Self {
            listeners: ResizeListeners::default(),
            fixed_size: Some(dims),
        }
    }

    pub fn dispatch_resize(&mut self, width: u16, height: u16) {
        let dims = ViewportDimensions::new(width, height);
        if self.fixed_size.is_some() {
            self.fixed_size = Some(dims);
        }
        tracing::trace!(width, height, "terminal resized");
        self.listeners.dispatch(dims);
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl WindowHost for TerminalWindow {
    fn inner_size(&self) -> ViewportDimensions {
        if let Some(dims) = self.fixed_size {
            return dims;
        }
        match crossterm::terminal::size() {
            Ok((width, height)) => ViewportDimensions::new(width, height),
            Err(e) => {
                tracing::warn!("Could not read terminal size: {}", e);
                FALLBACK_SIZE
            }
        }
    }

    fn add_resize_listener(&mut self, listener: ResizeListener) -> ListenerId {
        self.listeners.add(listener)
    }

    fn remove_resize_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

/// Publishes the current viewport size to the table.
#[derive(Debug, Default)]
pub struct ViewportTracker {
    dims: Rc<Cell<ViewportDimensions>>,
    listener: Option<ListenerId>,
}

impl ViewportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the initial size and subscribe to resizes. Mounting twice is a no-op.
    pub fn mount<H: WindowHost + ?Sized>(&mut self, host: &mut H) {
        if self.is_mounted() {
            return;
        }

        self.dims.set(host.inner_size());

        let dims = Rc::clone(&self.dims);
        let id = host.add_resize_listener(Box::new(move |new_dims| dims.set(new_dims)));
        self.listener = Some(id);

        let current = self.dims.get();
        tracing::debug!(width = current.width, height = current.height, "viewport mounted");
    }

    /// Deregister the listener added by [`mount`](Self::mount).
    ///
    /// Returns true if a listener was removed.
    pub fn unmount<H: WindowHost + ?Sized>(&mut self, host: &mut H) -> bool {
        match self.listener.take() {
            Some(id) => {
                let removed = host.remove_resize_listener(id);
                if !removed {
                    tracing::warn!(?id, "resize listener was already gone");
                }
                removed
            }
            None => false,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.listener.is_some()
    }

    pub fn dimensions(&self) -> ViewportDimensions {
        self.dims.get()
    }

    pub fn table_size(&self, layout: &LayoutConfig) -> TableSize {
        TableSize::from_viewport(self.dimensions(), layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard_layout() -> LayoutConfig {
        LayoutConfig {
            width_margin: 30,
            height_allowance: 250,
            overscan: 2,
        }
    }

    #[test]
    fn test_mount_reads_initial_size() {
        let mut window = TerminalWindow::with_size(ViewportDimensions::new(1000, 800));
        let mut tracker = ViewportTracker::new();
        tracker.mount(&mut window);

        assert!(tracker.is_mounted());
        assert_eq!(tracker.dimensions(), ViewportDimensions::new(1000, 800));
        assert_eq!(
            tracker.table_size(&dashboard_layout()),
            TableSize { width: 970, height: 550 }
        );
    }

    #[test]
    fn test_resize_recomputes_table_size() {
        let mut window = TerminalWindow::with_size(ViewportDimensions::new(1000, 800));
        let mut tracker = ViewportTracker::new();
        tracker.mount(&mut window);

        window.dispatch_resize(1200, 600);

        assert_eq!(
            tracker.table_size(&dashboard_layout()),
            TableSize { width: 1170, height: 350 }
        );
    }

    #[test]
    fn test_every_resize_event_applies() {
        let mut window = TerminalWindow::with_size(ViewportDimensions::new(80, 24));
        let mut tracker = ViewportTracker::new();
        tracker.mount(&mut window);

        for w in 81..=90 {
            window.dispatch_resize(w, 30);
            assert_eq!(tracker.dimensions().width, w);
        }
    }

    #[test]
    fn test_unmount_removes_same_listener() {
        let mut window = TerminalWindow::with_size(ViewportDimensions::new(80, 24));
        let mut tracker = ViewportTracker::new();

        for _ in 0..5 {
            tracker.mount(&mut window);
            assert_eq!(window.listener_count(), 1);
            assert!(tracker.unmount(&mut window));
            assert_eq!(window.listener_count(), 0);
        }
    }

    #[test]
    fn test_double_mount_registers_once() {
        let mut window = TerminalWindow::with_size(ViewportDimensions::new(80, 24));
        let mut tracker = ViewportTracker::new();
        tracker.mount(&mut window);
        tracker.mount(&mut window);
        assert_eq!(window.listener_count(), 1);
    }

    #[test]
    fn test_unmount_without_mount() {
        let mut window = TerminalWindow::with_size(ViewportDimensions::new(80, 24));
        let mut tracker = ViewportTracker::new();
        assert!(!tracker.unmount(&mut window));
    }

    #[test]
    fn test_unmounted_tracker_ignores_resizes() {
        let mut window = TerminalWindow::with_size(ViewportDimensions::new(80, 24));
        let mut tracker = ViewportTracker::new();
        tracker.mount(&mut window);
        tracker.unmount(&mut window);

        window.dispatch_resize(120, 40);
        assert_eq!(tracker.dimensions(), ViewportDimensions::new(80, 24));
    }

    #[test]
    fn test_table_size_saturates() {
        let size = TableSize::from_viewport(ViewportDimensions::new(10, 100), &dashboard_layout());
        assert_eq!(size, TableSize { width: 0, height: 0 });
    }

    #[test]
    fn test_other_listeners_untouched() {
        let mut listeners = ResizeListeners::default();
        let seen = Rc::new(Cell::new(0u16));
        let seen_clone = Rc::clone(&seen);
        let keep = listeners.add(Box::new(move |d| seen_clone.set(d.width)));
        let drop_me = listeners.add(Box::new(|_| {}));

        assert!(listeners.remove(drop_me));
        assert!(!listeners.remove(drop_me));
        listeners.dispatch(ViewportDimensions::new(42, 1));
        assert_eq!(seen.get(), 42);
        assert!(listeners.remove(keep));
        assert!(listeners.is_empty());
    }
}
