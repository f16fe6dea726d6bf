//! System cursor table

use crate::gui::MouseCursor;
use crate::platform::{CursorHandle, Platform};

/// One platform cursor per GUI cursor shape
#[derive(Debug, Clone, Default)]
pub struct CursorSet {
    cursors: [Option<CursorHandle>; MouseCursor::COUNT],
}

impl CursorSet {
    /// Load every shape the platform supports; already loaded shapes are kept
    pub fn load_all(&mut self, platform: &mut impl Platform) {
        for shape in MouseCursor::ALL {
            let slot = &mut self.cursors[shape.index()];
            if slot.is_none() {
                *slot = platform.load_cursor(shape);
            }
        }

        let loaded = self.cursors.iter().filter(|c| c.is_some()).count();
        log::debug!("Loaded {}/{} system cursors", loaded, MouseCursor::COUNT);
    }

    /// Whether a shape has a platform cursor
    pub fn is_loaded(&self, shape: MouseCursor) -> bool {
        self.cursors[shape.index()].is_some()
    }

    /// Cursor for a shape, falling back to the arrow
    pub fn resolve(&self, shape: MouseCursor) -> Option<CursorHandle> {
        self.cursors[shape.index()].or(self.cursors[MouseCursor::Arrow.index()])
    }

    /// Release every loaded cursor
    pub fn release_all(&mut self, platform: &mut impl Platform) {
        for slot in &mut self.cursors {
            if let Some(cursor) = slot.take() {
                platform.release_cursor(cursor);
            }
        }
    }
}
