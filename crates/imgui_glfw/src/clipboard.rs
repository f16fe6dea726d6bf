//! Clipboard capability handed to the GUI library
//!
//! Text is forwarded verbatim in both directions.

/// Get/set access to a clipboard
pub trait ClipboardBackend {
    /// Current clipboard text, if any
    fn get(&mut self) -> Option<String>;

    /// Replace the clipboard text
    fn set(&mut self, text: &str);
}

/// OS clipboard through `arboard`
///
/// Falls back to an in-process buffer when the OS clipboard cannot be opened
/// (headless sessions, missing display server).
pub struct SystemClipboard {
    clipboard: Option<arboard::Clipboard>,
    fallback: MemoryClipboard,
}

impl SystemClipboard {
    /// Open the OS clipboard
    pub fn new() -> Self {
        let clipboard = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                log::warn!("System clipboard unavailable, using in-process buffer: {}", e);
                None
            }
        };

        Self {
            clipboard,
            fallback: MemoryClipboard::default(),
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardBackend for SystemClipboard {
    fn get(&mut self) -> Option<String> {
        match self.clipboard.as_mut() {
            Some(clipboard) => match clipboard.get_text() {
                Ok(text) => Some(text),
                Err(e) => {
                    log::debug!("Clipboard read failed: {}", e);
                    None
                }
            },
            None => self.fallback.get(),
        }
    }

    fn set(&mut self, text: &str) {
        match self.clipboard.as_mut() {
            Some(clipboard) => {
                if let Err(e) = clipboard.set_text(text.to_owned()) {
                    log::warn!("Clipboard write failed: {}", e);
                }
            }
            None => self.fallback.set(text),
        }
    }
}

/// In-process clipboard buffer
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    /// Buffer pre-filled with `text`
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            contents: Some(text.into()),
        }
    }
}

impl ClipboardBackend for MemoryClipboard {
    fn get(&mut self) -> Option<String> {
        self.contents.clone()
    }

    fn set(&mut self, text: &str) {
        self.contents = Some(text.to_owned());
    }
}
