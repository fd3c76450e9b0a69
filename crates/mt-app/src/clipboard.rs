// ABOUTME: Clipboard access for copy and paste actions.
// ABOUTME: Falls back to an in-process buffer when no system clipboard exists.

/// System clipboard with a local fallback
pub struct Clipboard {
    system: Option<arboard::Clipboard>,
    local: Option<String>,
}

impl Clipboard {
    /// Connect to the system clipboard, if one is available
    pub fn system() -> Self {
        match arboard::Clipboard::new() {
            Ok(clipboard) => Self {
                system: Some(clipboard),
                local: None,
            },
            Err(e) => {
                tracing::warn!("System clipboard unavailable: {}", e);
                Self::detached()
            }
        }
    }

    /// Clipboard that never leaves the process
    pub fn detached() -> Self {
        Self {
            system: None,
            local: None,
        }
    }

    pub fn set_text(&mut self, text: &str) {
        if let Some(clipboard) = &mut self.system {
            match clipboard.set_text(text) {
                Ok(()) => tracing::debug!("Copied {} chars to clipboard", text.len()),
                Err(e) => tracing::error!("Failed to copy to clipboard: {}", e),
            }
        }
        self.local = Some(text.to_string());
    }

    pub fn get_text(&mut self) -> Option<String> {
        if let Some(clipboard) = &mut self.system {
            match clipboard.get_text() {
                Ok(text) => return Some(text),
                Err(e) => tracing::debug!("Clipboard read failed: {}", e),
            }
        }
        self.local.clone()
    }
}
