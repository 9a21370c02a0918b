//! Keyboard shortcuts of the admin panel.

/// A key press as delivered by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
            meta: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Ctrl/Cmd+S: save the current order now.
    SaveOrder,
    /// Escape: clear any stuck dragging state.
    CancelDrag,
}

impl KeyCommand {
    pub fn from_event(event: &KeyEvent) -> Option<Self> {
        match event.key.as_str() {
            "s" | "S" if event.ctrl || event.meta => Some(Self::SaveOrder),
            "Escape" => Some(Self::CancelDrag),
            _ => None,
        }
    }
}
