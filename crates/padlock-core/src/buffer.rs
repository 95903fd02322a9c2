//! Transient edit state of one widget.

use tracing::trace;

use crate::variant::LockVariant;

/// Candidate padlock plus the text typed for it.
///
/// The text is only meaningful while a padlock is selected (or while an
/// unlock password is being typed) and is cleared whenever the selection
/// resets or an action goes out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    selected: LockVariant,
    password: String,
    timer: String,
}

impl EditBuffer {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidate padlock.
    pub fn selected(&self) -> LockVariant {
        self.selected
    }

    /// Password text.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Timer text.
    pub fn timer(&self) -> &str {
        &self.timer
    }

    /// Pick a candidate padlock. Typed text is kept.
    pub fn select(&mut self, variant: LockVariant) {
        trace!(from = %self.selected, to = %variant, "padlock selected");
        self.selected = variant;
    }

    /// Replace the password text.
    pub fn set_password(&mut self, text: impl Into<String>) {
        self.password = text.into();
    }

    /// Replace the timer text.
    pub fn set_timer(&mut self, text: impl Into<String>) {
        self.timer = text.into();
    }

    pub(crate) fn password_mut(&mut self) -> &mut String {
        &mut self.password
    }

    pub(crate) fn timer_mut(&mut self) -> &mut String {
        &mut self.timer
    }

    /// Clear both text fields, keeping the selection.
    pub fn clear_inputs(&mut self) {
        self.password.clear();
        self.timer.clear();
    }

    /// Back to no selection and empty text.
    pub fn reset(&mut self) {
        self.selected = LockVariant::None;
        self.clear_inputs();
    }

    /// Whether the buffer is in its reset state.
    pub fn is_clear(&self) -> bool {
        self.selected == LockVariant::None && self.password.is_empty() && self.timer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_everything() {
        let mut buffer = EditBuffer::new();
        buffer.select(LockVariant::TimerPassword);
        buffer.set_password("pw");
        buffer.set_timer("1h");
        assert!(!buffer.is_clear());

        buffer.reset();
        assert!(buffer.is_clear());
    }

    #[test]
    fn reselect_keeps_text() {
        let mut buffer = EditBuffer::new();
        buffer.select(LockVariant::Password);
        buffer.set_password("pw");
        buffer.select(LockVariant::TimerPassword);
        assert_eq!(buffer.password(), "pw");
    }
}
