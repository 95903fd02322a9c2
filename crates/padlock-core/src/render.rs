//! Renderer trait for abstracting the UI toolkit.
//!
//! The widgets in this workspace describe a frame as a sequence of
//! primitive calls. Any immediate-mode toolkit (or a test script) can
//! implement [`Renderer`] and paint them however it likes.

use crate::variant::InputField;

/// One entry of a combo box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboOption<'a> {
    /// Entry text.
    pub label: &'a str,
    /// Whether this is the current selection.
    pub selected: bool,
}

/// What the user did with a combo box this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComboResponse {
    /// Index of the option picked this frame.
    pub picked: Option<usize>,
    /// The user asked to clear the combo (right click).
    pub cleared: bool,
}

/// Tooltip text attached to a combo and its action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tooltips<'a> {
    /// Tooltip of the combo box.
    pub combo: &'a str,
    /// Tooltip of the button beside it.
    pub button: &'a str,
}

/// Immediate-mode drawing primitives used by the widgets.
pub trait Renderer {
    /// Draw a combo box `width` wide showing `preview` while closed.
    fn combo(
        &mut self,
        id: &str,
        width: f32,
        preview: &str,
        options: &[ComboOption<'_>],
    ) -> ComboResponse;

    /// Draw a disabled, read-only display of `text`.
    fn read_only(&mut self, id: &str, width: f32, text: &str);

    /// Draw a button. Returns true when it was pressed this frame.
    ///
    /// A disabled button must never report a press.
    fn button(&mut self, id: &str, label: &str, disabled: bool) -> bool;

    /// Attach a tooltip to the previously drawn item.
    fn tooltip(&mut self, text: &str);

    /// Draw a text input editing `buffer`, capped at `field.max_len` bytes.
    fn input_text(&mut self, id: &str, field: &InputField, buffer: &mut String);
}
