//! Scripted renderer recording a frame transcript.
//!
//! Tests queue user gestures (combo picks, button presses, typing) against
//! widget ids, then draw a frame. Each gesture is consumed by the first
//! primitive drawn with its id. Every primitive drawn is appended to the
//! transcript as one line.

use std::collections::{HashMap, HashSet};

use padlock_core::{ComboOption, ComboResponse, InputField, Renderer};

/// Renderer driven by queued gestures.
#[derive(Debug, Default)]
pub struct ScriptedRenderer {
    transcript: Vec<String>,
    combos: HashMap<String, ComboResponse>,
    presses: HashSet<String>,
    typing: HashMap<String, String>,
}

impl ScriptedRenderer {
    /// Renderer with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick option `index` of combo `id` on the next frame.
    pub fn pick(&mut self, id: impl Into<String>, index: usize) {
        self.combos.insert(id.into(), ComboResponse { picked: Some(index), cleared: false });
    }

    /// Right-click combo `id` on the next frame.
    pub fn clear(&mut self, id: impl Into<String>) {
        self.combos.insert(id.into(), ComboResponse { picked: None, cleared: true });
    }

    /// Press button `id` on the next frame.
    pub fn press(&mut self, id: impl Into<String>) {
        self.presses.insert(id.into());
    }

    /// Replace the text of input `id` on the next frame.
    pub fn type_text(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.typing.insert(id.into(), text.into());
    }

    /// Lines recorded so far.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Take the recorded lines, joined by newlines.
    pub fn take_transcript(&mut self) -> String {
        let text = self.transcript.join("\n");
        self.transcript.clear();
        text
    }
}

impl Renderer for ScriptedRenderer {
    fn combo(
        &mut self,
        id: &str,
        _width: f32,
        preview: &str,
        options: &[ComboOption<'_>],
    ) -> ComboResponse {
        let listed: Vec<String> = options
            .iter()
            .map(|o| if o.selected { format!("*{}", o.label) } else { o.label.to_string() })
            .collect();
        self.transcript.push(format!("combo {id} [{preview}] {}", listed.join(" | ")));

        let response = self.combos.remove(id).unwrap_or_default();
        match response.picked {
            Some(index) if index >= options.len() => ComboResponse::default(),
            _ => response,
        }
    }

    fn read_only(&mut self, id: &str, _width: f32, text: &str) {
        self.transcript.push(format!("read_only {id} {text:?}"));
    }

    fn button(&mut self, id: &str, label: &str, disabled: bool) -> bool {
        let pressed = self.presses.remove(id) && !disabled;
        let state = match (disabled, pressed) {
            (true, _) => " (disabled)",
            (false, true) => " (pressed)",
            (false, false) => "",
        };
        self.transcript.push(format!("button {id} {label:?}{state}"));
        pressed
    }

    fn tooltip(&mut self, text: &str) {
        self.transcript.push(format!("tooltip {text:?}"));
    }

    fn input_text(&mut self, id: &str, field: &InputField, buffer: &mut String) {
        if let Some(text) = self.typing.remove(id) {
            *buffer = truncate(&text, field.max_len).to_string();
        }
        self.transcript.push(format!("input {id} {:?} = {buffer:?}", field.hint));
    }
}

/// Longest prefix of `text` that fits in `max` bytes without splitting a
/// character.
fn truncate(text: &str, max: usize) -> &str {
    let mut end = max.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
