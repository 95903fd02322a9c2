//! Apply, execute and toggle combos.
//!
//! The non-padlock widgets all share one shape: pick an entry from a list
//! the data layer supplies, then press a button to send it. Selection state
//! is kept by id so a list refresh between frames cannot shift it onto a
//! different entry.

use padlock_core::{
    ApplyRequest, ComboOption, Dispatcher, ItemRef, Renderer, ToggleRequest, Tooltips,
};
use tracing::{debug, trace, warn};

use crate::{
    error::RegistryError,
    source::Choice,
    widget::{Capability, WidgetKey},
};

/// Selection state of an apply, execute or toggle combo.
#[derive(Debug, Clone)]
pub struct ChoiceSelection {
    label: String,
    target: ItemRef,
    capability: Capability,
    selected: Option<String>,
    committed: bool,
}

impl ChoiceSelection {
    /// Create a combo for `target` with the given capability.
    pub fn new(label: impl Into<String>, target: ItemRef, capability: Capability) -> Self {
        Self { label: label.into(), target, capability, selected: None, committed: false }
    }

    /// Identity string of this widget.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Slot this widget operates on.
    pub fn target(&self) -> &ItemRef {
        &self.target
    }

    /// What the widget does.
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Id of the selected choice.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select the choice with `id`.
    pub fn select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    /// Clear the selection.
    pub fn reset(&mut self) {
        trace!(label = %self.label, "choice reset");
        self.selected = None;
    }

    /// Called when the owning interaction is opened.
    pub fn reopen(&mut self) {
        if std::mem::take(&mut self.committed) {
            self.reset();
        }
    }

    /// Send the selected choice as an apply (or execute) request.
    pub fn attempt_apply<D: Dispatcher + ?Sized>(
        &mut self,
        choices: &[Choice],
        dispatcher: &mut D,
    ) -> Result<(), RegistryError> {
        if !matches!(self.capability, Capability::Apply | Capability::Execute) {
            return Err(self.wrong_capability(Capability::Apply));
        }
        let choice = self.resolve(choices)?;

        let request = ApplyRequest { target: self.target.clone(), choice: choice.id.clone() };
        match dispatcher.send_apply_request(request) {
            Ok(()) => {
                debug!(label = %self.label, choice = %choice.id, "apply request dispatched");
                self.reset();
                self.committed = true;
                Ok(())
            },
            Err(err) => {
                warn!(label = %self.label, error = %err, "apply request failed");
                Err(err.into())
            },
        }
    }

    /// Send an enable or disable request for the selected choice.
    pub fn attempt_toggle<D: Dispatcher + ?Sized>(
        &mut self,
        choices: &[Choice],
        enable: bool,
        dispatcher: &mut D,
    ) -> Result<(), RegistryError> {
        if self.capability != Capability::Toggle {
            return Err(self.wrong_capability(Capability::Toggle));
        }
        let choice = self.resolve(choices)?;
        if choice.enabled == enable {
            return Err(RegistryError::ToggleUnchanged { id: choice.id.clone(), enabled: enable });
        }

        let request =
            ToggleRequest { target: self.target.clone(), choice: choice.id.clone(), enable };
        match dispatcher.send_toggle_request(request) {
            Ok(()) => {
                debug!(
                    label = %self.label,
                    choice = %choice.id,
                    enable,
                    "toggle request dispatched"
                );
                self.reset();
                self.committed = true;
                Ok(())
            },
            Err(err) => {
                warn!(label = %self.label, error = %err, "toggle request failed");
                Err(err.into())
            },
        }
    }

    /// Draw the combo and its button(s).
    ///
    /// Toggle widgets get an enable and a disable button, apply and execute
    /// widgets a single button. Returns true when a request was dispatched.
    pub fn draw<R, D>(
        &mut self,
        renderer: &mut R,
        choices: &[Choice],
        dispatcher: &mut D,
        width: f32,
        tooltips: Tooltips<'_>,
    ) -> Result<bool, RegistryError>
    where
        R: Renderer + ?Sized,
        D: Dispatcher + ?Sized,
    {
        let current = self.selected.as_deref();
        let options: Vec<ComboOption<'_>> = choices
            .iter()
            .map(|c| ComboOption { label: &c.label, selected: Some(c.id.as_str()) == current })
            .collect();
        let preview = choices
            .iter()
            .find(|c| Some(c.id.as_str()) == current)
            .map_or("Select an item...", |c| c.label.as_str());

        let response = renderer.combo(&format!("##{}-Combo", self.label), width, preview, &options);
        renderer.tooltip(tooltips.combo);
        if response.cleared {
            self.reset();
        } else if let Some(choice) = response.picked.and_then(|i| choices.get(i)) {
            self.select(choice.id.clone());
        }

        let enabled = self
            .selected
            .as_deref()
            .and_then(|id| choices.iter().find(|c| c.id == id))
            .map(|c| c.enabled);

        match self.capability {
            Capability::Toggle => {
                let enable = renderer.button(
                    &format!("##{}-Enable", self.label),
                    "Enable",
                    enabled.is_none_or(|on| on),
                );
                let disable = renderer.button(
                    &format!("##{}-Disable", self.label),
                    "Disable",
                    enabled.is_none_or(|on| !on),
                );
                renderer.tooltip(tooltips.button);
                match (enable, disable) {
                    (true, _) => self.attempt_toggle(choices, true, dispatcher).map(|()| true),
                    (_, true) => self.attempt_toggle(choices, false, dispatcher).map(|()| true),
                    _ => Ok(false),
                }
            },
            Capability::Padlock => Err(self.wrong_capability(Capability::Apply)),
            Capability::Apply | Capability::Execute => {
                let text = if self.capability == Capability::Execute { "Execute" } else { "Apply" };
                let pressed =
                    renderer.button(&format!("##{}-{text}", self.label), text, enabled.is_none());
                renderer.tooltip(tooltips.button);
                if pressed {
                    self.attempt_apply(choices, dispatcher).map(|()| true)
                } else {
                    Ok(false)
                }
            },
        }
    }

    fn resolve<'c>(&self, choices: &'c [Choice]) -> Result<&'c Choice, RegistryError> {
        let id = self.selected.as_deref().ok_or(RegistryError::NoChoiceSelected)?;
        choices
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| RegistryError::UnknownChoice(id.to_string()))
    }

    fn wrong_capability(&self, wanted: Capability) -> RegistryError {
        RegistryError::WrongCapability {
            key: WidgetKey::new(self.capability, self.target.slot),
            wanted,
        }
    }
}
