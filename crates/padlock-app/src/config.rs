//! Registry configuration.

/// Shape of the widget set built for every peer.
///
/// Every peer has exactly one restraint set, so only the gag layers vary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Number of layered gag slots, which is also the number of selectable
    /// layers.
    pub gag_layers: u8,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { gag_layers: 3 }
    }
}
