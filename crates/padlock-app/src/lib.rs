//! Padlock widget registry
//!
//! Builds and owns the padlock and choice widgets of every paired peer, and
//! the one interaction session they share.
//!
//! # Architecture
//!
//! [`PeerComboRegistry`] keeps one [`WidgetSet`] per peer, keyed by
//! `(capability, slot)`. Sets are built whole and replaced whole by
//! [`PeerComboRegistry::rebuild_for`], so no widget outlives the peer data
//! it was built for. The interaction cursor and the active gag layer live in
//! a [`Session`] owned by the registry rather than in process-wide statics.
//!
//! Items and choice lists are never cached. Every operation takes an
//! [`ItemSource`] or [`ChoiceSource`] and asks it for the current state.

#![forbid(unsafe_code)]

pub mod choice;
pub mod config;
pub mod error;
pub mod registry;
pub mod session;
pub mod source;
pub mod widget;

pub use choice::ChoiceSelection;
pub use config::RegistryConfig;
pub use error::RegistryError;
pub use registry::PeerComboRegistry;
pub use session::{Interaction, InteractionKind, Session};
pub use source::{Choice, ChoiceSource, ItemSource};
pub use widget::{Capability, Widget, WidgetKey, WidgetSet};
