//! Padlock selection core
//!
//! Pure state machine logic for choosing, applying and removing padlocks on
//! lockable items, decoupled from both the UI toolkit and the network.
//!
//! # Architecture
//!
//! A [`LockSelection`] owns only transient edit state. The item it acts on
//! is owned by an external data layer and passed in fresh on every call, so
//! the widget can never act on a stale copy. Lock and unlock gestures are
//! validated locally and turned into request payloads handed to a
//! [`Dispatcher`]; drawing goes through a [`Renderer`]. Both are traits so
//! the same logic runs against a real toolkit and client or against scripted
//! fakes in tests.
//!
//! # Components
//!
//! - [`variant`]: Padlock kinds and their input requirements
//! - [`lockable`]: The [`Lockable`] capability and item addressing
//! - [`items`]: Gag slot and restraint set item kinds
//! - [`selection`]: The lock selection state machine
//! - [`validate`] / [`timer`]: Input validation and timer parsing
//! - [`dispatch`] / [`render`]: Collaborator traits
//! - [`error`]: Error taxonomy

#![forbid(unsafe_code)]

pub mod buffer;
pub mod dispatch;
pub mod error;
pub mod items;
pub mod lockable;
pub mod render;
pub mod request;
pub mod selection;
pub mod timer;
pub mod validate;
pub mod variant;

pub use buffer::EditBuffer;
pub use dispatch::Dispatcher;
pub use error::{DispatchError, PadlockError, ValidationError};
pub use items::{GagSlot, LockGrants, RestraintSet};
pub use lockable::{ItemRef, Lockable, PeerId, SlotKey, SlotKind};
pub use render::{ComboOption, ComboResponse, Renderer, Tooltips};
pub use request::{ApplyRequest, Credentials, LockRequest, ToggleRequest, UnlockRequest};
pub use selection::{LockPhase, LockSelection, Settlement};
pub use variant::{FieldKind, FieldLayout, FieldRequirements, InputField, LockVariant};
