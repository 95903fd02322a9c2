//! Deterministic test harness for padlock widgets.
//!
//! In-memory stand-ins for everything the widgets talk to: a [`PeerStore`]
//! data layer, a [`DeferredDispatcher`] that delivers on a later frame, and a
//! [`ScriptedRenderer`] that plays back user gestures and records what was
//! drawn. [`ModelWorld`] is the reference model the model-based tests
//! compare [`RealWorld`], the real registry, against.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dispatcher;
pub mod model;
pub mod renderer;
pub mod store;
pub mod world;

pub use dispatcher::{DeferredDispatcher, Delivery, DispatcherConfig, Request};
pub use model::{ModelWorld, ObservableState, Operation, OperationError, OperationResult};
pub use renderer::ScriptedRenderer;
pub use store::{PeerData, PeerStore};
pub use world::RealWorld;

/// Install a `tracing` subscriber honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "padlock_core=debug,padlock_app=debug".into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}
