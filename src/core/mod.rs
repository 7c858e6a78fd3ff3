//! Sensor polling, the shared store and UI-thread scheduling

pub mod backend_slot;
pub mod constants;
mod poller;
mod refresh;
mod scheduler;
mod store;

pub use backend_slot::BackendSlot;
pub use poller::{PollOutcome, PollerHandle, SensorPoller};
pub use refresh::{RefreshContext, RefreshLoop, RefreshOutcome};
pub use scheduler::{Scheduler, UiTask};
pub use store::SharedTelemetryStore;
