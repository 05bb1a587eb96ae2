//! Application layer: guard and dispatch logic, extension hooks, and the
//! event bus that routes host signals to the dispatcher.
//!
//! `BeaconDispatcher` owns the boxed ports and is shared behind an `Arc` by
//! the handlers it registers on an `EventBus`.

pub mod dispatcher;
pub mod events;
pub mod hooks;
