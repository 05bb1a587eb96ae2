//! CSV import of payment snapshots and event logs, and export of flag state.

pub mod event_reader;
pub mod flag_writer;
pub mod payment_reader;
