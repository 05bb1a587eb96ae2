//! Domain types and the ports through which the dispatcher talks to the
//! donation platform and the analytics endpoint.

pub mod flag;
pub mod hit;
pub mod payment;
pub mod ports;
