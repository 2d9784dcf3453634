//! # smpl-core
//!
//! A discrete-event simulation kernel modeled on MacDougall's `smpl`: a
//! future-event list ordered by simulated time, and a facility abstraction
//! (a multi-server semaphore with priority queueing) through which
//! simulated processes contend for shared resources.
//!
//! The consumer is simulation-program code: it schedules events, pulls them
//! out in time order via `Simulator::cause`, and reacts by scheduling
//! further events and acquiring/releasing facilities. Reporting, input
//! parsing, random-number generation, and CLI/packaging are all out of
//! scope here; see `Simulator` for the kernel's public surface.

pub mod events;
pub mod facility;
pub mod ids;
pub mod prelude;
pub mod sim;

pub use prelude::*;
