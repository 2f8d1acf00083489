//! Crate-level tests covering bootstrap, launch sequencing, and host-facing
//! behaviour.

mod bootstrap;
pub(crate) mod support;
