//! Test suites for the Orrery daemon.

mod bootstrap_unit;
pub(crate) mod support;
