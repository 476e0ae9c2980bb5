//! Fixtures shared by the unit tests.

pub(crate) mod factories;
