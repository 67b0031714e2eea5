//! Library half of the `ragport` binary, split out so commands can be
//! exercised from tests.

pub mod cli;
pub mod commands;
pub mod factories;
