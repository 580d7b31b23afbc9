//! Smart panel media engine: bootstrap and command-line front end over the
//! `sp-*` crates.

pub mod bootstrap;
pub mod cli;
