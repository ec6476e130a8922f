#![doc = "ace-bar-core: core logic library for ace-bar."]

//! This crate contains the build-lifecycle chores around BAR packaging of
//! App Connect Enterprise / Integration Bus projects:
//! validating a project's identity, preparing the BAR build workspace from
//! dependency archives, and cleaning that workspace afterwards.
//!
//! # Usage
//! The `ace-bar` CLI crate wires these steps to command-line goals. Each step
//! takes its configuration explicitly and shares nothing with the others but
//! the workspace path.

pub mod clean;
pub mod contract;
pub mod descriptor;
pub mod filter;
pub mod prepare;
pub mod unpack;
pub mod validate;
