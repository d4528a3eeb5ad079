//! Consolidated test utilities for git-launcher
//!
//! Integration tests drive real git against local bare repositories, with
//! scripted stand-ins for the interactive chooser and remote search.

pub mod assertions;
pub mod fixtures;
pub mod repository;
