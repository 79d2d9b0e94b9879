//! Utility functions for filesystem paths.

pub mod paths;
