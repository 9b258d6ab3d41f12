//! Git repository management.
//!
//! This module provides functionality for cloning and updating Git repositories.

mod config;
mod git_ops;
mod refs;

pub use config::{GitCheckoutConfig, GitCheckoutConfigBuilder};
pub use git_ops::{Checkout, GitRepository};
pub use refs::GitRef;
