// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod catalog;
pub mod dashboard_cache;
pub mod passwords;
pub mod progress;
pub mod split_generator;

pub use dashboard_cache::DashboardCache;
pub use passwords::{hash_password, verify_password, PasswordError};
pub use split_generator::{generate_splits, GeneratedSplit, SplitError};
