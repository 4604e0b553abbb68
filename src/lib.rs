// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Gym-Tracker: assessment-driven workout plans with auto-saved set logging
//!
//! This crate provides the backend API that turns a short training
//! assessment into lettered workout splits, records sessions set by set,
//! and aggregates history into streaks, trends, and personal records.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::SqliteDb;
use services::DashboardCache;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: SqliteDb,
    pub dashboard_cache: DashboardCache,
}

impl AppState {
    pub fn new(config: Config, db: SqliteDb) -> Self {
        let dashboard_cache = DashboardCache::new(config.dashboard_cache_ttl_secs);
        Self {
            config,
            db,
            dashboard_cache,
        }
    }
}
