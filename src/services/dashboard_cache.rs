// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user cache of computed dashboards.
//!
//! Entries expire after a TTL and are dropped explicitly by every write that
//! changes what the dashboard shows.

use crate::models::Dashboard;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// Longest accepted TTL (one week).
pub const MAX_TTL_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Clone)]
struct CachedDashboard {
    dashboard: Dashboard,
    expires_at: DateTime<Utc>,
}

/// Per-user state. `generation` is bumped by every invalidation so a
/// dashboard built before a write is never stored after it.
#[derive(Default)]
struct Slot {
    generation: u64,
    cached: Option<CachedDashboard>,
}

/// Shared dashboard cache (cheap to clone).
#[derive(Clone)]
pub struct DashboardCache {
    slots: Arc<DashMap<i64, Slot>>,
    ttl: Duration,
}

impl DashboardCache {
    /// TTLs above [`MAX_TTL_SECS`] are clamped.
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
        }
    }

    /// Cached dashboard for a user, if present and fresh.
    pub fn get(&self, user_id: i64) -> Option<Dashboard> {
        let mut slot = self.slots.get_mut(&user_id)?;
        let fresh = slot
            .cached
            .as_ref()
            .is_some_and(|c| c.expires_at > Utc::now());
        if !fresh {
            slot.cached = None;
            return None;
        }
        slot.cached.as_ref().map(|c| c.dashboard.clone())
    }

    /// Generation to pass to [`DashboardCache::insert`]; read it before
    /// building the dashboard.
    pub fn generation(&self, user_id: i64) -> u64 {
        self.slots.get(&user_id).map(|s| s.generation).unwrap_or(0)
    }

    /// Store a dashboard built at `generation`. Returns false, storing
    /// nothing, if the user's data was invalidated in the meantime.
    pub fn insert(&self, user_id: i64, generation: u64, dashboard: Dashboard) -> bool {
        let mut slot = self.slots.entry(user_id).or_default();
        if slot.generation != generation {
            tracing::debug!(
                user_id,
                generation,
                current = slot.generation,
                "Discarded stale dashboard"
            );
            return false;
        }
        slot.cached = Some(CachedDashboard {
            dashboard,
            expires_at: Utc::now() + self.ttl,
        });
        true
    }

    /// Forget a user's dashboard after a write.
    pub fn invalidate(&self, user_id: i64) {
        let mut slot = self.slots.entry(user_id).or_default();
        slot.generation = slot.generation.wrapping_add(1);
        if slot.cached.take().is_some() {
            tracing::debug!(user_id, "Dashboard cache invalidated");
        }
    }
}
