//! Profile persistence with file locking.
//!
//! The onboarding result (metrics plus computed goals) is stored as a single
//! JSON document and replaced atomically on every save.

use crate::{store, GoalBreakdown, Result, UserMetrics, UserProfile};
use chrono::Utc;
use std::path::Path;

impl UserProfile {
    /// Build a profile from a fresh calculation
    pub fn from_breakdown(metrics: UserMetrics, breakdown: &GoalBreakdown) -> Self {
        Self {
            metrics,
            goals: breakdown.result,
            computed_at: Utc::now(),
        }
    }

    /// Load the profile from a file with shared locking
    ///
    /// Returns `None` if the file doesn't exist. If the file is unreadable or
    /// corrupted, logs a warning and returns `None` so the user can recalculate.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let profile = store::load_json(path, "profile")?;
        if profile.is_none() && path.exists() {
            tracing::warn!("Run `fuel calc --save` to recreate the profile");
        }
        Ok(profile)
    }

    /// Save the profile with exclusive locking
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames it
    /// over the original.
    pub fn save(&self, path: &Path) -> Result<()> {
        store::save_json(path, self)?;
        tracing::debug!("Saved profile to {:?}", path);
        Ok(())
    }
}
