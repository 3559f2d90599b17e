//! The four-step journey stage recorded on each profile.
//!
//! Strictly forward in normal flow. Unlocking a university reverts a single
//! shortlist link's status, never the stage.

use serde::{Deserialize, Serialize};

/// Where the user is in their study-abroad journey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    BuildingProfile,
    DiscoveringUniversities,
    FinalizingUniversities,
    PreparingApplications,
}

impl Stage {
    /// Stage string as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::BuildingProfile => "building_profile",
            Stage::DiscoveringUniversities => "discovering_universities",
            Stage::FinalizingUniversities => "finalizing_universities",
            Stage::PreparingApplications => "preparing_applications",
        }
    }

    /// Parse a stored stage string. Unknown values fall back to the initial
    /// stage.
    pub fn parse(s: &str) -> Self {
        match s {
            "discovering_universities" => Stage::DiscoveringUniversities,
            "finalizing_universities" => Stage::FinalizingUniversities,
            "preparing_applications" => Stage::PreparingApplications,
            _ => Stage::BuildingProfile,
        }
    }

    /// Human-readable label shown on the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::BuildingProfile => "Stage 1: Building Profile",
            Stage::DiscoveringUniversities => "Stage 2: Discovering Universities",
            Stage::FinalizingUniversities => "Stage 3: Finalizing Universities",
            Stage::PreparingApplications => "Stage 4: Preparing Applications",
        }
    }

    /// Title-cased stage name, without the numbered prefix.
    pub fn title(&self) -> &'static str {
        match self {
            Stage::BuildingProfile => "Building Profile",
            Stage::DiscoveringUniversities => "Discovering Universities",
            Stage::FinalizingUniversities => "Finalizing Universities",
            Stage::PreparingApplications => "Preparing Applications",
        }
    }

    /// Stage after a profile save (create or update).
    ///
    /// NOTE: this is unconditional — re-submitting the profile moves an
    /// already-advanced stage back to discovery. Inherited behavior, kept
    /// on purpose; see DESIGN.md before changing it.
    pub fn after_profile_saved(self) -> Stage {
        Stage::DiscoveringUniversities
    }

    /// Stage after a shortlist is created. Only the first shortlist made
    /// during discovery advances the stage.
    pub fn after_shortlist(self) -> Stage {
        match self {
            Stage::DiscoveringUniversities => Stage::FinalizingUniversities,
            other => other,
        }
    }

    /// Stage after a lock. Locking always lands the user in application
    /// preparation, whatever stage they were in.
    pub fn after_lock(self) -> Stage {
        Stage::PreparingApplications
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrip() {
        for stage in [
            Stage::BuildingProfile,
            Stage::DiscoveringUniversities,
            Stage::FinalizingUniversities,
            Stage::PreparingApplications,
        ] {
            assert_eq!(Stage::parse(stage.as_str()), stage);
        }
    }

    #[test]
    fn parse_unknown_falls_back_to_initial() {
        assert_eq!(Stage::parse("garbage"), Stage::BuildingProfile);
        assert_eq!(Stage::parse(""), Stage::BuildingProfile);
    }

    #[test]
    fn serde_snake_case() {
        let json = serde_json::to_string(&Stage::PreparingApplications).unwrap();
        assert_eq!(json, "\"preparing_applications\"");
        let parsed: Stage = serde_json::from_str("\"discovering_universities\"").unwrap();
        assert_eq!(parsed, Stage::DiscoveringUniversities);
    }

    #[test]
    fn profile_save_resets_stage_even_from_later_stages() {
        // Inherited regression, preserved: resubmission moves backward.
        assert_eq!(
            Stage::PreparingApplications.after_profile_saved(),
            Stage::DiscoveringUniversities
        );
        assert_eq!(
            Stage::BuildingProfile.after_profile_saved(),
            Stage::DiscoveringUniversities
        );
    }

    #[test]
    fn only_discovery_advances_on_shortlist() {
        assert_eq!(
            Stage::DiscoveringUniversities.after_shortlist(),
            Stage::FinalizingUniversities
        );
        assert_eq!(
            Stage::PreparingApplications.after_shortlist(),
            Stage::PreparingApplications
        );
        assert_eq!(
            Stage::BuildingProfile.after_shortlist(),
            Stage::BuildingProfile
        );
    }

    #[test]
    fn lock_always_reaches_terminal_stage() {
        for stage in [
            Stage::BuildingProfile,
            Stage::DiscoveringUniversities,
            Stage::FinalizingUniversities,
            Stage::PreparingApplications,
        ] {
            assert_eq!(stage.after_lock(), Stage::PreparingApplications);
        }
    }
}
