//! Activation gating.
//!
//! Linking only ever runs under the interactive dev server. On top of that it
//! needs either the `DEV_LINK=true` environment toggle or a simplified config
//! form, which implies intent on its own.

use crate::host::RunMode;

/// Environment variable that opts a session into linking.
pub const ENV_TOGGLE: &str = "DEV_LINK";

/// `true` when `DEV_LINK=true` is set in the process environment.
#[must_use]
pub fn env_toggle_enabled() -> bool {
    std::env::var(ENV_TOGGLE).is_ok_and(|value| value.trim() == "true")
}

/// Inputs to the activation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    /// Host run mode.
    pub mode: RunMode,
    /// Hard on/off switch from session options.
    pub enabled: bool,
    /// Environment toggle state.
    pub env_toggle: bool,
    /// A simplified config form was supplied.
    pub simplified: bool,
}

impl Activation {
    /// Whether resolution and propagation should run.
    #[must_use]
    pub fn is_active(self) -> bool {
        self.enabled && self.mode == RunMode::Serve && (self.env_toggle || self.simplified)
    }

    /// Log why the session stays inactive, when the reason is actionable.
    pub fn explain(self) {
        if self.enabled && self.mode == RunMode::Serve && !self.is_active() {
            tracing::info!("dev-link is off; set {ENV_TOGGLE}=true to link local packages");
        }
    }
}
