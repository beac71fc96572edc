//! Easing functions for animation timing.
//!
//! This module implements the polynomial timing curves used by keyframe tracks:
//! - Linear
//! - EaseInCubic, EaseOutCubic, EaseInOutCubic
//! - EaseInQuart, EaseOutQuart
//!
//! Every curve maps `0.0 → 0.0` and `1.0 → 1.0` exactly.
//!
//! # Usage
//!
//! ```
//! use rune_motion::easing::Easing;
//!
//! let ease = Easing::EaseOutCubic;
//! let progress = ease.evaluate(0.5); // 0.875
//!
//! let by_name = Easing::from_name("easeInQuart");
//! assert_eq!(by_name, Easing::EaseInQuart);
//! ```

use serde::{Deserialize, Serialize};

/// Easing function for animation timing.
///
/// Easing functions map a linear progress value (0.0 to 1.0) to an eased
/// output value, controlling the rate of change over time.
///
/// Serialized by its camelCase name (`"easeInOutCubic"`). Unknown names
/// deserialize to [`Easing::Linear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Easing {
    /// No easing.
    #[default]
    Linear,
    /// `t³` - slow start.
    EaseInCubic,
    /// `1 - (1 - t)³` - slow end.
    EaseOutCubic,
    /// Cubic ease-in for the first half, ease-out for the second.
    EaseInOutCubic,
    /// `t⁴` - slower start than cubic.
    EaseInQuart,
    /// `1 - (1 - t)⁴` - slower end than cubic.
    EaseOutQuart,
}

impl Easing {
    /// All supported easing curves.
    pub const ALL: [Easing; 6] = [
        Self::Linear,
        Self::EaseInCubic,
        Self::EaseOutCubic,
        Self::EaseInOutCubic,
        Self::EaseInQuart,
        Self::EaseOutQuart,
    ];

    /// Evaluate the easing function at the given progress.
    ///
    /// Input is clamped to `[0, 1]`.
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseInCubic => t * t * t,
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::EaseInQuart => t * t * t * t,
            Self::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
        }
    }

    /// Name used in authored definitions.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseInCubic => "easeInCubic",
            Self::EaseOutCubic => "easeOutCubic",
            Self::EaseInOutCubic => "easeInOutCubic",
            Self::EaseInQuart => "easeInQuart",
            Self::EaseOutQuart => "easeOutQuart",
        }
    }

    /// Look up an easing by name, falling back to [`Easing::Linear`] for
    /// unknown names.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|e| e.name() == name)
            .unwrap_or_else(|| {
                tracing::warn!(easing = %name, "unknown easing, falling back to linear");
                Self::Linear
            })
    }
}

impl From<String> for Easing {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.name().to_string()
    }
}
