//! Simulated flood risk.
//!
//! There is no hydrological model here. Each draw picks a depth uniformly
//! from the configured range and classifies it with fixed threshold bands.
//! Draws are independent: the same postal code gives a different answer on
//! every call, and nothing is remembered between calls.

use crate::config::ConfigError;
use rand::Rng;
use serde::Serialize;
use std::fmt;

// ─── Tiers ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];

    /// Display colour as `#rrggbb`.
    pub fn color(self) -> &'static str {
        match self {
            Self::Low => "#50d890",
            Self::Medium => "#ffc26f",
            Self::High => "#ff595e",
        }
    }

    /// Black or white, whichever reads better on top of [`Self::color`].
    pub fn text_color(self) -> &'static str {
        text_color_for(self.color())
    }

    pub fn guidance(self) -> &'static str {
        match self {
            Self::Low => "Minimal flood impact; standard protective measures sufficient.",
            Self::Medium => "Monitor conditions; consider flood barriers or asset elevation.",
            Self::High => "Immediate action required; advise comprehensive mitigation strategies.",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Pick a text colour for a `#rrggbb` background by relative luminance.
/// Malformed colours fall back to black.
pub fn text_color_for(bg: &str) -> &'static str {
    let channel = |i: usize| {
        bg.get(i..i + 2)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .map(f64::from)
    };
    match (bg.len(), channel(1), channel(3), channel(5)) {
        (7, Some(r), Some(g), Some(b)) => {
            let luminance = (0.299 * r + 0.587 * g + 0.114 * b) / 255.0;
            if luminance > 0.5 { "black" } else { "white" }
        }
        _ => "black",
    }
}

// ─── Bands and range ─────────────────────────────────────────────

/// Threshold bands in metres: `depth < medium_from` is Low,
/// `depth < high_from` is Medium, anything else High.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskBands {
    pub medium_from: f64,
    pub high_from: f64,
}

impl Default for RiskBands {
    fn default() -> Self {
        Self { medium_from: 0.5, high_from: 1.0 }
    }
}

impl RiskBands {
    pub fn classify(&self, depth_m: f64) -> RiskTier {
        if depth_m < self.medium_from {
            RiskTier::Low
        } else if depth_m < self.high_from {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    /// Human-readable band for a tier, e.g. "0.5–1.0m".
    pub fn describe(&self, tier: RiskTier) -> String {
        match tier {
            RiskTier::Low => format!("<{:.1}m", self.medium_from),
            RiskTier::Medium => format!("{:.1}\u{2013}{:.1}m", self.medium_from, self.high_from),
            RiskTier::High => format!("\u{2265}{:.1}m", self.high_from),
        }
    }
}

/// Inclusive depth range in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthRange {
    pub min: f64,
    pub max: f64,
}

impl Default for DepthRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.5 }
    }
}

impl DepthRange {
    pub fn contains(&self, depth_m: f64) -> bool {
        (self.min..=self.max).contains(&depth_m)
    }
}

// ─── Draws ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub depth_m: f64,
    pub tier: RiskTier,
}

/// The two yes/no indicators shown next to the depth table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskIndicators {
    pub flood_prone: bool,
    pub flood_hotspot: bool,
}

/// Stateless sampler; holds only its configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskSampler {
    range: DepthRange,
    bands: RiskBands,
    flood_prone_probability: f64,
    hotspot_probability: f64,
}

impl Default for RiskSampler {
    fn default() -> Self {
        Self {
            range: DepthRange::default(),
            bands: RiskBands::default(),
            flood_prone_probability: 0.15,
            hotspot_probability: 0.10,
        }
    }
}

impl RiskSampler {
    /// Depths must be finite with `min <= max`; bands finite with
    /// `medium_from <= high_from`.
    pub fn new(range: DepthRange, bands: RiskBands) -> Result<Self, ConfigError> {
        if !range.min.is_finite() || !range.max.is_finite() {
            return Err(ConfigError::Invalid("depth range must be finite".into()));
        }
        if range.min > range.max {
            return Err(ConfigError::Invalid(format!(
                "depth_min ({}) must not exceed depth_max ({})",
                range.min, range.max
            )));
        }
        if !bands.medium_from.is_finite() || !bands.high_from.is_finite() || bands.medium_from > bands.high_from {
            return Err(ConfigError::Invalid(format!(
                "medium_from ({}) must not exceed high_from ({})",
                bands.medium_from, bands.high_from
            )));
        }
        Ok(Self {
            range,
            bands,
            ..Self::default()
        })
    }

    /// Both probabilities must lie within `0..=1`; NaN is rejected.
    pub fn with_indicator_probabilities(mut self, flood_prone: f64, hotspot: f64) -> Result<Self, ConfigError> {
        for (name, p) in [("flood_prone_probability", flood_prone), ("hotspot_probability", hotspot)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!("{} must be within 0..=1, got {}", name, p)));
            }
        }
        self.flood_prone_probability = flood_prone;
        self.hotspot_probability = hotspot;
        Ok(self)
    }

    pub fn range(&self) -> DepthRange {
        self.range
    }

    pub fn bands(&self) -> RiskBands {
        self.bands
    }

    /// One fresh draw from the thread-local RNG.
    pub fn sample(&self) -> RiskAssessment {
        self.sample_with(&mut rand::thread_rng())
    }

    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> RiskAssessment {
        let depth_m = rng.gen_range(self.range.min..=self.range.max);
        RiskAssessment {
            depth_m,
            tier: self.bands.classify(depth_m),
        }
    }

    pub fn indicators_with<R: Rng + ?Sized>(&self, rng: &mut R) -> RiskIndicators {
        RiskIndicators {
            flood_prone: rng.gen_bool(self.flood_prone_probability),
            flood_hotspot: rng.gen_bool(self.hotspot_probability),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_classify_default_bands() {
        let bands = RiskBands::default();
        assert_eq!(bands.classify(0.0), RiskTier::Low);
        assert_eq!(bands.classify(0.49), RiskTier::Low);
        assert_eq!(bands.classify(0.5), RiskTier::Medium);
        assert_eq!(bands.classify(0.99), RiskTier::Medium);
        assert_eq!(bands.classify(1.0), RiskTier::High);
        assert_eq!(bands.classify(1.5), RiskTier::High);
    }

    #[test]
    fn test_classify_custom_bands() {
        let bands = RiskBands { medium_from: 0.3, high_from: 0.6 };
        assert_eq!(bands.classify(0.2), RiskTier::Low);
        assert_eq!(bands.classify(0.45), RiskTier::Medium);
        assert_eq!(bands.classify(0.6), RiskTier::High);
    }

    #[test]
    fn test_collapsed_medium_band() {
        let bands = RiskBands { medium_from: 0.8, high_from: 0.8 };
        assert_eq!(bands.classify(0.79), RiskTier::Low);
        assert_eq!(bands.classify(0.8), RiskTier::High);
    }

    #[test]
    fn test_draws_stay_in_range_and_match_bands() {
        let sampler = RiskSampler::new(
            DepthRange { min: 0.1, max: 0.9 },
            RiskBands { medium_from: 0.3, high_from: 0.6 },
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..5_000 {
            let draw = sampler.sample_with(&mut rng);
            assert!(sampler.range().contains(draw.depth_m), "depth {}", draw.depth_m);
            assert_eq!(draw.tier, sampler.bands().classify(draw.depth_m));
        }
    }

    #[test]
    fn test_consecutive_samples_differ() {
        let sampler = RiskSampler::default();
        let depths: Vec<f64> = (0..20).map(|_| sampler.sample().depth_m).collect();
        assert!(depths.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_samples_cover_several_tiers() {
        let sampler = RiskSampler::default();
        let tiers: HashSet<RiskTier> = (0..200).map(|_| sampler.sample().tier).collect();
        assert!(tiers.len() > 1);
    }

    #[test]
    fn test_indicator_probabilities_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        let always = RiskSampler::default().with_indicator_probabilities(1.0, 1.0).unwrap();
        let never = RiskSampler::default().with_indicator_probabilities(0.0, 0.0).unwrap();
        for _ in 0..100 {
            assert_eq!(
                always.indicators_with(&mut rng),
                RiskIndicators { flood_prone: true, flood_hotspot: true }
            );
            assert_eq!(
                never.indicators_with(&mut rng),
                RiskIndicators { flood_prone: false, flood_hotspot: false }
            );
        }
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        let err = RiskSampler::new(DepthRange { min: 1.0, max: 0.5 }, RiskBands::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_new_rejects_non_finite_values() {
        let bad_ranges = [
            DepthRange { min: f64::NAN, max: 1.0 },
            DepthRange { min: 0.0, max: f64::INFINITY },
        ];
        for range in bad_ranges {
            assert!(RiskSampler::new(range, RiskBands::default()).is_err(), "{:?}", range);
        }
        let nan_bands = RiskBands { medium_from: f64::NAN, high_from: 1.0 };
        assert!(RiskSampler::new(DepthRange::default(), nan_bands).is_err());
        let inverted = RiskBands { medium_from: 1.0, high_from: 0.5 };
        assert!(RiskSampler::new(DepthRange::default(), inverted).is_err());
    }

    #[test]
    fn test_point_range_is_accepted() {
        let sampler = RiskSampler::new(DepthRange { min: 0.7, max: 0.7 }, RiskBands::default()).unwrap();
        let draw = sampler.sample();
        assert_eq!(draw.depth_m, 0.7);
        assert_eq!(draw.tier, RiskTier::Medium);
    }

    #[test]
    fn test_indicator_probabilities_rejected() {
        for (flood_prone, hotspot) in [(f64::NAN, 0.1), (0.1, f64::NAN), (-0.1, 0.1), (0.1, 1.5)] {
            let err = RiskSampler::default()
                .with_indicator_probabilities(flood_prone, hotspot)
                .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)));
        }
    }

    #[test]
    fn test_text_color_by_luminance() {
        assert_eq!(text_color_for("#ffffff"), "black");
        assert_eq!(text_color_for("#000000"), "white");
        assert_eq!(RiskTier::Low.text_color(), "black");
        assert_eq!(RiskTier::Medium.text_color(), "black");
        assert_eq!(text_color_for("oops"), "black");
    }

    #[test]
    fn test_band_descriptions() {
        let bands = RiskBands::default();
        assert_eq!(bands.describe(RiskTier::Low), "<0.5m");
        assert_eq!(bands.describe(RiskTier::Medium), "0.5–1.0m");
        assert_eq!(bands.describe(RiskTier::High), "≥1.0m");
    }
}
