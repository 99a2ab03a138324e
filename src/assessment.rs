//! Assessment: resolve a postal code, then draw fresh risk figures for it.

use crate::location::{format_coords, LocationError, LocationResolver, ResolvedLocation};
use crate::risk::{RiskAssessment, RiskBands, RiskIndicators, RiskSampler, RiskTier};
use chrono::{DateTime, Utc};
use chrono_tz::Asia::Singapore;
use chrono_tz::Tz;
use rand::Rng;
use serde::Serialize;

pub const MAP_ZOOM: u8 = 16;
pub const RISK_CIRCLE_RADIUS_M: u32 = 80;

/// Short explanation for the well-known climate scenarios.
pub fn scenario_description(name: &str) -> &'static str {
    match name.to_ascii_lowercase().as_str() {
        "baseline" => "Current rainfall patterns and tidal conditions",
        "rcp8.5" | "rcp85" => "Future worst-case scenario with increased rainfall and sea level rise",
        _ => "Custom scenario",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario: String,
    pub description: &'static str,
    pub depth_m: f64,
    pub tier: RiskTier,
    pub color: &'static str,
    pub text_color: &'static str,
}

impl ScenarioResult {
    fn new(scenario: &str, draw: RiskAssessment) -> Self {
        Self {
            scenario: scenario.to_string(),
            description: scenario_description(scenario),
            depth_m: draw.depth_m,
            tier: draw.tier,
            color: draw.tier.color(),
            text_color: draw.tier.text_color(),
        }
    }

    pub fn depth_label(&self) -> String {
        format!("{:.2}", self.depth_m)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskCircle {
    pub radius_m: u32,
    pub color: &'static str,
    pub label: String,
}

/// What the front end needs to draw the map.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
    pub marker_popup: String,
    pub circle: RiskCircle,
}

impl MapView {
    fn new(location: &ResolvedLocation, headline: &ScenarioResult) -> Self {
        Self {
            center: [location.lat, location.lon],
            zoom: MAP_ZOOM,
            marker_popup: format!(
                "{}\nPostal Code: {}\n{} Risk: {}",
                location.address, location.postal_code, headline.scenario, headline.tier
            ),
            circle: RiskCircle {
                radius_m: RISK_CIRCLE_RADIUS_M,
                color: headline.color,
                label: format!("Risk Level: {}", headline.tier),
            },
        }
    }

    pub fn openstreetmap_url(&self) -> String {
        let [lat, lon] = self.center;
        format!(
            "https://www.openstreetmap.org/?mlat={lat:.5}&mlon={lon:.5}#map={}/{lat:.5}/{lon:.5}",
            self.zoom
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub postal_code: String,
    pub location: ResolvedLocation,
    pub formatted_coords: String,
    pub scenarios: Vec<ScenarioResult>,
    /// Index into `scenarios` of the figure shown on the map.
    pub headline: usize,
    pub indicators: RiskIndicators,
    pub guidance: &'static str,
    pub map: MapView,
    pub assessed_at: DateTime<Tz>,
}

impl Assessment {
    pub fn headline(&self) -> &ScenarioResult {
        &self.scenarios[self.headline]
    }

    /// Plain-text report for the terminal.
    pub fn render_text(&self, bands: &RiskBands) -> String {
        let loc = &self.location;
        let yes_no = |b: bool| if b { "YES" } else { "NO" };
        let mut out = String::new();

        out.push_str("Location Details\n");
        out.push_str(&format!("  Address:     {}\n", loc.address));
        out.push_str(&format!("  Road:        {}\n", loc.road_name));
        out.push_str(&format!("  Building:    {}\n", loc.building_label()));
        out.push_str(&format!("  Postal Code: {}\n", self.postal_code));
        out.push_str(&format!("  Coordinates: {}\n\n", self.formatted_coords));

        out.push_str("Flood Risk Summary\n");
        out.push_str(&format!("  {:<10} {:>15}  {}\n", "Scenario", "Flood Depth (m)", "Risk Level"));
        for s in &self.scenarios {
            out.push_str(&format!("  {:<10} {:>15}  {}\n", s.scenario, s.depth_label(), s.tier));
        }
        out.push_str(&format!(
            "  Legend: Low ({})  Medium ({})  High ({})\n\n",
            bands.describe(RiskTier::Low),
            bands.describe(RiskTier::Medium),
            bands.describe(RiskTier::High),
        ));

        out.push_str("Additional Risk Indicators\n");
        out.push_str(&format!("  Flood-prone Area: {}\n", yes_no(self.indicators.flood_prone)));
        out.push_str(&format!("  Flood Hotspot:    {}\n\n", yes_no(self.indicators.flood_hotspot)));

        out.push_str(&format!("Guidance ({} risk)\n", self.headline().tier));
        out.push_str(&format!("  {}\n\n", self.guidance));
        out.push_str(&format!("Map: {}\n", self.map.openstreetmap_url()));
        out
    }
}

/// Resolver plus sampler. Holds no mutable state.
pub struct Assessor {
    resolver: LocationResolver,
    sampler: RiskSampler,
    scenarios: Vec<String>,
}

impl Assessor {
    /// `scenarios` must not be empty; an empty list falls back to a single "Baseline".
    pub fn new(resolver: LocationResolver, sampler: RiskSampler, scenarios: Vec<String>) -> Self {
        let scenarios = if scenarios.is_empty() { vec!["Baseline".to_string()] } else { scenarios };
        Self { resolver, sampler, scenarios }
    }

    pub fn sampler(&self) -> &RiskSampler {
        &self.sampler
    }

    pub fn scenarios(&self) -> &[String] {
        &self.scenarios
    }

    pub fn resolve(&self, raw: &str) -> Result<ResolvedLocation, LocationError> {
        self.resolver.resolve(raw)
    }

    pub fn assess(&self, raw: &str) -> Result<Assessment, LocationError> {
        self.assess_with(raw, &mut rand::thread_rng())
    }

    /// Risk figures are drawn only after the location resolves.
    pub fn assess_with<R: Rng + ?Sized>(&self, raw: &str, rng: &mut R) -> Result<Assessment, LocationError> {
        let location = self.resolver.resolve(raw)?;

        let scenarios: Vec<ScenarioResult> = self
            .scenarios
            .iter()
            .map(|name| ScenarioResult::new(name, self.sampler.sample_with(&mut *rng)))
            .collect();
        let headline = scenarios.len() - 1;
        let indicators = self.sampler.indicators_with(rng);
        let map = MapView::new(&location, &scenarios[headline]);

        Ok(Assessment {
            postal_code: location.postal_code.to_string(),
            formatted_coords: format_coords(location.lat, location.lon),
            guidance: scenarios[headline].tier.guidance(),
            headline,
            indicators,
            map,
            scenarios,
            location,
            assessed_at: Utc::now().with_timezone(&Singapore),
        })
    }
}
