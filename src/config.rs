use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LayoutVariant {
    /// Free clustering around the center.
    #[default]
    Free,
    /// Nodes held on a ring around the center.
    Ring,
}

impl LayoutVariant {
    pub fn label(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Ring => "Ring",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ChargeStrategy {
    /// Exact below [`ChargeStrategy::AUTO_EXACT_LIMIT`] nodes, Barnes-Hut above.
    #[default]
    Auto,
    Exact,
    BarnesHut { theta: f32 },
}

impl ChargeStrategy {
    pub const AUTO_EXACT_LIMIT: usize = 256;
    pub const DEFAULT_THETA: f32 = 0.9;

    pub fn label(self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Exact => "Exact",
            Self::BarnesHut { .. } => "Barnes-Hut",
        }
    }

    /// `None` means exact pairwise summation.
    pub fn theta_for(self, node_count: usize) -> Option<f32> {
        match self {
            Self::Exact => None,
            Self::BarnesHut { theta } => Some(theta),
            Self::Auto if node_count < Self::AUTO_EXACT_LIMIT => None,
            Self::Auto => Some(Self::DEFAULT_THETA),
        }
    }
}

/// Tunables for the force model and integrator. Every field has a default so
/// a JSON file only needs the values it overrides.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceParams {
    pub layout: LayoutVariant,
    pub link_distance: f32,
    /// Fixed per-link strength; `None` uses the inverse endpoint degree.
    pub link_strength: Option<f32>,
    pub charge_strength: f32,
    pub charge_strategy: ChargeStrategy,
    pub center_strength: f32,
    pub radial_radius: f32,
    pub radial_strength: f32,
    pub collision_strength: f32,
    pub collision_padding: f32,
    pub velocity_decay: f32,
    pub alpha_min: f32,
    pub reheat_alpha_target: f32,
    pub settle_ticks: u32,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            layout: LayoutVariant::Free,
            link_distance: 200.0,
            link_strength: None,
            charge_strength: -400.0,
            charge_strategy: ChargeStrategy::Auto,
            center_strength: 0.05,
            radial_radius: 320.0,
            radial_strength: 0.1,
            collision_strength: 0.7,
            collision_padding: 4.0,
            velocity_decay: 0.4,
            alpha_min: 0.001,
            reheat_alpha_target: 0.3,
            settle_ticks: 300,
        }
    }
}

impl ForceParams {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read force config {}", path.display()))?;
        let params: Self = serde_json::from_str(&raw)
            .with_context(|| format!("invalid force config {}", path.display()))?;
        Ok(params.sanitized())
    }

    /// Clamps values into ranges the integrator stays stable in.
    pub fn sanitized(mut self) -> Self {
        self.link_distance = self.link_distance.clamp(10.0, 2_000.0);
        self.link_strength = self.link_strength.map(|strength| strength.clamp(0.0, 2.0));
        self.charge_strength = self.charge_strength.clamp(-5_000.0, 5_000.0);
        if let ChargeStrategy::BarnesHut { theta } = &mut self.charge_strategy {
            *theta = theta.clamp(0.1, 2.0);
        }
        self.center_strength = self.center_strength.clamp(0.0, 1.0);
        self.radial_radius = self.radial_radius.clamp(0.0, 5_000.0);
        self.radial_strength = self.radial_strength.clamp(0.0, 1.0);
        self.collision_strength = self.collision_strength.clamp(0.0, 1.0);
        self.collision_padding = self.collision_padding.clamp(0.0, 100.0);
        self.velocity_decay = self.velocity_decay.clamp(0.01, 0.99);
        self.alpha_min = self.alpha_min.clamp(1e-5, 0.5);
        self.reheat_alpha_target = self.reheat_alpha_target.clamp(0.0, 1.0);
        self.settle_ticks = self.settle_ticks.clamp(10, 10_000);
        self
    }

    /// Decay rate that brings a cold simulation from 1 to `alpha_min` in
    /// `settle_ticks` ticks.
    pub fn alpha_decay(&self) -> f32 {
        1.0 - self.alpha_min.powf(1.0 / self.settle_ticks as f32)
    }
}
