use eframe::egui::Vec2;

use crate::config::{ChargeStrategy, ForceParams, LayoutVariant};
use crate::util::fallback_direction;

use super::quadtree::QuadNode;

/// Below this separation two points are treated as coincident.
const MIN_DISTANCE: f32 = 1e-3;
/// Charge distances are softened below this (squared) separation.
const CHARGE_DISTANCE_MIN_SQ: f32 = 1.0;
/// Collision pairs are pruned through the quadtree from this node count on.
const COLLISION_TREE_MIN_NODES: usize = 64;

/// Read-only view of the graph for one tick.
pub struct ForceContext<'a> {
    pub positions: &'a [Vec2],
    pub radii: &'a [f32],
    pub links: &'a [(usize, usize)],
    pub degrees: &'a [usize],
    pub quadtree: Option<&'a QuadNode>,
    pub alpha: f32,
}

impl ForceContext<'_> {
    fn node_count(&self) -> usize {
        self.positions.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Force {
    /// Spring toward `distance` along every edge. `strength: None` weakens
    /// links on busy nodes by the inverse of the smaller endpoint degree.
    Link { distance: f32, strength: Option<f32> },
    /// Pairwise `strength / d` interaction; negative strength repels.
    Charge {
        strength: f32,
        strategy: ChargeStrategy,
    },
    /// Linear pull toward `target`.
    Center { target: Vec2, strength: f32 },
    /// Pull toward the circle of `radius` around `center`.
    Radial {
        center: Vec2,
        radius: f32,
        strength: f32,
    },
    /// Pushes apart nodes whose radii plus `padding` overlap.
    Collision { strength: f32, padding: f32 },
}

impl Force {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Link { .. } => "link",
            Self::Charge { .. } => "charge",
            Self::Center { .. } => "center",
            Self::Radial { .. } => "radial",
            Self::Collision { .. } => "collision",
        }
    }

    pub fn accumulate(&self, ctx: &ForceContext<'_>, forces: &mut [Vec2]) {
        match *self {
            Self::Link { distance, strength } => link(ctx, distance, strength, forces),
            Self::Charge { strength, strategy } => {
                match (strategy.theta_for(ctx.node_count()), ctx.quadtree) {
                    (Some(theta), Some(tree)) => {
                        charge_barnes_hut(ctx, tree, strength, theta, forces)
                    }
                    _ => charge_exact(ctx, strength, forces),
                }
            }
            Self::Center { target, strength } => {
                let scale = strength * ctx.alpha;
                for (force, position) in forces.iter_mut().zip(ctx.positions) {
                    *force += (target - *position) * scale;
                }
            }
            Self::Radial {
                center,
                radius,
                strength,
            } => radial(ctx, center, radius, strength, forces),
            Self::Collision { strength, padding } => collision(ctx, strength, padding, forces),
        }
    }

    fn wants_quadtree(&self, node_count: usize) -> bool {
        match self {
            Self::Charge { strategy, .. } => strategy.theta_for(node_count).is_some(),
            Self::Collision { .. } => node_count >= COLLISION_TREE_MIN_NODES,
            _ => false,
        }
    }
}

/// Ordered set of force terms, summed in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForceModel {
    forces: Vec<Force>,
}

impl ForceModel {
    pub fn new(forces: Vec<Force>) -> Self {
        Self { forces }
    }

    pub fn from_params(params: &ForceParams) -> Self {
        let link = Force::Link {
            distance: params.link_distance,
            strength: params.link_strength,
        };
        let charge = Force::Charge {
            strength: params.charge_strength,
            strategy: params.charge_strategy,
        };
        let anchor = match params.layout {
            LayoutVariant::Free => Force::Center {
                target: Vec2::ZERO,
                strength: params.center_strength,
            },
            LayoutVariant::Ring => Force::Radial {
                center: Vec2::ZERO,
                radius: params.radial_radius,
                strength: params.radial_strength,
            },
        };
        let collision = Force::Collision {
            strength: params.collision_strength,
            padding: params.collision_padding,
        };

        Self::new(vec![link, charge, anchor, collision])
    }

    pub fn forces(&self) -> &[Force] {
        &self.forces
    }

    pub fn needs_quadtree(&self, node_count: usize) -> bool {
        self.forces
            .iter()
            .any(|force| force.wants_quadtree(node_count))
    }

    /// Overwrites `forces` with the summed field.
    pub fn accumulate(&self, ctx: &ForceContext<'_>, forces: &mut [Vec2]) {
        forces.fill(Vec2::ZERO);
        for force in &self.forces {
            force.accumulate(ctx, forces);
        }
    }
}

fn separation(from: Vec2, to: Vec2, a: usize, b: usize) -> Vec2 {
    let delta = to - from;
    if delta.length_sq() < MIN_DISTANCE * MIN_DISTANCE {
        fallback_direction(a, b) * MIN_DISTANCE
    } else {
        delta
    }
}

fn link(ctx: &ForceContext<'_>, distance: f32, strength: Option<f32>, forces: &mut [Vec2]) {
    let node_count = ctx.node_count();
    for &(source, target) in ctx.links {
        if source >= node_count || target >= node_count || source == target {
            continue;
        }

        let source_degree = ctx.degrees.get(source).copied().unwrap_or(1).max(1) as f32;
        let target_degree = ctx.degrees.get(target).copied().unwrap_or(1).max(1) as f32;
        let strength = strength.unwrap_or(1.0 / source_degree.min(target_degree));
        let bias = source_degree / (source_degree + target_degree);

        let delta = separation(ctx.positions[source], ctx.positions[target], source, target);
        let length = delta.length();
        let correction = delta * ((length - distance) / length * ctx.alpha * strength);

        forces[target] -= correction * bias;
        forces[source] += correction * (1.0 - bias);
    }
}

fn charge_between(delta: Vec2, weight: f32) -> Vec2 {
    let mut distance_sq = delta.length_sq();
    if distance_sq < CHARGE_DISTANCE_MIN_SQ {
        distance_sq = (CHARGE_DISTANCE_MIN_SQ * distance_sq).sqrt();
    }
    delta * (weight / distance_sq)
}

fn charge_exact(ctx: &ForceContext<'_>, strength: f32, forces: &mut [Vec2]) {
    let weight = strength * ctx.alpha;
    let positions = ctx.positions;
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let pull = charge_between(separation(positions[i], positions[j], i, j), weight);
            forces[i] += pull;
            forces[j] -= pull;
        }
    }
}

fn charge_barnes_hut(
    ctx: &ForceContext<'_>,
    tree: &QuadNode,
    strength: f32,
    theta: f32,
    forces: &mut [Vec2],
) {
    let weight = strength * ctx.alpha;
    for (index, force) in forces.iter_mut().enumerate() {
        let point = ctx.positions[index];
        if point.x.is_finite() && point.y.is_finite() {
            *force += charge_from_cell(tree, index, ctx.positions, weight, theta);
        }
    }
}

fn charge_from_cell(
    cell: &QuadNode,
    index: usize,
    positions: &[Vec2],
    weight: f32,
    theta: f32,
) -> Vec2 {
    if cell.mass <= 0.0 {
        return Vec2::ZERO;
    }

    let point = positions[index];
    if cell.is_leaf() {
        return cell
            .indices
            .iter()
            .filter(|&&other| other != index)
            .fold(Vec2::ZERO, |sum, &other| {
                sum + charge_between(separation(point, positions[other], index, other), weight)
            });
    }

    let delta = cell.center_of_mass - point;
    let distance = delta.length().max(MIN_DISTANCE);
    if !cell.bounds.contains(point) && cell.bounds.side() / distance < theta {
        return charge_between(delta, weight * cell.mass);
    }

    cell.children().fold(Vec2::ZERO, |sum, child| {
        sum + charge_from_cell(child, index, positions, weight, theta)
    })
}

fn radial(ctx: &ForceContext<'_>, center: Vec2, radius: f32, strength: f32, forces: &mut [Vec2]) {
    for (index, (force, position)) in forces.iter_mut().zip(ctx.positions).enumerate() {
        let offset = separation(center, *position, index, index);
        let distance = offset.length();
        *force += offset * ((radius - distance) * strength * ctx.alpha / distance);
    }
}

struct CollisionParams {
    strength: f32,
    padding: f32,
    reach_sq: f32,
}

fn collide(
    positions: &[Vec2],
    radii: &[f32],
    params: &CollisionParams,
    i: usize,
    j: usize,
    forces: &mut [Vec2],
) {
    let reach = radii[i] + radii[j] + params.padding;
    let delta = separation(positions[j], positions[i], j, i);
    let distance_sq = delta.length_sq();
    if distance_sq >= reach * reach {
        return;
    }

    let distance = distance_sq.sqrt();
    let push = delta * ((reach - distance) / distance * params.strength);
    let radius_i_sq = radii[i] * radii[i];
    let radius_j_sq = radii[j] * radii[j];
    let share = radius_j_sq / (radius_i_sq + radius_j_sq).max(f32::EPSILON);

    forces[i] += push * share;
    forces[j] -= push * (1.0 - share);
}

fn collision(ctx: &ForceContext<'_>, strength: f32, padding: f32, forces: &mut [Vec2]) {
    if strength <= 0.0 {
        return;
    }

    let max_radius = ctx.radii.iter().copied().fold(0.0_f32, f32::max);
    let reach = max_radius * 2.0 + padding;
    let params = CollisionParams {
        strength,
        padding,
        reach_sq: reach * reach,
    };

    match ctx.quadtree {
        Some(tree) if ctx.node_count() >= COLLISION_TREE_MIN_NODES => {
            collide_cells(tree, tree, true, ctx, &params, forces)
        }
        _ => {
            for i in 0..ctx.node_count() {
                for j in (i + 1)..ctx.node_count() {
                    collide(ctx.positions, ctx.radii, &params, i, j, forces);
                }
            }
        }
    }
}

/// Dual-tree walk over cell pairs close enough to hold overlapping nodes.
fn collide_cells(
    a: &QuadNode,
    b: &QuadNode,
    same_cell: bool,
    ctx: &ForceContext<'_>,
    params: &CollisionParams,
    forces: &mut [Vec2],
) {
    if a.bounds.gap_sq(b.bounds) > params.reach_sq {
        return;
    }

    if a.is_leaf() && b.is_leaf() {
        if same_cell {
            for (offset, &i) in a.indices.iter().enumerate() {
                for &j in &a.indices[offset + 1..] {
                    collide(ctx.positions, ctx.radii, params, i, j, forces);
                }
            }
        } else {
            for &i in &a.indices {
                for &j in &b.indices {
                    collide(ctx.positions, ctx.radii, params, i, j, forces);
                }
            }
        }
        return;
    }

    if same_cell {
        let children = a.children().collect::<Vec<_>>();
        for (offset, first) in children.iter().enumerate() {
            collide_cells(first, first, true, ctx, params, forces);
            for second in &children[offset + 1..] {
                collide_cells(first, second, false, ctx, params, forces);
            }
        }
        return;
    }

    let split_a = !a.is_leaf() && (b.is_leaf() || a.bounds.half_extent >= b.bounds.half_extent);
    if split_a {
        for child in a.children() {
            collide_cells(child, b, false, ctx, params, forces);
        }
    } else {
        for child in b.children() {
            collide_cells(a, child, false, ctx, params, forces);
        }
    }
}
