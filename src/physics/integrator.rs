use eframe::egui::Vec2;

use crate::graph::Graph;

use super::forces::{ForceContext, ForceModel};
use super::quadtree::QuadNode;
use super::state::{Phase, SimulationState};

/// Reused per-tick buffers.
#[derive(Default)]
struct PhysicsScratch {
    positions: Vec<Vec2>,
    radii: Vec<f32>,
    links: Vec<(usize, usize)>,
    degrees: Vec<usize>,
    forces: Vec<Vec2>,
}

impl PhysicsScratch {
    fn load(&mut self, graph: &Graph) {
        let node_count = graph.node_count();
        self.positions.clear();
        self.radii.clear();
        for node in graph.nodes() {
            self.positions.push(node.position);
            self.radii.push(node.radius);
        }

        graph.resolve_edges_into(&mut self.links);
        self.degrees.clear();
        self.degrees.resize(node_count, 0);
        for &(source, target) in &self.links {
            self.degrees[source] += 1;
            self.degrees[target] += 1;
        }

        self.forces.clear();
        self.forces.resize(node_count, Vec2::ZERO);
    }
}

pub struct Integrator {
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f32,
    scratch: PhysicsScratch,
}

impl Integrator {
    pub fn new(velocity_decay: f32) -> Self {
        Self {
            velocity_decay: velocity_decay.clamp(0.0, 1.0),
            scratch: PhysicsScratch::default(),
        }
    }

    /// Advances one tick and returns the phase after it.
    ///
    /// Pins are applied first, so drag updates made between ticks are visible
    /// to this tick's force evaluation. The whole field is computed from the
    /// positions at the start of the tick before any node moves.
    pub fn step(
        &mut self,
        graph: &mut Graph,
        model: &ForceModel,
        state: &mut SimulationState,
        dt: f32,
    ) -> Phase {
        match state.phase() {
            Phase::Idle => return Phase::Idle,
            Phase::Settled => {
                state.set_phase(Phase::Idle);
                return Phase::Idle;
            }
            Phase::Running => {}
        }

        if graph.is_empty() {
            state.set_phase(Phase::Idle);
            return Phase::Idle;
        }

        for node in graph.nodes_mut() {
            if let Some(pin) = node.pinned {
                node.position = pin;
                node.velocity = Vec2::ZERO;
            }
        }

        let alpha = state.decay();

        let scratch = &mut self.scratch;
        scratch.load(graph);
        let quadtree = if model.needs_quadtree(graph.node_count()) {
            QuadNode::build(&scratch.positions)
        } else {
            None
        };
        let ctx = ForceContext {
            positions: &scratch.positions,
            radii: &scratch.radii,
            links: &scratch.links,
            degrees: &scratch.degrees,
            quadtree: quadtree.as_ref(),
            alpha,
        };
        model.accumulate(&ctx, &mut scratch.forces);

        let retain = 1.0 - self.velocity_decay;
        for (node, force) in graph.nodes_mut().iter_mut().zip(&scratch.forces) {
            if let Some(pin) = node.pinned {
                node.position = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            let velocity = (node.velocity + *force * dt) * retain;
            let position = node.position + velocity;
            if is_finite(velocity) && is_finite(position) {
                node.velocity = velocity;
                node.position = position;
            } else {
                node.velocity = Vec2::ZERO;
            }
        }

        if alpha < state.alpha_min {
            state.set_phase(Phase::Settled);
        }
        state.phase()
    }
}

fn is_finite(value: Vec2) -> bool {
    value.x.is_finite() && value.y.is_finite()
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::config::ForceParams;
    use crate::graph::build;
    use crate::ledger::{Amount, Transaction};
    use crate::physics::forces::Force;

    fn pair() -> Graph {
        build(&[Transaction::new("0xa", Some("0xb"), Amount::Decimal(1.0))])
    }

    #[test]
    fn idle_state_does_not_move_nodes() {
        let mut graph = pair();
        graph.nodes_mut()[0].position = vec2(1.0, 2.0);
        let params = ForceParams::default();
        let mut state = SimulationState::idle(&params);
        let mut integrator = Integrator::new(0.4);

        let model = ForceModel::from_params(&params);
        let phase = integrator.step(&mut graph, &model, &mut state, 1.0);
        assert_eq!(phase, Phase::Idle);
        assert_eq!(graph.nodes()[0].position, vec2(1.0, 2.0));
        assert_eq!(state.alpha, 0.0);
    }

    #[test]
    fn velocity_integrates_force_with_decay() {
        let mut graph = pair();
        graph.nodes_mut()[0].position = vec2(0.0, 0.0);
        graph.nodes_mut()[1].position = vec2(100.0, 0.0);
        let model = ForceModel::new(vec![Force::Center {
            target: Vec2::ZERO,
            strength: 0.1,
        }]);
        let mut state = SimulationState::new(&ForceParams::default());
        state.alpha_decay = 0.5;
        let mut integrator = Integrator::new(0.5);

        integrator.step(&mut graph, &model, &mut state, 1.0);
        // alpha 1 -> 0.5, force -100 * 0.1 * 0.5 = -5, velocity halved.
        assert!((graph.nodes()[1].velocity - vec2(-2.5, 0.0)).length() < 1e-5);
        assert!((graph.nodes()[1].position - vec2(97.5, 0.0)).length() < 1e-5);
        assert_eq!(graph.nodes()[0].position, Vec2::ZERO);
    }

    #[test]
    fn alpha_decays_toward_target() {
        let mut state = SimulationState::new(&ForceParams::default());
        state.alpha_target = 0.3;
        state.alpha = 0.1;
        state.alpha_decay = 0.5;
        let alpha = state.decay();
        assert!((alpha - 0.2).abs() < 1e-6);
    }

    #[test]
    fn settles_then_goes_idle() {
        let mut graph = pair();
        let params = ForceParams::default();
        let model = ForceModel::from_params(&params);
        let mut state = SimulationState::new(&params);
        state.alpha = params.alpha_min * 1.01;
        let mut integrator = Integrator::new(params.velocity_decay);

        assert_eq!(integrator.step(&mut graph, &model, &mut state, 1.0), Phase::Settled);
        assert_eq!(integrator.step(&mut graph, &model, &mut state, 1.0), Phase::Idle);
        assert!(!state.is_running());
    }

    #[test]
    fn non_finite_results_keep_previous_position() {
        let mut graph = pair();
        graph.nodes_mut()[0].position = vec2(3.0, 4.0);
        graph.nodes_mut()[1].position = vec2(f32::MAX, 0.0);
        let model = ForceModel::new(vec![Force::Center {
            target: vec2(-f32::MAX, 0.0),
            strength: 1.0,
        }]);
        let mut state = SimulationState::new(&ForceParams::default());
        let mut integrator = Integrator::new(0.0);

        integrator.step(&mut graph, &model, &mut state, 1.0);
        assert_eq!(graph.nodes()[1].position, vec2(f32::MAX, 0.0));
        assert_eq!(graph.nodes()[1].velocity, Vec2::ZERO);
    }
}
