mod forces;
mod integrator;
mod interaction;
mod quadtree;
mod state;

use std::f32::consts::PI;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::config::ForceParams;
use crate::graph::Graph;

pub use forces::{Force, ForceModel};
pub use integrator::Integrator;
pub use interaction::InteractionController;
pub use quadtree::{QuadNode, QuadtreeCell, collect_cells};
pub use state::{Phase, SimulationState};

const INITIAL_SPACING: f32 = 10.0;

/// One live layout: the graph it owns plus the force model, integrator and
/// alpha state driving it. Replacing the graph means building a new one.
pub struct Simulation {
    graph: Graph,
    model: ForceModel,
    integrator: Integrator,
    state: SimulationState,
    params: ForceParams,
    ticks: u64,
}

impl Simulation {
    pub fn new(mut graph: Graph, params: ForceParams) -> Self {
        let params = params.sanitized();
        place_phyllotaxis(&mut graph);

        let state = if graph.is_empty() {
            SimulationState::idle(&params)
        } else {
            SimulationState::new(&params)
        };

        Self {
            graph,
            model: ForceModel::from_params(&params),
            integrator: Integrator::new(params.velocity_decay),
            state,
            params,
            ticks: 0,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn params(&self) -> &ForceParams {
        &self.params
    }

    pub fn model(&self) -> &ForceModel {
        &self.model
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Split borrow for the interaction controller.
    pub fn parts_mut(&mut self) -> (&mut Graph, &mut SimulationState) {
        (&mut self.graph, &mut self.state)
    }

    pub fn tick(&mut self) -> Phase {
        self.tick_with(1.0)
    }

    pub fn tick_with(&mut self, dt: f32) -> Phase {
        let was_running = self.state.is_running();
        let phase = self
            .integrator
            .step(&mut self.graph, &self.model, &mut self.state, dt);
        if was_running {
            self.ticks += 1;
        }
        if phase == Phase::Settled {
            debug!(ticks = self.ticks, nodes = self.graph.node_count(), "layout settled");
        }
        phase
    }

    /// False once the layout has gone idle; a settled layout still needs the
    /// tick that parks it.
    pub fn is_active(&self) -> bool {
        self.state.phase() != Phase::Idle
    }

    /// Ticks until the simulation stops or `max_ticks` is reached; returns the
    /// number of ticks that did work.
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut worked = 0;
        while worked < max_ticks && self.state.is_running() {
            self.tick();
            worked += 1;
        }
        if self.state.phase() == Phase::Settled {
            self.tick();
        }
        worked
    }

    /// Moves pinned nodes onto their pins without running the forces, for
    /// drags while the simulation is paused.
    pub fn snap_pins(&mut self) {
        for node in self.graph.nodes_mut() {
            if let Some(pin) = node.pinned {
                node.position = pin;
                node.velocity = Vec2::ZERO;
            }
        }
    }

    /// Applies new parameters to the running layout and reheats it.
    pub fn set_params(&mut self, params: ForceParams) {
        let params = params.sanitized();
        if params == self.params {
            return;
        }

        self.model = ForceModel::from_params(&params);
        self.integrator.velocity_decay = params.velocity_decay;
        self.state.alpha_decay = params.alpha_decay();
        self.state.alpha_min = params.alpha_min;
        self.params = params;
        self.reheat();
    }

    pub fn reheat(&mut self) {
        if !self.graph.is_empty() {
            self.state.restart(self.params.reheat_alpha_target.max(0.3));
        }
    }

    pub fn quadtree_cells(&self, cells: &mut Vec<QuadtreeCell>) {
        cells.clear();
        let positions = self
            .graph
            .nodes()
            .iter()
            .map(|node| node.position)
            .collect::<Vec<_>>();
        if let Some(tree) = QuadNode::build(&positions) {
            collect_cells(&tree, 0, cells);
        }
    }
}

/// Deterministic sunflower spiral around the origin.
fn place_phyllotaxis(graph: &mut Graph) {
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    for (index, node) in graph.nodes_mut().iter_mut().enumerate() {
        let radius = INITIAL_SPACING * (0.5 + index as f32).sqrt();
        let angle = index as f32 * golden_angle;
        node.position = vec2(angle.cos(), angle.sin()) * radius;
        node.velocity = Vec2::ZERO;
        node.pinned = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutVariant;
    use crate::graph::build;
    use crate::ledger::{Amount, Transaction};

    fn tx(from: &str, to: Option<&str>, amount: f64) -> Transaction {
        Transaction::new(from, to, Amount::Decimal(amount))
    }

    fn assert_separated(graph: &Graph) {
        let nodes = graph.nodes();
        for (offset, a) in nodes.iter().enumerate() {
            assert!(a.position.x.is_finite() && a.position.y.is_finite());
            for b in &nodes[offset + 1..] {
                let distance = (a.position - b.position).length();
                assert!(
                    distance > a.radius + b.radius,
                    "{} and {} overlap at distance {distance}",
                    a.id,
                    b.id
                );
            }
        }
    }

    /// Deterministic connected graph: a chain with a few chords and leaves.
    fn sample_transactions(count: usize) -> Vec<Transaction> {
        let address = |index: usize| format!("0x{index:04x}");
        let mut transactions = Vec::new();
        for index in 1..count {
            let parent = if index % 3 == 0 { index / 3 } else { index - 1 };
            transactions.push(tx(&address(parent), Some(&address(index)), index as f64));
        }
        for index in (0..count).step_by(7) {
            let target = address((index * 5 + 3) % count);
            transactions.push(tx(&address(index), Some(&target), 0.5));
        }
        transactions
    }

    #[test]
    fn reference_example_settles_without_overlap() {
        let graph = build(&[
            tx("0xA", Some("0xB"), 1.0),
            tx("0xB", Some("0xC"), 2.0),
            tx("0xA", None, 0.5),
        ]);
        let mut sim = Simulation::new(graph, ForceParams::default());

        let ticks = sim.run_until_settled(1_000);
        assert!(ticks <= 305, "took {ticks} ticks");
        assert!(sim.state().alpha < 0.001);
        assert_eq!(sim.graph().node_count(), 3);
        assert_separated(sim.graph());
    }

    #[test]
    fn fifty_nodes_settle_within_bound() {
        let graph = build(&sample_transactions(50));
        assert_eq!(graph.node_count(), 50);
        let mut sim = Simulation::new(graph, ForceParams::default());

        let ticks = sim.run_until_settled(1_000);
        assert!(ticks <= 305, "took {ticks} ticks");
        assert!(!sim.state().is_running());
        assert_separated(sim.graph());
        for node in sim.graph().nodes() {
            assert!(node.velocity.length() < 2.0, "{} still moving", node.id);
        }
    }

    #[test]
    fn ring_layout_holds_nodes_near_radius() {
        let params = ForceParams {
            layout: LayoutVariant::Ring,
            radial_strength: 0.4,
            ..ForceParams::default()
        };
        let graph = build(&sample_transactions(24));
        let mut sim = Simulation::new(graph, params);
        sim.run_until_settled(1_000);

        let mean = sim
            .graph()
            .nodes()
            .iter()
            .map(|node| node.position.length())
            .sum::<f32>()
            / sim.graph().node_count() as f32;
        assert!(
            (mean - params.radial_radius).abs() < params.radial_radius * 0.4,
            "mean radius {mean}"
        );
    }

    #[test]
    fn identical_input_gives_identical_layout() {
        let transactions = sample_transactions(30);
        let mut first = Simulation::new(build(&transactions), ForceParams::default());
        let mut second = Simulation::new(build(&transactions), ForceParams::default());
        first.run_until_settled(1_000);
        second.run_until_settled(1_000);

        for (a, b) in first.graph().nodes().iter().zip(second.graph().nodes()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn empty_graph_never_ticks() {
        let mut sim = Simulation::new(build(&[]), ForceParams::default());
        assert_eq!(sim.state().phase(), Phase::Idle);
        assert_eq!(sim.run_until_settled(100), 0);
        assert_eq!(sim.tick(), Phase::Idle);
        assert_eq!(sim.ticks(), 0);
    }

    #[test]
    fn settled_layout_goes_idle() {
        let mut sim = Simulation::new(build(&sample_transactions(8)), ForceParams::default());
        let ticks = sim.run_until_settled(1_000);
        assert_eq!(sim.state().phase(), Phase::Idle);
        assert!(!sim.is_active());
        assert_eq!(sim.ticks(), ticks as u64);

        sim.reheat();
        assert!(sim.is_active());
    }

    #[test]
    fn tick_budget_leaves_a_running_layout_running() {
        let mut sim = Simulation::new(build(&sample_transactions(8)), ForceParams::default());
        assert_eq!(sim.run_until_settled(5), 5);
        assert_eq!(sim.state().phase(), Phase::Running);
    }

    #[test]
    fn paused_drag_snaps_pinned_node() {
        let mut sim = Simulation::new(build(&sample_transactions(4)), ForceParams::default());
        sim.run_until_settled(1_000);
        let controller = InteractionController::new(0.3);
        let id = sim.graph().nodes()[1].id.clone();
        let other = sim.graph().nodes()[2].position;
        let ticks = sim.ticks();

        let (graph, state) = sim.parts_mut();
        controller.drag_start(graph, state, &id, vec2(400.0, -80.0));
        controller.drag_move(graph, &id, vec2(420.0, -90.0));
        sim.snap_pins();

        let node = sim.graph().node(&id).unwrap();
        assert_eq!(node.position, vec2(420.0, -90.0));
        assert_eq!(node.velocity, Vec2::ZERO);
        assert_eq!(sim.graph().nodes()[2].position, other);
        assert_eq!(sim.ticks(), ticks);
    }

    #[test]
    fn isolated_node_stays_finite() {
        let graph = build(&[tx("0xsolo", None, 1.0)]);
        let mut sim = Simulation::new(graph, ForceParams::default());
        sim.run_until_settled(1_000);
        let node = &sim.graph().nodes()[0];
        assert!(node.position.length() < 50.0);
    }

    #[test]
    fn parameter_change_reheats() {
        let mut sim = Simulation::new(build(&sample_transactions(10)), ForceParams::default());
        sim.run_until_settled(1_000);
        assert!(!sim.state().is_running());

        sim.set_params(ForceParams {
            link_distance: 80.0,
            ..ForceParams::default()
        });
        assert!(sim.state().is_running());
        assert!(sim.state().alpha >= 0.3);
        assert!(matches!(
            sim.model().forces()[0],
            Force::Link { distance, .. } if distance == 80.0
        ));

        sim.run_until_settled(1_000);
        sim.set_params(*sim.params());
        assert!(!sim.state().is_running());
    }

    #[test]
    fn barnes_hut_layout_converges_for_larger_graphs() {
        let graph = build(&sample_transactions(300));
        let mut sim = Simulation::new(graph, ForceParams::default());
        assert!(sim.model().needs_quadtree(sim.graph().node_count()));
        let ticks = sim.run_until_settled(1_000);
        assert!(ticks <= 305);
        assert!(sim
            .graph()
            .nodes()
            .iter()
            .all(|node| node.position.x.is_finite() && node.position.y.is_finite()));
    }
}
