use eframe::egui::Vec2;

use crate::graph::{Graph, Node};
use crate::ledger::Address;

use super::state::SimulationState;

/// Drag-to-pin on top of a live simulation. Pins are node-local, so drags on
/// different nodes do not interfere.
#[derive(Clone, Copy, Debug)]
pub struct InteractionController {
    pub reheat_alpha_target: f32,
}

impl InteractionController {
    pub fn new(reheat_alpha_target: f32) -> Self {
        Self {
            reheat_alpha_target,
        }
    }

    pub fn drag_start(
        &self,
        graph: &mut Graph,
        state: &mut SimulationState,
        id: &Address,
        pointer: Vec2,
    ) -> bool {
        let Some(node) = graph.node_mut(id) else {
            return false;
        };

        node.pinned = Some(pointer);
        state.reheat(self.reheat_alpha_target);
        true
    }

    /// Moves the pin only; the integrator zeroes the velocity.
    pub fn drag_move(&self, graph: &mut Graph, id: &Address, pointer: Vec2) -> bool {
        match graph.node_mut(id) {
            Some(node) if node.is_pinned() => {
                node.pinned = Some(pointer);
                true
            }
            _ => false,
        }
    }

    /// Releases the pin. Alpha is left to decay naturally once the last
    /// dragged node is released.
    pub fn drag_end(&self, graph: &mut Graph, state: &mut SimulationState, id: &Address) -> bool {
        let Some(node) = graph.node_mut(id) else {
            return false;
        };

        node.pinned = None;
        if !graph.nodes().iter().any(Node::is_pinned) {
            state.cool();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::config::ForceParams;
    use crate::graph::build;
    use crate::ledger::{Amount, Transaction};
    use crate::physics::{Phase, Simulation};

    fn simulation() -> Simulation {
        let graph = build(&[
            Transaction::new("0xa", Some("0xb"), Amount::Decimal(1.0)),
            Transaction::new("0xb", Some("0xc"), Amount::Decimal(2.0)),
            Transaction::new("0xc", Some("0xd"), Amount::Decimal(2.0)),
        ]);
        Simulation::new(graph, ForceParams::default())
    }

    fn node<'a>(sim: &'a Simulation, id: &str) -> &'a Node {
        sim.graph().node(&Address::new(id)).unwrap()
    }

    #[test]
    fn pinned_node_holds_its_position_every_tick() {
        let mut sim = simulation();
        let controller = InteractionController::new(0.3);
        let id = Address::new("0xb");
        let pin = vec2(123.5, -42.25);

        let (graph, state) = sim.parts_mut();
        assert!(controller.drag_start(graph, state, &id, pin));

        for _ in 0..25 {
            sim.tick();
            assert_eq!(node(&sim, "0xb").position, pin);
            assert_eq!(node(&sim, "0xb").velocity, Vec2::ZERO);
        }

        let moved = vec2(-300.0, 10.0);
        let (graph, _) = sim.parts_mut();
        assert!(controller.drag_move(graph, &id, moved));
        sim.tick();
        assert_eq!(node(&sim, "0xb").position, moved);
        assert_eq!(node(&sim, "0xb").velocity, Vec2::ZERO);
    }

    #[test]
    fn pinned_node_still_pulls_its_neighbours() {
        let mut sim = simulation();
        sim.run_until_settled(1_000);
        let controller = InteractionController::new(0.3);
        let before = node(&sim, "0xa").position;

        let far = node(&sim, "0xb").position + vec2(2_000.0, 0.0);
        let (graph, state) = sim.parts_mut();
        controller.drag_start(graph, state, &Address::new("0xb"), far);
        for _ in 0..30 {
            sim.tick();
        }

        let after = node(&sim, "0xa").position;
        assert!(after.x > before.x + 10.0, "{before:?} -> {after:?}");
    }

    #[test]
    fn drag_reheats_a_settled_simulation() {
        let mut sim = simulation();
        sim.run_until_settled(1_000);
        assert!(!sim.state().is_running());

        let controller = InteractionController::new(0.3);
        let (graph, state) = sim.parts_mut();
        controller.drag_start(graph, state, &Address::new("0xa"), Vec2::ZERO);
        assert_eq!(sim.state().phase(), Phase::Running);
        assert_eq!(sim.state().alpha_target, 0.3);

        // A held drag keeps the simulation warm.
        for _ in 0..500 {
            sim.tick();
        }
        assert!(sim.state().is_running());
        assert!(sim.state().alpha > 0.25);
    }

    #[test]
    fn drag_end_releases_pin_and_cools() {
        let mut sim = simulation();
        let controller = InteractionController::new(0.3);
        let id = Address::new("0xc");

        let (graph, state) = sim.parts_mut();
        controller.drag_start(graph, state, &id, vec2(10.0, 10.0));
        assert!(controller.drag_end(graph, state, &id));
        assert_eq!(state.alpha_target, 0.0);
        assert!(!graph.node(&id).unwrap().is_pinned());

        let ticks = sim.run_until_settled(1_000);
        assert!(ticks <= 400, "took {ticks} ticks");
    }

    #[test]
    fn concurrent_drags_are_independent() {
        let mut sim = simulation();
        let controller = InteractionController::new(0.3);
        let first = Address::new("0xa");
        let second = Address::new("0xd");

        let (graph, state) = sim.parts_mut();
        controller.drag_start(graph, state, &first, vec2(-50.0, 0.0));
        controller.drag_start(graph, state, &second, vec2(50.0, 0.0));
        controller.drag_end(graph, state, &first);
        assert_eq!(state.alpha_target, 0.3);
        assert!(graph.node(&second).unwrap().is_pinned());

        sim.tick();
        assert_eq!(node(&sim, "0xd").position, vec2(50.0, 0.0));
    }

    #[test]
    fn unknown_nodes_are_ignored() {
        let mut sim = simulation();
        let controller = InteractionController::new(0.3);
        let ghost = Address::new("0xffff");

        let (graph, state) = sim.parts_mut();
        assert!(!controller.drag_start(graph, state, &ghost, Vec2::ZERO));
        assert!(!controller.drag_move(graph, &ghost, Vec2::ZERO));
        assert!(!controller.drag_end(graph, state, &ghost));
        assert!(!controller.drag_move(graph, &Address::new("0xa"), Vec2::ZERO));
        assert_eq!(state.alpha_target, 0.0);
    }
}
