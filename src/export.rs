use serde::Serialize;

use crate::physics::Simulation;

#[derive(Debug, Serialize)]
pub struct LayoutSnapshot {
    pub focus: String,
    pub ticks: u64,
    pub alpha: f32,
    pub phase: &'static str,
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct NodeSnapshot {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeSnapshot {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

impl LayoutSnapshot {
    pub fn capture(focus: &str, simulation: &Simulation) -> Self {
        let graph = simulation.graph();
        Self {
            focus: focus.to_owned(),
            ticks: simulation.ticks(),
            alpha: simulation.state().alpha,
            phase: simulation.state().phase().label(),
            nodes: graph
                .nodes()
                .iter()
                .map(|node| NodeSnapshot {
                    id: node.id.to_string(),
                    x: node.position.x,
                    y: node.position.y,
                    radius: node.radius,
                })
                .collect(),
            edges: graph
                .edges()
                .iter()
                .map(|edge| EdgeSnapshot {
                    source: edge.source.to_string(),
                    target: edge.target.to_string(),
                    weight: edge.weight,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::config::ForceParams;
    use crate::graph::build;
    use crate::ledger::{Amount, Transaction};

    #[test]
    fn snapshot_serializes_positions_and_edges() {
        let graph = build(&[
            Transaction::new("0xA", Some("0xB"), Amount::Decimal(1.0)),
            Transaction::new("0xB", Some("0xC"), Amount::Decimal(2.0)),
            Transaction::new("0xA", None, Amount::Decimal(0.5)),
        ]);
        let mut simulation = Simulation::new(graph, ForceParams::default());
        simulation.run_until_settled(1_000);

        let snapshot = LayoutSnapshot::capture("0xa", &simulation);
        let json: Value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["focus"], "0xa");
        assert_eq!(json["phase"], "idle");
        assert_eq!(json["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(json["nodes"][0]["id"], "0xa");
        assert!(json["nodes"][0]["x"].as_f64().unwrap().is_finite());
        assert_eq!(json["edges"][1]["source"], "0xb");
        assert_eq!(json["edges"][1]["target"], "0xc");
        assert_eq!(json["edges"][1]["weight"], 2.0);
    }
}
