use std::collections::HashMap;

use crate::ledger::Address;

use super::Graph;

#[derive(Clone, Debug, PartialEq)]
pub struct Counterparty {
    pub id: Address,
    pub sent: f64,
    pub received: f64,
    pub transfers: usize,
}

impl Counterparty {
    pub fn volume(&self) -> f64 {
        self.sent + self.received
    }
}

/// Flow totals for one node, as shown in the details panel.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSummary {
    pub id: Address,
    pub in_degree: usize,
    pub out_degree: usize,
    pub sent: f64,
    pub received: f64,
    /// Largest volume first.
    pub counterparties: Vec<Counterparty>,
}

pub fn summarize(graph: &Graph, id: &Address) -> Option<NodeSummary> {
    graph.index_of(id)?;

    let mut summary = NodeSummary {
        id: id.clone(),
        in_degree: 0,
        out_degree: 0,
        sent: 0.0,
        received: 0.0,
        counterparties: Vec::new(),
    };
    let mut by_id: HashMap<&Address, Counterparty> = HashMap::new();

    for edge in graph.edges() {
        if &edge.source == id {
            summary.out_degree += 1;
            summary.sent += edge.weight;
            let entry = by_id
                .entry(&edge.target)
                .or_insert_with(|| empty_counterparty(&edge.target));
            entry.sent += edge.weight;
            entry.transfers += 1;
        }
        if &edge.target == id {
            summary.in_degree += 1;
            summary.received += edge.weight;
            let entry = by_id
                .entry(&edge.source)
                .or_insert_with(|| empty_counterparty(&edge.source));
            entry.received += edge.weight;
            entry.transfers += 1;
        }
    }

    summary.counterparties = by_id.into_values().collect();
    summary.counterparties.sort_by(|a, b| {
        b.volume()
            .total_cmp(&a.volume())
            .then_with(|| a.id.cmp(&b.id))
    });
    Some(summary)
}

fn empty_counterparty(id: &Address) -> Counterparty {
    Counterparty {
        id: id.clone(),
        sent: 0.0,
        received: 0.0,
        transfers: 0,
    }
}
