use tracing::{debug, warn};

use crate::error::RejectedTransaction;
use crate::ledger::Transaction;

use super::{Edge, Graph, node_radius};

pub fn build(transactions: &[Transaction]) -> Graph {
    build_with_rejections(transactions).0
}

/// Builds the graph and returns the records that were skipped. A rejected
/// record contributes neither nodes nor edges.
pub fn build_with_rejections(transactions: &[Transaction]) -> (Graph, Vec<RejectedTransaction>) {
    let mut graph = Graph::default();
    let mut rejected = Vec::new();

    for (index, transaction) in transactions.iter().enumerate() {
        if transaction.sender.is_empty() {
            reject(&mut rejected, RejectedTransaction::EmptySender { index });
            continue;
        }

        let weight = match transaction.amount.to_display() {
            Ok(weight) => weight,
            Err(source) => {
                reject(&mut rejected, RejectedTransaction::Amount { index, source });
                continue;
            }
        };

        graph.insert_node(&transaction.sender);
        let Some(recipient) = &transaction.recipient else {
            continue;
        };
        graph.insert_node(recipient);

        graph.edges.push(Edge {
            source: transaction.sender.clone(),
            target: recipient.clone(),
            weight,
        });
    }

    let degrees = graph.degrees();
    for (node, degree) in graph.nodes.iter_mut().zip(degrees) {
        node.radius = node_radius(degree);
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        rejected = rejected.len(),
        "graph built"
    );
    (graph, rejected)
}

fn reject(rejected: &mut Vec<RejectedTransaction>, rejection: RejectedTransaction) {
    warn!(index = rejection.index(), "skipping transaction: {rejection}");
    rejected.push(rejection);
}
