use anyhow::{Context, Result};
use tracing::info;

use crate::graph::{Graph, build_with_rejections};

use super::address::Address;
use super::source::{History, TransactionSource};
use super::transaction::Transaction;

pub struct WalletGraph {
    pub focus: Address,
    pub graph: Graph,
    /// Kept so the view can rebuild the graph from scratch.
    pub transactions: Vec<Transaction>,
    /// Records the source skipped plus records the builder rejected.
    pub rejected_count: usize,
}

/// Validates `input` before touching the source.
pub fn collect_wallet_graph(input: &str, source: &dyn TransactionSource) -> Result<WalletGraph> {
    let focus = Address::parse(input)?;

    let History {
        transactions,
        skipped,
    } = source
        .fetch_history(&focus)
        .with_context(|| format!("failed to fetch history for {focus}"))?;

    let (graph, rejected) = build_with_rejections(&transactions);
    let rejected_count = skipped + rejected.len();
    info!(
        address = %focus,
        transactions = transactions.len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        skipped,
        rejected = rejected_count,
        "built transaction graph"
    );

    Ok(WalletGraph {
        focus,
        graph,
        transactions,
        rejected_count,
    })
}
