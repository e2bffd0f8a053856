mod address;
mod collect;
mod parse;
mod source;
mod transaction;

pub use address::Address;
pub use collect::{WalletGraph, collect_wallet_graph};
pub use source::{JsonExportSource, MAX_HISTORY};
pub use transaction::{Amount, Transaction};
