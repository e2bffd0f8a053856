use eframe::egui::{self, Label, RichText, Sense, Ui};

use crate::ledger::{Address, Transaction};
use crate::util::{format_amount, format_timestamp, short_address};

use super::super::ViewModel;

const CONTRACT_CREATION: &str = "Contract Creation";

/// One pre-formatted line of the focus wallet's transaction list.
#[derive(Clone, Debug)]
pub(in crate::app) struct TransactionRow {
    summary: String,
    details: String,
    /// The other side of the transfer, selected when the row is clicked.
    counterparty: Option<Address>,
}

impl TransactionRow {
    pub(in crate::app) fn new(transaction: &Transaction, focus: &Address) -> Self {
        let hash = transaction.hash.as_deref().unwrap_or("unknown");
        let block = transaction
            .block
            .map_or_else(|| "unknown".to_owned(), |block| block.to_string());
        let value = match transaction.amount.to_display() {
            Ok(value) => format_amount(value),
            Err(error) => format!("invalid ({error})"),
        };
        let date = transaction
            .timestamp
            .map_or_else(|| "unknown".to_owned(), format_timestamp);
        let to = transaction
            .recipient
            .as_ref()
            .map_or(CONTRACT_CREATION, Address::as_str);
        let short_to = transaction
            .recipient
            .as_ref()
            .map_or_else(|| CONTRACT_CREATION.to_owned(), |to| short_address(to.as_str()));

        let counterparty = if &transaction.sender == focus {
            transaction.recipient.clone()
        } else {
            Some(transaction.sender.clone())
        };

        Self {
            summary: format!(
                "#{block}  {date}  {} -> {short_to}  {value}",
                short_address(transaction.sender.as_str())
            ),
            details: format!(
                "Hash: {hash}\nBlock number: {block}\nFrom: {}\nTo: {to}\n\
                 Value: {value}\nDate: {date}",
                transaction.sender
            ),
            counterparty,
        }
    }
}

/// Newest first.
pub(in crate::app) fn transaction_rows(
    transactions: &[Transaction],
    focus: &Address,
) -> Vec<TransactionRow> {
    transactions
        .iter()
        .rev()
        .map(|transaction| TransactionRow::new(transaction, focus))
        .collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        self.draw_selection(ui);

        ui.separator();
        self.draw_transaction_list(ui);
    }

    fn draw_selection(&mut self, ui: &mut Ui) {
        let Some(selected) = self.selected.clone() else {
            ui.label("Click a node to inspect its transfers.");
            return;
        };

        let Some(summary) = self.details_cache.clone() else {
            ui.label("Selected address is not part of the current graph.");
            return;
        };

        ui.label(RichText::new(short_address(selected.as_str())).strong());
        ui.small(selected.as_str());
        if selected == self.focus {
            ui.small("focus wallet");
        }
        ui.add_space(6.0);

        ui.label(format!("Outgoing transfers: {}", summary.out_degree));
        ui.label(format!("Incoming transfers: {}", summary.in_degree));
        ui.label(format!("Total sent: {}", format_amount(summary.sent)));
        ui.label(format!("Total received: {}", format_amount(summary.received)));

        let pinned = self
            .simulation
            .graph()
            .node(&selected)
            .is_some_and(|node| node.is_pinned());
        if pinned {
            ui.label("Pinned while dragged.");
        }

        ui.separator();
        ui.label(RichText::new("Counterparties").strong());
        if summary.counterparties.is_empty() {
            ui.label("No transfers with other addresses.");
            return;
        }

        let mut next_selection = None;
        egui::ScrollArea::vertical()
            .id_salt("counterparties_scroll")
            .max_height(220.0)
            .auto_shrink([false, true])
            .show_rows(ui, 22.0, summary.counterparties.len(), |ui, row_range| {
                for party in &summary.counterparties[row_range] {
                    let label = format!(
                        "{}  out {}  in {}  ({}x)",
                        short_address(party.id.as_str()),
                        format_amount(party.sent),
                        format_amount(party.received),
                        party.transfers
                    );
                    if ui.link(label).on_hover_text(party.id.as_str()).clicked() {
                        next_selection = Some(party.id.clone());
                    }
                }
            });

        if next_selection.is_some() {
            self.set_selected(next_selection);
        }
    }

    fn draw_transaction_list(&mut self, ui: &mut Ui) {
        ui.label(
            RichText::new(format!("Transactions ({})", self.transaction_rows.len())).strong(),
        );
        if self.transaction_rows.is_empty() {
            ui.label("No transactions for this wallet.");
            return;
        }

        let mut next_selection = None;
        egui::ScrollArea::vertical()
            .id_salt("transactions_scroll")
            .auto_shrink([false, false])
            .show_rows(ui, 22.0, self.transaction_rows.len(), |ui, row_range| {
                for row in &self.transaction_rows[row_range] {
                    let response = ui
                        .add(Label::new(row.summary.as_str()).truncate().sense(Sense::click()))
                        .on_hover_text(row.details.as_str());
                    if response.clicked() && row.counterparty.is_some() {
                        next_selection = row.counterparty.clone();
                    }
                }
            });

        if next_selection.is_some() {
            self.set_selected(next_selection);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Amount;

    #[test]
    fn rows_show_receipt_fields_newest_first() {
        let focus = Address::new("0x52908400098527886e0f7030069857d2e4169ee7");
        let transactions = [
            Transaction::new(focus.as_str(), None, Amount::BaseUnits(0)).with_receipt(
                Some("0xabc".to_owned()),
                Some(7),
                Some(0),
            ),
            Transaction::new(
                "0xde709f2102306220921060314715629080e2fb77",
                Some(focus.as_str()),
                Amount::BaseUnits(1_500_000_000_000_000_000),
            )
            .with_receipt(Some("0xdef".to_owned()), Some(9), Some(1_700_000_000)),
        ];

        let rows = transaction_rows(&transactions, &focus);
        assert_eq!(rows.len(), 2);

        assert!(rows[0].summary.starts_with("#9  2023-11-14 22:13 UTC"));
        assert!(rows[0].summary.ends_with("1.500 ETH"));
        assert!(rows[0].details.contains("Hash: 0xdef"));
        assert_eq!(
            rows[0].counterparty.as_ref().map(Address::as_str),
            Some("0xde709f2102306220921060314715629080e2fb77")
        );

        assert!(rows[1].summary.contains(CONTRACT_CREATION));
        assert!(rows[1].details.contains("To: Contract Creation"));
        assert!(rows[1].details.contains("Date: 1970-01-01 00:00 UTC"));
        assert_eq!(rows[1].counterparty, None);
    }

    #[test]
    fn missing_receipt_fields_are_marked_unknown() {
        let focus = Address::new("0xaa");
        let rows = transaction_rows(
            &[Transaction::new("0xaa", Some("0xbb"), Amount::Decimal(-1.0))],
            &focus,
        );
        assert!(rows[0].details.contains("Hash: unknown"));
        assert!(rows[0].details.contains("Block number: unknown"));
        assert!(rows[0].details.contains("Value: invalid"));
    }
}
