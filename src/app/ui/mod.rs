mod controls;
mod details;
mod panels;

pub(super) use details::TransactionRow;
pub(super) use panels::address_field;
