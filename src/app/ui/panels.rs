use eframe::egui::{self, Align, Context, Layout, RichText, Ui, Vec2};
use tracing::debug;

use crate::config::ForceParams;
use crate::graph::{build, summarize};
use crate::ledger::{Address, WalletGraph};
use crate::physics::{InteractionController, Simulation};
use crate::util::short_address;

use super::super::{AppState, LoadRequest, ViewModel, ViewScratch};
use super::details::transaction_rows;

/// Single-line wallet address input. Returns true when Enter submits it.
pub(in crate::app) fn address_field(ui: &mut Ui, draft: &mut String) -> bool {
    let response = ui.add(
        egui::TextEdit::singleline(draft)
            .hint_text("0x... wallet address")
            .desired_width(340.0),
    );
    response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter))
}

impl ViewModel {
    pub(in crate::app) fn new(wallet: WalletGraph, params: ForceParams) -> Self {
        let params = params.sanitized();
        Self {
            transaction_rows: transaction_rows(&wallet.transactions, &wallet.focus),
            focus: wallet.focus,
            transactions: wallet.transactions,
            rejected_count: wallet.rejected_count,
            simulation: Simulation::new(wallet.graph, params),
            controller: InteractionController::new(params.reheat_alpha_target),
            params,
            selected: None,
            dragging: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            live_physics: true,
            show_quadtree_overlay: false,
            graph_dirty: false,
            details_cache: None,
            view_scratch: ViewScratch::default(),
        }
    }

    pub(in crate::app) fn ready(wallet: WalletGraph, params: ForceParams) -> AppState {
        AppState::Ready(Box::new(Self::new(wallet, params)))
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        request: &LoadRequest,
        address_draft: &mut String,
        load_requested: &mut Option<String>,
        is_loading: bool,
    ) {
        if self.graph_dirty {
            self.rebuild_simulation();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("flow-lens");
                    ui.separator();
                    let submitted = address_field(ui, address_draft);
                    let load_button = ui.add_enabled(!is_loading, egui::Button::new("Load"));
                    if (submitted || load_button.clicked()) && !is_loading {
                        *load_requested = Some(address_draft.trim().to_owned());
                    }
                    ui.separator();
                    ui.label(RichText::new(short_address(self.focus.as_str())).strong())
                        .on_hover_text(self.focus.as_str());
                    ui.label(format!("history: {}", request.history.display()));
                    ui.label(format!("transactions: {}", self.transactions.len()));
                    if self.rejected_count > 0 {
                        ui.label(format!("rejected: {}", self.rejected_count))
                            .on_hover_text("Unreadable records, empty senders, bad amounts.");
                    }
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload history"));
                    if reload_button.clicked() {
                        *load_requested = Some(request.address.clone());
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.status_text());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading transaction history...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    fn status_text(&self) -> String {
        let graph = self.simulation.graph();
        let state = self.simulation.state();
        format!(
            "nodes {}  |  edges {}  |  alpha {:.3}  |  {}  |  ticks {}",
            graph.node_count(),
            graph.edge_count(),
            state.alpha,
            state.phase().label(),
            self.simulation.ticks()
        )
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<Address>) {
        if self.selected == selected {
            return;
        }

        self.details_cache = selected
            .as_ref()
            .and_then(|id| summarize(self.simulation.graph(), id));
        self.selected = selected;
    }

    /// Pushes edited parameters into the live simulation.
    pub(in crate::app) fn apply_params(&mut self) {
        self.params = self.params.sanitized();
        self.controller.reheat_alpha_target = self.params.reheat_alpha_target;
        self.simulation.set_params(self.params);
    }

    /// Throws the current layout away and starts over from the loaded history.
    pub(in crate::app) fn rebuild_simulation(&mut self) {
        debug!(transactions = self.transactions.len(), "rebuilding graph");
        self.dragging = None;
        self.simulation = Simulation::new(build(&self.transactions), self.params);
        self.details_cache = self
            .selected
            .as_ref()
            .and_then(|id| summarize(self.simulation.graph(), id));
        self.graph_dirty = false;
    }
}
