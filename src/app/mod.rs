use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, RichText, Vec2};
use tracing::{error, info};

use crate::config::ForceParams;
use crate::graph::NodeSummary;
use crate::ledger::{Address, JsonExportSource, Transaction, WalletGraph, collect_wallet_graph};
use crate::physics::{InteractionController, QuadtreeCell, Simulation};

mod graph;
mod render_utils;
mod ui;

use ui::{TransactionRow, address_field};

/// Everything needed to (re)load the wallet history in the background.
#[derive(Clone, Debug)]
pub struct LoadRequest {
    pub address: String,
    pub history: PathBuf,
    pub history_limit: usize,
    pub params: ForceParams,
}

type LoadResult = Result<WalletGraph, String>;

pub struct FlowLensApp {
    request: LoadRequest,
    /// Contents of the address field, submitted as the next request.
    address_draft: String,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    focus: Address,
    transactions: Vec<Transaction>,
    transaction_rows: Vec<TransactionRow>,
    rejected_count: usize,
    simulation: Simulation,
    controller: InteractionController,
    /// Edited by the control panel, pushed into the simulation on change.
    params: ForceParams,
    selected: Option<Address>,
    dragging: Option<Address>,
    pan: Vec2,
    zoom: f32,
    live_physics: bool,
    show_quadtree_overlay: bool,
    graph_dirty: bool,
    details_cache: Option<NodeSummary>,
    view_scratch: ViewScratch,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_mask: Vec<bool>,
    degrees: Vec<usize>,
    quadtree_cells: Vec<QuadtreeCell>,
}

impl FlowLensApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, request: LoadRequest) -> Self {
        let state = Self::start_load(&request);
        Self {
            address_draft: request.address.clone(),
            request,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(request: &LoadRequest) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();
        let address = request.address.clone();
        let source =
            JsonExportSource::new(request.history.clone()).with_limit(request.history_limit);

        thread::spawn(move || {
            let result = collect_wallet_graph(&address, &source).map_err(|error| {
                error!(%address, "failed to load wallet history: {error:#}");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(request: &LoadRequest) -> AppState {
        info!(address = %request.address, history = %request.history.display(), "loading history");
        AppState::Loading {
            rx: Self::spawn_load(request),
        }
    }
}

impl eframe::App for FlowLensApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(wallet)) => {
                        transition = Some(ViewModel::ready(wallet, self.request.params));
                    }
                    Ok(Err(error)) => transition = Some(AppState::Error(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading transaction history...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to build the transaction graph");
                    ui.add_space(6.0);
                    ui.label(RichText::new(error.as_str()).color(ui.visuals().error_fg_color));
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        let submitted = address_field(ui, &mut self.address_draft);
                        if submitted || ui.button("Load").clicked() {
                            self.request.address = self.address_draft.trim().to_owned();
                            transition = Some(Self::start_load(&self.request));
                        }
                    });
                    ui.add_space(6.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(&self.request));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut load_requested = None;
                let is_reloading = self.reload_rx.is_some();
                model.show(
                    ctx,
                    &self.request,
                    &mut self.address_draft,
                    &mut load_requested,
                    is_reloading,
                );

                if let Some(address) = load_requested
                    && self.reload_rx.is_none()
                {
                    // Keep the edited parameters across reloads.
                    self.request.params = model.params;
                    self.request.address = address;
                    self.reload_rx = Some(Self::spawn_load(&self.request));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(wallet)) => {
                            transition = Some(ViewModel::ready(wallet, self.request.params));
                        }
                        Ok(Err(error)) => transition = Some(AppState::Error(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
