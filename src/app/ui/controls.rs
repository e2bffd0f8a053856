use std::ops::RangeInclusive;

use eframe::egui::{self, Ui};

use crate::config::{ChargeStrategy, ForceParams, LayoutVariant};
use crate::physics::Force;

use super::super::ViewModel;

fn param_slider(
    ui: &mut Ui,
    value: &mut f32,
    range: RangeInclusive<f32>,
    text: &str,
    hover: &str,
) -> bool {
    ui.add(
        egui::Slider::new(value, range)
            .text(text)
            .clamping(egui::SliderClamping::Always),
    )
    .on_hover_text(hover)
    .changed()
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Layout Controls");
        ui.separator();
        ui.add_space(4.0);

        let mut changed = false;

        ui.horizontal(|ui| {
            ui.label("Layout");
            for variant in [LayoutVariant::Free, LayoutVariant::Ring] {
                changed |= ui
                    .selectable_value(&mut self.params.layout, variant, variant.label())
                    .changed();
            }
        });

        let strategy = self.params.charge_strategy;
        egui::ComboBox::from_label("Charge")
            .selected_text(strategy.label())
            .show_ui(ui, |ui| {
                changed |= ui
                    .selectable_value(
                        &mut self.params.charge_strategy,
                        ChargeStrategy::Auto,
                        "Auto",
                    )
                    .on_hover_text("Exact for small graphs, Barnes-Hut for large ones.")
                    .changed();
                changed |= ui
                    .selectable_value(
                        &mut self.params.charge_strategy,
                        ChargeStrategy::Exact,
                        "Exact",
                    )
                    .changed();
                let is_barnes_hut = matches!(strategy, ChargeStrategy::BarnesHut { .. });
                if ui.selectable_label(is_barnes_hut, "Barnes-Hut").clicked() && !is_barnes_hut {
                    self.params.charge_strategy = ChargeStrategy::BarnesHut {
                        theta: ChargeStrategy::DEFAULT_THETA,
                    };
                    changed = true;
                }
            });
        if let ChargeStrategy::BarnesHut { theta } = &mut self.params.charge_strategy {
            changed |= param_slider(
                ui,
                theta,
                0.3..=1.5,
                "Theta",
                "Cells smaller than theta times their distance are approximated.",
            );
        }

        ui.separator();

        ui.collapsing("Forces", |ui| {
            let params = &mut self.params;
            changed |= param_slider(
                ui,
                &mut params.link_distance,
                30.0..=400.0,
                "Link distance",
                "Rest length of every transfer edge.",
            );
            changed |= param_slider(
                ui,
                &mut params.charge_strength,
                -1500.0..=-10.0,
                "Charge",
                "How strongly nodes push away from each other.",
            );
            match params.layout {
                LayoutVariant::Free => {
                    changed |= param_slider(
                        ui,
                        &mut params.center_strength,
                        0.0..=0.3,
                        "Center pull",
                        "Pull toward the middle of the canvas.",
                    );
                }
                LayoutVariant::Ring => {
                    changed |= param_slider(
                        ui,
                        &mut params.radial_radius,
                        80.0..=800.0,
                        "Ring radius",
                        "Radius the ring layout holds nodes on.",
                    );
                    changed |= param_slider(
                        ui,
                        &mut params.radial_strength,
                        0.0..=1.0,
                        "Ring pull",
                        "How firmly nodes are held on the ring.",
                    );
                }
            }
            changed |= param_slider(
                ui,
                &mut params.collision_strength,
                0.0..=1.0,
                "Collision",
                "Separation between overlapping nodes.",
            );
            changed |= param_slider(
                ui,
                &mut params.velocity_decay,
                0.05..=0.9,
                "Velocity decay",
                "Fraction of velocity lost every tick.",
            );
        });

        if changed {
            self.apply_params();
        }

        let model = self.simulation.model();
        let names = model.forces().iter().map(Force::name).collect::<Vec<_>>();
        let approximated = model.needs_quadtree(self.simulation.graph().node_count());
        ui.small(format!(
            "Active forces: {}{}",
            names.join(", "),
            if approximated { " (quadtree)" } else { "" }
        ));

        ui.separator();

        ui.horizontal_wrapped(|ui| {
            if ui
                .button("Reheat")
                .on_hover_text("Restart the simulation from the current layout.")
                .clicked()
            {
                self.simulation.reheat();
            }
            if ui
                .button("Rebuild graph")
                .on_hover_text("Discard the layout and start from a fresh spiral.")
                .clicked()
            {
                self.graph_dirty = true;
            }
            if ui.button("Reset parameters").clicked() {
                self.params = ForceParams {
                    layout: self.params.layout,
                    ..ForceParams::default()
                };
                self.apply_params();
            }
        });

        ui.add_space(4.0);
        ui.checkbox(&mut self.live_physics, "Live physics")
            .on_hover_text("Tick the simulation once per frame while it is running.");
        ui.add_enabled_ui(!self.live_physics, |ui| {
            if ui.button("Step").clicked() {
                self.simulation.tick();
            }
        });
        ui.checkbox(&mut self.show_quadtree_overlay, "Quadtree overlay")
            .on_hover_text("Draw the Barnes-Hut cells over the graph.");

        ui.separator();
        ui.small("Drag a node to pin it. Scroll to zoom, right or middle drag to pan.");
    }
}
