use eframe::egui::{self, Pos2, Rect, Ui};
use tracing::debug;

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let anchor = screen_to_world(rect, self.pan, self.zoom, pointer);

        let factor = (1.0 + scroll * 0.0018).clamp(0.85, 1.15);
        self.zoom = (self.zoom * factor).clamp(0.05, 6.0);
        // Keep the world point under the pointer fixed.
        self.pan = pointer - rect.center() - anchor * self.zoom;
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        let background_drag =
            self.dragging.is_none() && response.dragged_by(egui::PointerButton::Primary);
        if background_drag
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Routes primary drags on a node through the interaction controller.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            let press = ui.input(|input| input.pointer.press_origin());
            if let Some(press) = press
                && let Some(index) = self.node_at(press)
            {
                let id = self.simulation.graph().nodes()[index].id.clone();
                let world = screen_to_world(rect, self.pan, self.zoom, press);
                let (graph, state) = self.simulation.parts_mut();
                if self.controller.drag_start(graph, state, &id, world) {
                    debug!(node = %id, "drag started");
                    self.dragging = Some(id);
                }
            }
        }

        let Some(id) = self.dragging.clone() else {
            return;
        };

        let released = response.drag_stopped()
            || !ui.input(|input| input.pointer.primary_down());
        if released {
            let (graph, state) = self.simulation.parts_mut();
            self.controller.drag_end(graph, state, &id);
            debug!(node = %id, "drag ended");
            self.dragging = None;
            return;
        }

        if let Some(pointer) = response.interact_pointer_pos() {
            let world = screen_to_world(rect, self.pan, self.zoom, pointer);
            let (graph, _) = self.simulation.parts_mut();
            self.controller.drag_move(graph, &id, world);
        }
    }

    /// Closest node whose on-screen circle contains `pointer`.
    pub(in crate::app) fn node_at(&self, pointer: Pos2) -> Option<usize> {
        let scratch = &self.view_scratch;
        scratch
            .screen_positions
            .iter()
            .zip(&scratch.screen_radii)
            .enumerate()
            .filter(|(index, _)| scratch.visible_mask.get(*index).copied().unwrap_or(false))
            .filter_map(|(index, (position, radius))| {
                let distance = position.distance(pointer);
                (distance <= *radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub(in crate::app) fn hovered_index(&self, ui: &Ui) -> Option<usize> {
        ui.input(|input| input.pointer.hover_pos())
            .and_then(|pointer| self.node_at(pointer))
    }
}
