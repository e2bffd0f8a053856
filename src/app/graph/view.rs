use std::collections::HashSet;

use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke, Ui, vec2};

use crate::config::LayoutVariant;
use crate::util::{format_amount, short_address};

use super::super::ViewModel;
use super::super::render_utils::{
    circle_visible, degree_color, draw_arrow_head, draw_background, edge_visible, fade_color,
    mix_color, quadratic_points, world_to_screen,
};

/// Neighbourhood of the hovered (or selected) node. Presentation only.
struct HighlightState {
    nodes: HashSet<usize>,
    edges: HashSet<usize>,
}

const FOCUS_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const HOVER_COLOR: Color32 = Color32::from_rgb(255, 164, 101);

impl ViewModel {
    fn update_screen_space(&mut self, rect: Rect) {
        let scratch = &mut self.view_scratch;
        let radius_scale = self.zoom.powf(0.6);

        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        scratch.visible_mask.clear();
        for node in self.simulation.graph().nodes() {
            let position = world_to_screen(rect, self.pan, self.zoom, node.position);
            let radius = (node.radius * radius_scale).clamp(2.5, 48.0);
            scratch.screen_positions.push(position);
            scratch.screen_radii.push(radius);
            scratch
                .visible_mask
                .push(circle_visible(rect, position, radius));
        }
    }

    fn highlight_state(&self, center: usize) -> HighlightState {
        let graph = self.simulation.graph();
        let mut state = HighlightState {
            nodes: HashSet::from([center]),
            edges: HashSet::new(),
        };
        for (edge_index, edge) in graph.edges().iter().enumerate() {
            let (Some(source), Some(target)) =
                (graph.index_of(&edge.source), graph.index_of(&edge.target))
            else {
                continue;
            };
            if source == center || target == center {
                state.edges.insert(edge_index);
                state.nodes.insert(source);
                state.nodes.insert(target);
            }
        }
        state
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        if self.simulation.graph().is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No transactions found for this address.",
                FontId::proportional(16.0),
                Color32::from_gray(200),
            );
            return;
        }

        self.handle_graph_zoom(ui, rect, &response);
        self.update_screen_space(rect);
        self.handle_node_drag(ui, rect, &response);
        self.handle_graph_pan(&response);

        if self.live_physics && self.simulation.is_active() {
            self.simulation.tick();
        } else if self.dragging.is_some() {
            self.simulation.snap_pins();
        }
        if (self.live_physics && self.simulation.is_active()) || self.dragging.is_some() {
            ui.ctx().request_repaint();
        }

        self.update_screen_space(rect);
        self.view_scratch.degrees = self.simulation.graph().degrees();

        if self.show_quadtree_overlay {
            self.draw_quadtree_overlay(&painter, rect);
        }

        let hovered = self.hovered_index(ui);
        if hovered.is_some() || self.dragging.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = if self.dragging.is_some() {
                    egui::CursorIcon::Grabbing
                } else {
                    egui::CursorIcon::PointingHand
                };
            });
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            let selected = hovered.map(|index| self.simulation.graph().nodes()[index].id.clone());
            self.set_selected(selected);
        }

        let selected_index = self
            .selected
            .as_ref()
            .and_then(|id| self.simulation.graph().index_of(id));
        let highlight = hovered
            .or(selected_index)
            .map(|center| self.highlight_state(center));

        self.draw_edges(&painter, rect, highlight.as_ref());
        self.draw_nodes(&painter, hovered, selected_index, highlight.as_ref());

        if let Some(index) = hovered {
            let node = &self.simulation.graph().nodes()[index];
            let degree = self.view_scratch.degrees.get(index).copied().unwrap_or(0);
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  {} transfers", node.id, degree),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }

    fn draw_edges(&self, painter: &Painter, rect: Rect, highlight: Option<&HighlightState>) {
        let graph = self.simulation.graph();
        let scratch = &self.view_scratch;
        let ring = self.simulation.params().layout == LayoutVariant::Ring;
        let ring_center = world_to_screen(rect, self.pan, self.zoom, egui::Vec2::ZERO);
        let zoom_sqrt = self.zoom.sqrt();
        let mut arc = Vec::new();

        for (edge_index, edge) in graph.edges().iter().enumerate() {
            let (Some(source), Some(target)) =
                (graph.index_of(&edge.source), graph.index_of(&edge.target))
            else {
                continue;
            };

            let start = scratch.screen_positions[source];
            let end = scratch.screen_positions[target];
            let padding = if ring { start.distance(end) * 0.5 } else { 2.5 };
            if !scratch.visible_mask[source]
                && !scratch.visible_mask[target]
                && !edge_visible(rect, start, end, padding)
            {
                continue;
            }

            let emphasized = highlight.is_some_and(|state| state.edges.contains(&edge_index));
            let width = ((edge.weight.sqrt() as f32) * 1.1 * zoom_sqrt).clamp(0.6, 7.0);
            let color = if emphasized {
                HOVER_COLOR
            } else if highlight.is_some() {
                Color32::from_rgba_unmultiplied(80, 90, 104, 90)
            } else {
                Color32::from_rgba_unmultiplied(118, 128, 142, 190)
            };
            let stroke = Stroke::new(if emphasized { width + 0.8 } else { width }, color);

            if source == target {
                let radius = scratch.screen_radii[source];
                painter.circle_stroke(start - vec2(0.0, radius * 1.5), radius * 0.8, stroke);
                continue;
            }

            // Ring arcs bow toward the middle of the ring.
            let control = ring.then(|| {
                let mid = start + (end - start) * 0.5;
                mid + (ring_center - mid) * 0.35
            });
            let approach = control.unwrap_or(start);
            let direction = end - approach;
            if direction.length_sq() <= f32::EPSILON {
                continue;
            }
            let tip = end - direction.normalized() * scratch.screen_radii[target];

            match control {
                Some(control) => {
                    quadratic_points(start, control, tip, &mut arc);
                    painter.add(egui::Shape::line(std::mem::take(&mut arc), stroke));
                }
                None => {
                    painter.line_segment([start, tip], stroke);
                }
            }

            let head = (4.0 + width * 1.6).min(14.0);
            draw_arrow_head(painter, tip, direction, head, stroke);
        }
    }

    fn draw_nodes(
        &self,
        painter: &Painter,
        hovered: Option<usize>,
        selected: Option<usize>,
        highlight: Option<&HighlightState>,
    ) {
        let graph = self.simulation.graph();
        let scratch = &self.view_scratch;
        let max_degree = scratch.degrees.iter().copied().max().unwrap_or(0);

        for (index, node) in graph.nodes().iter().enumerate() {
            if !scratch.visible_mask[index] {
                continue;
            }

            let position: Pos2 = scratch.screen_positions[index];
            let radius = scratch.screen_radii[index];
            let is_focus = node.id == self.focus;
            let is_hovered = hovered == Some(index);
            let is_selected = selected == Some(index);
            let in_highlight = highlight.is_some_and(|state| state.nodes.contains(&index));

            let degree = scratch.degrees.get(index).copied().unwrap_or(0);
            let base = if is_focus {
                FOCUS_COLOR
            } else {
                degree_color(degree, max_degree)
            };
            let color = if is_hovered {
                HOVER_COLOR
            } else if in_highlight {
                mix_color(base, HOVER_COLOR, 0.35)
            } else if highlight.is_some() {
                fade_color(base, 0.45)
            } else {
                base
            };

            painter.circle_filled(position, radius, color);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(12, 12, 12, 190)),
            );
            if is_selected {
                painter.circle_stroke(position, radius + 4.0, Stroke::new(1.8, FOCUS_COLOR));
            }
            if node.is_pinned() {
                painter.circle_stroke(position, radius + 2.0, Stroke::new(1.4, Color32::WHITE));
            }

            let show_label = is_focus
                || is_hovered
                || is_selected
                || in_highlight
                || radius > 14.0
                || self.zoom > 1.3;
            if show_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    short_address(node.id.as_str()),
                    FontId::proportional(12.0),
                    Color32::from_gray(236),
                );
            }
        }

        if let Some(summary) = self.details_cache.as_ref()
            && let Some(index) = selected
            && scratch.visible_mask[index]
        {
            let position = scratch.screen_positions[index];
            let radius = scratch.screen_radii[index];
            painter.text(
                position + vec2(radius + 5.0, 14.0),
                Align2::LEFT_CENTER,
                format!(
                    "out {}  in {}",
                    format_amount(summary.sent),
                    format_amount(summary.received)
                ),
                FontId::proportional(11.0),
                Color32::from_gray(190),
            );
        }
    }

    fn draw_quadtree_overlay(&mut self, painter: &Painter, rect: Rect) {
        self.simulation
            .quadtree_cells(&mut self.view_scratch.quadtree_cells);

        for cell in &self.view_scratch.quadtree_cells {
            let half = vec2(cell.bounds.half_extent, cell.bounds.half_extent);
            let min = world_to_screen(rect, self.pan, self.zoom, cell.bounds.center - half);
            let max = world_to_screen(rect, self.pan, self.zoom, cell.bounds.center + half);

            let alpha = if cell.is_leaf { 110 } else { 50 };
            let width = (1.4 - cell.depth as f32 * 0.09).clamp(0.45, 1.4);
            let stroke = Stroke::new(width, Color32::from_rgba_unmultiplied(106, 198, 255, alpha));
            painter.rect_stroke(
                Rect::from_min_max(min, max),
                0.0,
                stroke,
                egui::StrokeKind::Middle,
            );
        }
    }
}
