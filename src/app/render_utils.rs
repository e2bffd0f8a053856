use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2, pos2};

const ARC_SEGMENTS: usize = 16;

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn mix_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let channel = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * amount).round() as u8;
    Color32::from_rgba_unmultiplied(
        channel(base.r(), overlay.r()),
        channel(base.g(), overlay.g()),
        channel(base.b(), overlay.b()),
        channel(base.a(), overlay.a()),
    )
}

/// Darkens and fades a color for nodes outside the hover neighbourhood.
pub(super) fn fade_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    let scale = |value: u8| (value as f32 * factor) as u8;
    Color32::from_rgba_unmultiplied(
        scale(color.r()),
        scale(color.g()),
        scale(color.b()),
        (color.a() as f32 * (0.4 + factor * 0.6)) as u8,
    )
}

/// Cool blue for leaves shading to amber for hubs.
pub(super) fn degree_color(degree: usize, max_degree: usize) -> Color32 {
    let t = if max_degree <= 1 {
        0.0
    } else {
        ((degree as f32).sqrt() / (max_degree as f32).sqrt()).clamp(0.0, 1.0)
    };
    mix_color(
        Color32::from_rgb(78, 152, 214),
        Color32::from_rgb(236, 128, 76),
        t,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(17, 21, 28));

    let step = (64.0 * zoom.clamp(0.5, 2.0)).max(24.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(58, 68, 82, 64));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, center: Pos2, radius: f32) -> bool {
    rect.expand(radius).contains(center)
}

/// Conservative bounding-box test; may keep a few segments that miss the rect.
pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    Rect::from_two_pos(start, end)
        .expand(padding)
        .intersects(rect)
}

/// Samples a quadratic Bezier into `out`, endpoints included.
pub(super) fn quadratic_points(start: Pos2, control: Pos2, end: Pos2, out: &mut Vec<Pos2>) {
    out.clear();
    for step in 0..=ARC_SEGMENTS {
        let t = step as f32 / ARC_SEGMENTS as f32;
        let inverse = 1.0 - t;
        let point = start.to_vec2() * (inverse * inverse)
            + control.to_vec2() * (2.0 * inverse * t)
            + end.to_vec2() * (t * t);
        out.push(point.to_pos2());
    }
}

/// Two-stroke arrow head with its tip at `tip`, pointing along `direction`.
pub(super) fn draw_arrow_head(
    painter: &Painter,
    tip: Pos2,
    direction: Vec2,
    size: f32,
    stroke: Stroke,
) {
    if direction.length_sq() <= f32::EPSILON {
        return;
    }

    let back = -direction.normalized() * size;
    let side = back.rot90() * 0.5;
    painter.line_segment([tip, tip + back + side], stroke);
    painter.line_segment([tip, tip + back - side], stroke);
}
