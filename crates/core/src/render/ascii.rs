use std::f32::consts::TAU;

use super::surface::{Primitive, ScreenPoint, ShapeDraw, Surface, Viewport};
use crate::color::Rgb;

const RAMP: &[u8] = b".:-=+*#%";

/// Character-cell surface used by the command line preview. One cell per
/// viewport pixel.
#[derive(Debug, Default)]
pub struct AsciiSurface {
    width: usize,
    height: usize,
    cells: Vec<u8>,
    frame: String,
}

impl AsciiSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the last completed frame, one line per row.
    pub fn frame_text(&self) -> &str {
        &self.frame
    }

    fn plot(&mut self, x: f32, y: f32, glyph: u8) {
        if !(x.is_finite() && y.is_finite()) || x < -0.5 || y < -0.5 {
            return;
        }
        let (col, row) = (x.round() as usize, y.round() as usize);
        if col < self.width && row < self.height {
            self.cells[row * self.width + col] = glyph;
        }
    }

    fn line(&mut self, from: ScreenPoint, to: ScreenPoint, glyph: u8) {
        let steps = (to.x - from.x).abs().max((to.y - from.y).abs()).ceil();
        if !steps.is_finite() {
            return;
        }
        let steps = (steps as usize).clamp(1, 4 * (self.width + self.height).max(1));
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.plot(
                from.x + (to.x - from.x) * t,
                from.y + (to.y - from.y) * t,
                glyph,
            );
        }
    }

    fn circle(&mut self, center: ScreenPoint, radius: f32, glyph: u8) {
        let steps = ((radius * TAU).ceil() as usize).clamp(12, 720);
        for i in 0..steps {
            let theta = i as f32 / steps as f32 * TAU;
            // Terminal cells are roughly twice as tall as they are wide.
            self.plot(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin() * 0.5,
                glyph,
            );
        }
    }
}

fn glyph_for(opacity: f32) -> u8 {
    let index = (opacity.clamp(0.0, 1.0) * (RAMP.len() - 1) as f32).round() as usize;
    RAMP[index.min(RAMP.len() - 1)]
}

impl Surface for AsciiSurface {
    fn begin_frame(&mut self, viewport: Viewport) {
        self.width = viewport.width as usize;
        self.height = viewport.height as usize;
        self.cells.clear();
        self.cells.resize(self.width * self.height, b' ');
    }

    fn draw_background(&mut self, _color: Rgb) {}

    fn draw_grid(&mut self, spacing: f32, _color: Rgb, opacity: f32) {
        if opacity <= 0.05 || !(spacing >= 1.0) {
            return;
        }
        let step = spacing as usize;
        let glyph = if opacity < 0.5 { b'.' } else { b'+' };
        for row in (0..self.height).step_by(step.max(1)) {
            for col in (0..self.width).step_by(step.max(1)) {
                self.cells[row * self.width + col] = glyph;
            }
        }
    }

    fn draw_shape(&mut self, shape: &ShapeDraw) {
        let glyph = glyph_for(shape.material.opacity);
        for copy in &shape.copies {
            match shape.primitive {
                Primitive::Circles => {
                    let radius = shape.circle_radius.unwrap_or(1.0);
                    for &center in copy {
                        self.circle(center, radius, glyph);
                    }
                }
                Primitive::Edges => {
                    for &(a, b) in &shape.edges {
                        if let (Some(&from), Some(&to)) = (copy.get(a), copy.get(b)) {
                            self.line(from, to, glyph);
                        }
                    }
                }
                Primitive::Path => {
                    for pair in copy.windows(2) {
                        self.line(pair[0], pair[1], glyph);
                    }
                }
                Primitive::Points => {
                    for point in copy {
                        self.plot(point.x, point.y, glyph);
                    }
                }
            }
        }
        for point in &shape.highlights {
            self.plot(point.x, point.y, b'@');
        }
    }

    fn draw_label(&mut self, at: ScreenPoint, text: &str, _color: Rgb) {
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b' ' {
                continue;
            }
            let glyph = if byte.is_ascii_graphic() { byte } else { b'?' };
            self.plot(at.x + offset as f32, at.y, glyph);
        }
    }

    fn end_frame(&mut self) {
        self.frame = self
            .cells
            .chunks(self.width.max(1))
            .map(|row| String::from_utf8_lossy(row).trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scene::Material, ShapeKind};

    fn draw(primitive: Primitive, copies: Vec<Vec<ScreenPoint>>) -> ShapeDraw {
        ShapeDraw {
            shape: ShapeKind::MetatronsCube,
            primitive,
            copies,
            edges: vec![(0, 1)],
            circle_radius: Some(3.0),
            highlights: Vec::new(),
            material: Material::default(),
        }
    }

    #[test]
    fn draws_edges_between_points() {
        let mut surface = AsciiSurface::new();
        surface.begin_frame(Viewport::new(10, 3));
        surface.draw_shape(&draw(
            Primitive::Edges,
            vec![vec![ScreenPoint::new(0.0, 1.0), ScreenPoint::new(9.0, 1.0)]],
        ));
        surface.end_frame();

        let lines: Vec<&str> = surface.frame_text().split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "%%%%%%%%%%");
    }

    #[test]
    fn clips_out_of_bounds_points() {
        let mut surface = AsciiSurface::new();
        surface.begin_frame(Viewport::new(4, 2));
        surface.draw_shape(&draw(
            Primitive::Points,
            vec![vec![ScreenPoint::new(-5.0, 0.0), ScreenPoint::new(50.0, 1.0)]],
        ));
        surface.draw_label(ScreenPoint::new(2.0, 0.0), "hello", Rgb::WHITE);
        surface.end_frame();
        assert_eq!(surface.frame_text(), "  he\n");
    }

    #[test]
    fn glyphs_follow_opacity() {
        assert_eq!(glyph_for(0.0), b'.');
        assert_eq!(glyph_for(1.0), b'%');
    }
}
