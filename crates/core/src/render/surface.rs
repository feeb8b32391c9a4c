use crate::{color::Rgb, scene::Material, ShapeKind};

/// Pixel-space position on the drawing surface; y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width as f32 * 0.5, self.height as f32 * 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Each point is the center of a circle of `ShapeDraw::circle_radius`.
    Circles,
    /// Segments between the point pairs listed in `ShapeDraw::edges`.
    Edges,
    /// A polyline through the points in order.
    Path,
    Points,
}

/// Everything a surface needs to draw one shape group.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDraw {
    pub shape: ShapeKind,
    pub primitive: Primitive,
    /// One projected point list per rotational or mirrored copy.
    pub copies: Vec<Vec<ScreenPoint>>,
    pub edges: Vec<(usize, usize)>,
    /// Circle radius in pixels.
    pub circle_radius: Option<f32>,
    pub highlights: Vec<ScreenPoint>,
    pub material: Material,
}

impl ShapeDraw {
    pub fn point_count(&self) -> usize {
        self.copies.iter().map(Vec::len).sum()
    }
}

/// Drawing-surface handle supplied by the host.
///
/// Calls arrive in frame order: `begin_frame`, then background, grid,
/// shapes and labels, then `end_frame`.
pub trait Surface {
    /// False once the host has torn the surface down.
    fn is_attached(&self) -> bool {
        true
    }

    fn begin_frame(&mut self, viewport: Viewport);
    fn draw_background(&mut self, color: Rgb);
    fn draw_grid(&mut self, spacing: f32, color: Rgb, opacity: f32);
    fn draw_shape(&mut self, shape: &ShapeDraw);
    fn draw_label(&mut self, at: ScreenPoint, text: &str, color: Rgb);
    fn end_frame(&mut self);

    /// Releases host resources. Called once on teardown.
    fn detach(&mut self) {}
}

/// A draw call as captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Begin(Viewport),
    Background(Rgb),
    Grid { spacing: f32, opacity: f32 },
    Shape(ShapeDraw),
    Label { text: String },
    End,
}

/// Surface that keeps every draw call of the most recent frame.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
    frames: u64,
    detached: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls issued during the latest frame.
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn shape_calls(&self) -> impl Iterator<Item = &ShapeDraw> {
        self.calls.iter().filter_map(|call| match call {
            DrawCall::Shape(draw) => Some(draw),
            _ => None,
        })
    }

    pub fn has_background(&self) -> bool {
        self.calls
            .iter()
            .any(|call| matches!(call, DrawCall::Background(_)))
    }

    pub fn has_grid(&self) -> bool {
        self.calls.iter().any(|call| matches!(call, DrawCall::Grid { .. }))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Label { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Simulates the host tearing the surface down.
    pub fn tear_down(&mut self) {
        self.detached = true;
    }
}

impl Surface for RecordingSurface {
    fn is_attached(&self) -> bool {
        !self.detached
    }

    fn begin_frame(&mut self, viewport: Viewport) {
        self.calls.clear();
        self.calls.push(DrawCall::Begin(viewport));
    }

    fn draw_background(&mut self, color: Rgb) {
        self.calls.push(DrawCall::Background(color));
    }

    fn draw_grid(&mut self, spacing: f32, _color: Rgb, opacity: f32) {
        self.calls.push(DrawCall::Grid { spacing, opacity });
    }

    fn draw_shape(&mut self, shape: &ShapeDraw) {
        self.calls.push(DrawCall::Shape(shape.clone()));
    }

    fn draw_label(&mut self, _at: ScreenPoint, text: &str, _color: Rgb) {
        self.calls.push(DrawCall::Label {
            text: text.to_string(),
        });
    }

    fn end_frame(&mut self) {
        self.calls.push(DrawCall::End);
        self.frames += 1;
    }

    fn detach(&mut self) {
        self.detached = true;
    }
}
