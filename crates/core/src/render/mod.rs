//! Frame-by-frame renderer: keeps the scene arena in line with the settings,
//! advances each shape from the audio snapshot and issues draw calls.

mod ascii;
mod surface;

pub use ascii::AsciiSurface;
pub use surface::{
    DrawCall, Primitive, RecordingSurface, ScreenPoint, ShapeDraw, Surface, Viewport,
};

use std::f32::consts::TAU;

use crate::{
    analysis::AudioAnalysisResult,
    color::Rgb,
    geometry::{GeometryParams, Point},
    mapping,
    primes::prime_affirmation,
    scene::{SceneArena, ShapeInstance, Transform},
    settings::{RenderMode, VisualizationSettings, VisualizerType},
    timeline::CancellationToken,
    ShapeKind,
};

const MAX_SYMMETRY: u32 = 12;
const CAMERA_ORBIT_RATE: f32 = 0.001;
const GRID_DIVISIONS: f32 = 8.0;
const AFFIRMATION_HOLD_FRAMES: u64 = 120;

/// View parameters. Only resize and the 3D orbit touch these; geometry is
/// resolution independent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub distance: f32,
    /// Orbit angle around the Y axis, 3D mode only.
    pub yaw: f32,
    /// Half the world-space span that fits the shorter viewport side.
    pub world_extent: f32,
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            distance: 6.0,
            yaw: 0.0,
            world_extent: 3.2,
            aspect: 1.0,
        }
    }
}

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame_index: u64,
    pub shape_draw_calls: usize,
    pub total_draw_calls: usize,
    /// Shapes skipped because their resources were gone.
    pub skipped_shapes: usize,
    pub rendered: bool,
}

/// Owns the scene and the drawing surface of one renderer instance.
#[derive(Debug)]
pub struct RenderLoop<S: Surface> {
    surface: Option<S>,
    scene: SceneArena,
    params: GeometryParams,
    viewport: Viewport,
    camera: Camera,
    token: CancellationToken,
    frame_index: u64,
}

impl<S: Surface> RenderLoop<S> {
    /// Mounts the renderer on `surface`.
    ///
    /// A missing or already detached surface leaves the loop unmounted: every
    /// later frame is a no-op and nothing is drawn.
    pub fn mount(surface: Option<S>, viewport: Viewport, params: GeometryParams) -> Self {
        let token = CancellationToken::new();
        let surface = match surface {
            Some(surface) if surface.is_attached() => Some(surface),
            _ => {
                tracing::warn!("drawing surface unavailable, renderer stays idle");
                token.cancel();
                None
            }
        };

        let mut camera = Camera::default();
        if !viewport.is_empty() {
            camera.aspect = viewport.width as f32 / viewport.height as f32;
        }
        if surface.is_some() {
            tracing::info!(width = viewport.width, height = viewport.height, "renderer mounted");
        }

        Self {
            surface,
            scene: SceneArena::new(),
            params,
            viewport,
            camera,
            token,
            frame_index: 0,
        }
    }

    /// True while frames may still be drawn.
    pub fn is_mounted(&self) -> bool {
        self.surface.is_some() && !self.token.is_cancelled()
    }

    /// Token cancelled on teardown; frame drivers check it every iteration.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn scene(&self) -> &SceneArena {
        &self.scene
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Applies a host resize. Zero-sized viewports are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        let viewport = Viewport::new(width, height);
        if viewport.is_empty() {
            tracing::debug!(width, height, "ignoring empty resize");
            return;
        }
        self.viewport = viewport;
        self.camera.aspect = width as f32 / height as f32;
    }

    /// Advances and draws one frame from read-only settings and analysis.
    pub fn frame(
        &mut self,
        settings: &VisualizationSettings,
        analysis: &AudioAnalysisResult,
    ) -> FrameStats {
        let mut stats = FrameStats {
            frame_index: self.frame_index,
            ..Default::default()
        };
        if !self.is_mounted() {
            return stats;
        }
        if !self.surface.as_ref().is_some_and(|s| s.is_attached()) {
            tracing::debug!(frame = self.frame_index, "surface detached, skipping frame");
            return stats;
        }

        let changes = self.scene.sync(settings, &self.params);
        if !changes.is_empty() {
            tracing::debug!(shown = ?changes.shown, hidden = ?changes.hidden, "scene changed");
        }

        for shape in self.scene.shapes() {
            match self.scene.get_mut(shape) {
                Some(instance) if instance.is_live() => {
                    instance.apply(&mapping::evaluate(shape, settings, analysis));
                }
                _ => stats.skipped_shapes += 1,
            }
        }

        if settings.mode == RenderMode::ThreeD {
            let orbit = finite_or_zero(settings.rotation_speed).clamp(0.0, 10.0);
            self.camera.yaw = (self.camera.yaw + CAMERA_ORBIT_RATE * orbit).rem_euclid(TAU);
        }

        let draws: Vec<ShapeDraw> = self
            .scene
            .iter()
            .filter(|instance| instance.is_live() && instance.visible)
            .map(|instance| self.build_draw(instance, settings))
            .collect();
        let label = self.affirmation(settings);

        let brightness = mapping::safe_brightness(settings.brightness);
        let background = Rgb::parse(settings.color_theme.stops()[0])
            .unwrap_or_default()
            .scaled(brightness);
        let viewport = self.viewport;
        let grid_spacing = viewport.width.min(viewport.height) as f32 / GRID_DIVISIONS;

        let Some(surface) = self.surface.as_mut() else {
            return stats;
        };
        surface.begin_frame(viewport);
        surface.draw_background(background);
        stats.total_draw_calls += 1;

        if settings.show_grid {
            let opacity = finite_or_zero(settings.grid_intensity).clamp(0.0, 1.0);
            surface.draw_grid(grid_spacing, Rgb::WHITE.scaled(brightness * 0.5), opacity);
            stats.total_draw_calls += 1;
        }

        for draw in &draws {
            surface.draw_shape(draw);
            stats.shape_draw_calls += 1;
            stats.total_draw_calls += 1;
        }

        if let Some((at, text)) = label {
            surface.draw_label(at, text, Rgb::WHITE);
            stats.total_draw_calls += 1;
        }
        surface.end_frame();

        stats.rendered = true;
        self.frame_index += 1;
        stats
    }

    /// Cancels outstanding frames, releases the scene and hands the surface
    /// back to the host.
    pub fn teardown(&mut self) -> Option<S> {
        self.token.cancel();
        self.scene.clear();
        let mut surface = self.surface.take();
        if let Some(surface) = surface.as_mut() {
            surface.detach();
            tracing::info!(frames = self.frame_index, "renderer torn down");
        }
        surface
    }

    fn build_draw(&self, instance: &ShapeInstance, settings: &VisualizationSettings) -> ShapeDraw {
        let geometry = instance.geometry();
        let primitive = match (settings.visualizer_type, instance.shape) {
            (VisualizerType::Points, _) => Primitive::Points,
            (_, ShapeKind::FlowerOfLife) => Primitive::Circles,
            (_, ShapeKind::MetatronsCube) => Primitive::Edges,
            (_, ShapeKind::FibonacciSpiral | ShapeKind::PrimeSpiral) => Primitive::Path,
        };

        let symmetry = settings.symmetry.clamp(1, MAX_SYMMETRY);
        let mut copies = Vec::with_capacity(symmetry as usize * 2);
        for copy in 0..symmetry {
            let spin = copy as f32 * TAU / symmetry as f32;
            for mirror in [false, true] {
                if mirror && !settings.mirror_enabled {
                    continue;
                }
                copies.push(self.project_all(
                    &geometry.points,
                    &instance.transform,
                    settings.mode,
                    spin,
                    mirror,
                ));
            }
        }

        let highlights = geometry
            .highlights
            .iter()
            .map(|prime| {
                self.project(&prime.coordinate, &instance.transform, settings.mode, 0.0, false)
            })
            .collect();

        ShapeDraw {
            shape: instance.shape,
            primitive,
            copies,
            edges: geometry.edges.clone(),
            circle_radius: geometry
                .circle_radius
                .map(|r| r * instance.transform.scale * self.pixels_per_unit()),
            highlights,
            material: instance.material,
        }
    }

    fn affirmation(
        &self,
        settings: &VisualizationSettings,
    ) -> Option<(ScreenPoint, &'static str)> {
        if !settings.show_prime_affirmations {
            return None;
        }
        let instance = self.scene.get(ShapeKind::PrimeSpiral)?;
        let primes = &instance.geometry().highlights;
        if !instance.is_live() || primes.is_empty() {
            return None;
        }
        let slot = (self.frame_index / AFFIRMATION_HOLD_FRAMES) as usize % primes.len();
        let prime = primes[slot];
        let at = self.project(&prime.coordinate, &instance.transform, settings.mode, 0.0, false);
        Some((at, prime_affirmation(prime.index)))
    }

    fn pixels_per_unit(&self) -> f32 {
        self.viewport.width.min(self.viewport.height) as f32 * 0.5 / self.camera.world_extent
    }

    fn project_all(
        &self,
        points: &[Point],
        transform: &Transform,
        mode: RenderMode,
        spin: f32,
        mirror: bool,
    ) -> Vec<ScreenPoint> {
        points
            .iter()
            .map(|point| self.project(point, transform, mode, spin, mirror))
            .collect()
    }

    /// Model space to pixels: scale, rotate X/Y/Z (plus the symmetry spin),
    /// optionally mirror, then orbit and perspective in 3D.
    fn project(
        &self,
        point: &Point,
        transform: &Transform,
        mode: RenderMode,
        spin: f32,
        mirror: bool,
    ) -> ScreenPoint {
        let [rx, ry, rz] = transform.rotation;
        let mut p = [
            point.x * transform.scale,
            point.y * transform.scale,
            point.z_or_zero() * transform.scale,
        ];
        p = rotate_x(p, rx);
        p = rotate_y(p, ry);
        p = rotate_z(p, rz + spin);
        if mirror {
            p[0] = -p[0];
        }

        let (x, y) = match mode {
            RenderMode::TwoD => (p[0], p[1]),
            RenderMode::ThreeD => {
                let [x, y, z] = rotate_y(p, self.camera.yaw);
                let depth = (self.camera.distance - z).max(0.1);
                let perspective = self.camera.distance / depth;
                (x * perspective, y * perspective)
            }
        };

        let center = self.viewport.center();
        let ppu = self.pixels_per_unit();
        ScreenPoint::new(center.x + x * ppu, center.y - y * ppu)
    }
}

fn rotate_x([x, y, z]: [f32; 3], angle: f32) -> [f32; 3] {
    let (sin, cos) = angle.sin_cos();
    [x, y * cos - z * sin, y * sin + z * cos]
}

fn rotate_y([x, y, z]: [f32; 3], angle: f32) -> [f32; 3] {
    let (sin, cos) = angle.sin_cos();
    [x * cos + z * sin, y, -x * sin + z * cos]
}

fn rotate_z([x, y, z]: [f32; 3], angle: f32) -> [f32; 3] {
    let (sin, cos) = angle.sin_cos();
    [x * cos - y * sin, x * sin + y * cos, z]
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
