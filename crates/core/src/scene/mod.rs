use std::{collections::BTreeMap, f32::consts::TAU};

use crate::{
    color::Rgb,
    geometry::{self, GeometryParams, ShapeGeometry},
    mapping::ShapeUpdate,
    settings::{RenderMode, VisualizationSettings},
    ShapeKind,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Euler angles in radians, wrapped into [0, 2π).
    pub rotation: [f32; 3],
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            rotation: [0.0; 3],
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Rgb,
    pub opacity: f32,
    pub point_size: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            opacity: 1.0,
            point_size: 1.0,
        }
    }
}

/// One drawable shape group. Geometry is fixed for the instance's lifetime;
/// transform and material change every frame.
#[derive(Debug, Clone)]
pub struct ShapeInstance {
    pub shape: ShapeKind,
    geometry: ShapeGeometry,
    pub visible: bool,
    pub transform: Transform,
    pub material: Material,
    live: bool,
}

impl ShapeInstance {
    pub fn new(shape: ShapeKind, mode: RenderMode, params: &GeometryParams) -> Self {
        Self {
            shape,
            geometry: geometry::generate(shape, mode, params),
            visible: true,
            transform: Transform::default(),
            material: Material::default(),
            live: true,
        }
    }

    pub fn geometry(&self) -> &ShapeGeometry {
        &self.geometry
    }

    /// False once the instance's backing resources were released.
    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn release(&mut self) {
        self.live = false;
        self.visible = false;
    }

    pub fn apply(&mut self, update: &ShapeUpdate) {
        for (angle, delta) in self.transform.rotation.iter_mut().zip(update.rotation_delta) {
            *angle = (*angle + delta).rem_euclid(TAU);
        }
        self.transform.scale = update.scale;
        self.material = Material {
            color: update.color,
            opacity: update.opacity,
            point_size: update.point_size,
        };
    }
}

/// What [`SceneArena::sync`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneChanges {
    pub shown: Vec<ShapeKind>,
    pub hidden: Vec<ShapeKind>,
}

impl SceneChanges {
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty() && self.hidden.is_empty()
    }
}

/// Owns every shape instance of one renderer, keyed by shape.
#[derive(Debug, Default)]
pub struct SceneArena {
    instances: BTreeMap<ShapeKind, ShapeInstance>,
    mode: RenderMode,
}

impl SceneArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the arena in line with `settings`: creates instances for newly
    /// active shapes, drops deactivated ones, and rebuilds everything when the
    /// render mode flips.
    pub fn sync(
        &mut self,
        settings: &VisualizationSettings,
        params: &GeometryParams,
    ) -> SceneChanges {
        let mut changes = SceneChanges::default();

        if settings.mode != self.mode {
            tracing::debug!(from = ?self.mode, to = ?settings.mode, "render mode changed");
            for (shape, mut instance) in std::mem::take(&mut self.instances) {
                instance.release();
                changes.hidden.push(shape);
            }
            self.mode = settings.mode;
        }

        let stale: Vec<ShapeKind> = self
            .instances
            .keys()
            .copied()
            .filter(|shape| !settings.is_active(*shape))
            .collect();
        for shape in stale {
            if let Some(mut instance) = self.instances.remove(&shape) {
                instance.release();
                changes.hidden.push(shape);
            }
        }

        for &shape in &settings.active_shapes {
            if !self.instances.contains_key(&shape) {
                self.instances
                    .insert(shape, ShapeInstance::new(shape, self.mode, params));
                changes.shown.push(shape);
            }
        }

        changes
    }

    pub fn get(&self, shape: ShapeKind) -> Option<&ShapeInstance> {
        self.instances.get(&shape)
    }

    pub fn get_mut(&mut self, shape: ShapeKind) -> Option<&mut ShapeInstance> {
        self.instances.get_mut(&shape)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShapeInstance> {
        self.instances.values()
    }

    pub fn shapes(&self) -> Vec<ShapeKind> {
        self.instances.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Releases and drops every instance.
    pub fn clear(&mut self) {
        for instance in self.instances.values_mut() {
            instance.release();
        }
        self.instances.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with(shapes: &[ShapeKind]) -> VisualizationSettings {
        VisualizationSettings::default().with_active_shapes(shapes.iter().copied())
    }

    #[test]
    fn sync_creates_and_drops_instances() {
        let params = GeometryParams::default();
        let mut arena = SceneArena::new();

        let changes = arena.sync(
            &settings_with(&[ShapeKind::FlowerOfLife, ShapeKind::PrimeSpiral]),
            &params,
        );
        assert_eq!(changes.shown, vec![ShapeKind::FlowerOfLife, ShapeKind::PrimeSpiral]);
        assert_eq!(arena.len(), 2);

        let changes = arena.sync(&settings_with(&[ShapeKind::PrimeSpiral]), &params);
        assert_eq!(changes.hidden, vec![ShapeKind::FlowerOfLife]);
        assert!(changes.shown.is_empty());
        assert!(arena.get(ShapeKind::FlowerOfLife).is_none());
    }

    #[test]
    fn sync_is_idle_when_nothing_changed() {
        let params = GeometryParams::default();
        let mut arena = SceneArena::new();
        let settings = settings_with(&[ShapeKind::MetatronsCube]);
        arena.sync(&settings, &params);
        assert!(arena.sync(&settings, &params).is_empty());
    }

    #[test]
    fn mode_flip_rebuilds_geometry() {
        let params = GeometryParams::default();
        let mut arena = SceneArena::new();
        let flat = settings_with(&[ShapeKind::MetatronsCube]);
        arena.sync(&flat, &params);
        assert_eq!(arena.get(ShapeKind::MetatronsCube).unwrap().geometry().points.len(), 13);

        let changes = arena.sync(&flat.with_mode(RenderMode::ThreeD), &params);
        assert_eq!(changes.hidden, vec![ShapeKind::MetatronsCube]);
        assert_eq!(changes.shown, vec![ShapeKind::MetatronsCube]);
        assert_eq!(arena.get(ShapeKind::MetatronsCube).unwrap().geometry().points.len(), 15);
    }

    #[test]
    fn rotation_wraps() {
        let params = GeometryParams::default();
        let mut instance = ShapeInstance::new(ShapeKind::FlowerOfLife, RenderMode::TwoD, &params);
        let update = ShapeUpdate {
            rotation_delta: [0.0, 4.0, 0.0],
            scale: 1.1,
            color: Rgb::WHITE,
            opacity: 0.5,
            point_size: 2.0,
        };
        instance.apply(&update);
        instance.apply(&update);
        assert!((instance.transform.rotation[1] - (8.0 - TAU)).abs() < 1e-5);
        assert_eq!(instance.transform.scale, 1.1);
        assert_eq!(instance.material.opacity, 0.5);
    }

    #[test]
    fn released_instances_are_not_live() {
        let params = GeometryParams::default();
        let mut instance = ShapeInstance::new(ShapeKind::PrimeSpiral, RenderMode::TwoD, &params);
        assert!(instance.is_live());
        instance.release();
        assert!(!instance.is_live());
        assert!(!instance.visible);
    }
}
