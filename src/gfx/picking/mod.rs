//! # Object Picking System
//!
//! Ray-casting from pointer coordinates into the scene, used to resolve which
//! fragment (or the intact artifact) a click or hover targets.
//!
//! ## How it works
//!
//! 1. **Pointer to Ray**: unproject the pointer through the inverse view-projection
//! 2. **Ray-Object Intersection**: move the ray into each object's local space and
//!    slab-test it against the mesh bounds, so rotated and scaled objects pick exactly
//! 3. **Selection**: among several hits, keep the object whose projected center
//!    is nearest the pointer
//!
//! ## Usage
//!
//! ```no_run
//! # use shardvault::gfx::{camera::TunnelCamera, picking::ObjectPicker, scene::Scene};
//! # let (scene, camera, candidates) = (Scene::new(), TunnelCamera::new(cgmath::Vector3::new(0.0, 0.0, 6.0), 1.0), vec![]);
//! let mut picker = ObjectPicker::new();
//! let ray = picker.screen_to_ray((400.0, 300.0), (800.0, 600.0), &camera);
//! let hits = picker.intersect_all(&scene, &candidates, &ray);
//! let target = picker.closest_on_screen(&scene, &hits, (400.0, 300.0), (800.0, 600.0), &camera);
//! ```

use std::collections::HashMap;

use cgmath::{ElementWise, InnerSpace, SquareMatrix, Vector2, Vector3, Vector4};

use crate::gfx::{
    camera::TunnelCamera,
    scene::{MeshKind, ObjectId, Scene},
};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vector3<f32>,
    /// Normalized for world rays; local-space rays keep the transformed length.
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl AABB {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Slab test. Returns the ray parameter of the entry point, or of the exit
    /// point when the origin is inside the box.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }
}

/// Result of a ray hit against one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickResult {
    pub id: ObjectId,
    /// Distance along the world ray.
    pub distance: f32,
    pub point: Vector3<f32>,
}

/// Ray picker with a per-mesh bounds cache.
#[derive(Default)]
pub struct ObjectPicker {
    cached_bounds: HashMap<MeshKind, AABB>,
}

impl ObjectPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts pixel coordinates (origin top-left) to a world-space ray from
    /// the near plane toward the far plane.
    pub fn screen_to_ray(
        &self,
        screen_pos: (f32, f32),
        screen_size: (f32, f32),
        camera: &TunnelCamera,
    ) -> Ray {
        let (mouse_x, mouse_y) = screen_pos;
        let (screen_width, screen_height) = (screen_size.0.max(1.0), screen_size.1.max(1.0));

        let ndc_x = (2.0 * mouse_x) / screen_width - 1.0;
        let ndc_y = 1.0 - (2.0 * mouse_y) / screen_height;

        let inv_view_proj = camera.inverse_gl_view_projection();
        let world_near = inv_view_proj * Vector4::new(ndc_x, ndc_y, -1.0, 1.0);
        let world_far = inv_view_proj * Vector4::new(ndc_x, ndc_y, 1.0, 1.0);

        let near_3d = world_near.truncate() / world_near.w;
        let far_3d = world_far.truncate() / world_far.w;

        Ray::new(near_3d, far_3d - near_3d)
    }

    fn bounds_for(&mut self, mesh: MeshKind) -> AABB {
        *self.cached_bounds.entry(mesh).or_insert_with(|| {
            let (min, max) = mesh.local_bounds();
            AABB::new(min, max)
        })
    }

    /// Intersects `ray` with one object's oriented bounds.
    ///
    /// Hidden objects, mesh-less groups and objects with a singular world
    /// transform never hit.
    pub fn intersect(&mut self, scene: &Scene, id: ObjectId, ray: &Ray) -> Option<PickResult> {
        let mesh = scene.get(id)?.mesh?;
        if !scene.is_visible(id) {
            return None;
        }

        let world = scene.world_matrix(id);
        let inverse = world.invert()?;
        let local_origin = inverse * ray.origin.extend(1.0);
        let local_ray = Ray {
            origin: local_origin.truncate() / local_origin.w,
            direction: (inverse * ray.direction.extend(0.0)).truncate(),
        };

        let distance = self.bounds_for(mesh).intersect_ray(&local_ray)?;
        Some(PickResult {
            id,
            distance,
            point: ray.point_at(distance),
        })
    }

    /// Every hit among `candidates`, in candidate order.
    pub fn intersect_all(
        &mut self,
        scene: &Scene,
        candidates: &[ObjectId],
        ray: &Ray,
    ) -> Vec<PickResult> {
        candidates
            .iter()
            .filter_map(|id| self.intersect(scene, *id, ray))
            .collect()
    }

    /// Chooses the hit whose object center projects nearest to the pointer.
    /// Ties keep the earliest hit.
    pub fn closest_on_screen(
        &self,
        scene: &Scene,
        hits: &[PickResult],
        pointer: (f32, f32),
        screen_size: (f32, f32),
        camera: &TunnelCamera,
    ) -> Option<PickResult> {
        let pointer = Vector2::new(pointer.0, pointer.1);
        let mut best: Option<(f32, PickResult)> = None;

        for hit in hits {
            let center = scene.world_position(hit.id);
            let Some((x, y)) = camera.project_to_screen(center, screen_size) else {
                continue;
            };
            let distance = (Vector2::new(x, y) - pointer).magnitude2();
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, *hit));
            }
        }

        best.map(|(_, hit)| hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::{Material, SceneObject};
    use cgmath::{Deg, Quaternion, Rotation3};

    fn camera() -> TunnelCamera {
        TunnelCamera::new(Vector3::new(0.0, 0.0, 6.0), 800.0 / 600.0)
    }

    #[test]
    fn ray_aabb_intersection() {
        let aabb = AABB::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));

        let ray = Ray::new(Vector3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(aabb.intersect_ray(&ray), Some(4.0));

        let ray_miss = Ray::new(Vector3::new(5.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect_ray(&ray_miss).is_none());
    }

    #[test]
    fn center_ray_points_down_the_tunnel() {
        let picker = ObjectPicker::new();
        let ray = picker.screen_to_ray((400.0, 300.0), (800.0, 600.0), &camera());
        assert!((ray.direction - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-4);
        assert!((ray.origin.z - 5.9).abs() < 1e-3);
    }

    #[test]
    fn picks_rotated_and_scaled_objects() {
        let mut scene = Scene::new();
        let cube = scene.add(
            SceneObject::mesh("artifact", MeshKind::Cube, Material::default())
                .with_position(Vector3::new(0.0, 0.0, -10.0))
                .with_rotation(Quaternion::from_angle_y(Deg(45.0)))
                .with_scale(1.5),
        );
        let mut picker = ObjectPicker::new();
        let cam = camera();

        let ray = picker.screen_to_ray((400.0, 300.0), (800.0, 600.0), &cam);
        let hit = picker.intersect(&scene, cube, &ray).unwrap();
        // ray starts on the near plane (z = 5.9); the rotated cube presents an edge
        let expected = 15.9 - 0.75 * std::f32::consts::SQRT_2;
        assert!((hit.distance - expected).abs() < 1e-2);

        let miss = picker.screen_to_ray((5.0, 5.0), (800.0, 600.0), &cam);
        assert!(picker.intersect(&scene, cube, &miss).is_none());
    }

    #[test]
    fn hidden_and_group_objects_never_hit() {
        let mut scene = Scene::new();
        let group = scene.add(SceneObject::group("group").with_position(Vector3::new(0.0, 0.0, -10.0)));
        let body = scene.add_child(group, SceneObject::mesh("body", MeshKind::Cube, Material::default()));
        let mut picker = ObjectPicker::new();
        let ray = picker.screen_to_ray((400.0, 300.0), (800.0, 600.0), &camera());

        assert!(picker.intersect(&scene, group, &ray).is_none());
        assert!(picker.intersect(&scene, body, &ray).is_some());
        if let Some(object) = scene.get_mut(group) {
            object.visible = false;
        }
        assert!(picker.intersect(&scene, body, &ray).is_none());
    }

    #[test]
    fn closest_on_screen_prefers_nearest_projection() {
        let mut scene = Scene::new();
        let far_center = scene.add(
            SceneObject::mesh("a", MeshKind::Cube, Material::default())
                .with_position(Vector3::new(0.3, 0.0, -10.0))
                .with_scale(2.0),
        );
        let near_center = scene.add(
            SceneObject::mesh("b", MeshKind::Cube, Material::default())
                .with_position(Vector3::new(0.0, 0.0, -20.0))
                .with_scale(2.0),
        );
        let mut picker = ObjectPicker::new();
        let cam = camera();
        let ray = picker.screen_to_ray((400.0, 300.0), (800.0, 600.0), &cam);
        let hits = picker.intersect_all(&scene, &[far_center, near_center], &ray);
        assert_eq!(hits.len(), 2);

        let chosen = picker
            .closest_on_screen(&scene, &hits, (400.0, 300.0), (800.0, 600.0), &cam)
            .unwrap();
        assert_eq!(chosen.id, near_center);
    }

    #[test]
    fn equal_projections_keep_first_hit() {
        let mut scene = Scene::new();
        let a = scene.add(
            SceneObject::mesh("a", MeshKind::Cube, Material::default())
                .with_position(Vector3::new(0.0, 0.0, -10.0)),
        );
        let b = scene.add(
            SceneObject::mesh("b", MeshKind::Cube, Material::default())
                .with_position(Vector3::new(0.0, 0.0, -14.0)),
        );
        let mut picker = ObjectPicker::new();
        let cam = camera();
        let ray = picker.screen_to_ray((400.0, 300.0), (800.0, 600.0), &cam);
        let hits = picker.intersect_all(&scene, &[b, a], &ray);
        let chosen = picker
            .closest_on_screen(&scene, &hits, (400.0, 300.0), (800.0, 600.0), &cam)
            .unwrap();
        assert_eq!(chosen.id, b);
    }
}
