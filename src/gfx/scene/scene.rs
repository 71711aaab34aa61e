use std::collections::BTreeMap;

use cgmath::{Matrix4, SquareMatrix, Vector3, Vector4};

use super::lighting::Lighting;
use super::object::{ObjectId, ObjectTag, SceneObject};

/// Main scene: an arena of objects forming a strict parent/child tree.
///
/// Removing an object removes its whole subtree. Removed ids are recorded so
/// the renderer can release the GPU resources it cached for them.
pub struct Scene {
    objects: BTreeMap<ObjectId, SceneObject>,
    next_id: u32,
    released: Vec<ObjectId>,
    pub lighting: Lighting,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            next_id: 0,
            released: Vec::new(),
            lighting: Lighting::default(),
        }
    }

    /// Adds a root object and returns its id.
    pub fn add(&mut self, mut object: SceneObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        object.parent = None;
        object.children.clear();
        self.objects.insert(id, object);
        id
    }

    /// Adds `object` as a child of `parent`. Falls back to a root if the
    /// parent no longer exists.
    pub fn add_child(&mut self, parent: ObjectId, object: SceneObject) -> ObjectId {
        let id = self.add(object);
        if let Some(parent_object) = self.objects.get_mut(&parent) {
            parent_object.children.push(id);
            if let Some(child) = self.objects.get_mut(&id) {
                child.parent = Some(parent);
            }
        }
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Removes `id` and all of its descendants.
    pub fn remove(&mut self, id: ObjectId) -> bool {
        let Some(object) = self.objects.get(&id) else {
            return false;
        };

        if let Some(parent) = object.parent {
            if let Some(parent_object) = self.objects.get_mut(&parent) {
                parent_object.children.retain(|child| *child != id);
            }
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(removed) = self.objects.remove(&current) {
                stack.extend(removed.children);
                self.released.push(current);
            }
        }
        true
    }

    /// Removes every object. All ids are recorded as released.
    pub fn clear(&mut self) {
        let ids: Vec<ObjectId> = self.objects.keys().copied().collect();
        self.released.extend(ids);
        self.objects.clear();
    }

    /// Ids removed since the last call.
    pub fn take_released(&mut self) -> Vec<ObjectId> {
        std::mem::take(&mut self.released)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().map(|(id, object)| (*id, object))
    }

    pub fn children(&self, id: ObjectId) -> &[ObjectId] {
        self.objects
            .get(&id)
            .map(|object| object.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn find_by_tag(&self, tag: ObjectTag) -> Option<ObjectId> {
        self.iter()
            .find(|(_, object)| object.tag == tag)
            .map(|(id, _)| id)
    }

    pub fn count_tagged(&self, predicate: impl Fn(ObjectTag) -> bool) -> usize {
        self.objects
            .values()
            .filter(|object| predicate(object.tag))
            .count()
    }

    /// World transform: the product of every ancestor's local transform.
    pub fn world_matrix(&self, id: ObjectId) -> Matrix4<f32> {
        let mut matrix = Matrix4::identity();
        let mut current = Some(id);
        while let Some(current_id) = current {
            let Some(object) = self.objects.get(&current_id) else {
                break;
            };
            matrix = object.transform.matrix() * matrix;
            current = object.parent;
        }
        matrix
    }

    pub fn world_position(&self, id: ObjectId) -> Vector3<f32> {
        let p = self.world_matrix(id) * Vector4::new(0.0, 0.0, 0.0, 1.0);
        Vector3::new(p.x, p.y, p.z)
    }

    /// An object is drawn only if it and every ancestor are visible.
    pub fn is_visible(&self, id: ObjectId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            match self.objects.get(&current_id) {
                Some(object) if object.visible => current = object.parent,
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::object::{Material, MeshKind};

    fn cube(name: &str) -> SceneObject {
        SceneObject::mesh(name, MeshKind::Cube, Material::default())
    }

    #[test]
    fn world_position_composes_parent_chain() {
        let mut scene = Scene::new();
        let root = scene.add(SceneObject::group("root").with_position(Vector3::new(0.0, 0.0, -10.0)));
        let child = scene.add_child(
            root,
            cube("child").with_position(Vector3::new(1.0, 0.0, 0.0)),
        );
        let grandchild = scene.add_child(
            child,
            cube("grandchild").with_position(Vector3::new(0.0, 2.0, 0.0)),
        );

        assert_eq!(scene.world_position(grandchild), Vector3::new(1.0, 2.0, -10.0));
        assert_eq!(scene.children(root), &[child]);
    }

    #[test]
    fn remove_takes_subtree_and_records_release() {
        let mut scene = Scene::new();
        let root = scene.add(SceneObject::group("root"));
        let a = scene.add_child(root, cube("a"));
        let b = scene.add_child(a, cube("b"));
        let keep = scene.add(cube("keep"));

        assert!(scene.remove(a));
        assert!(!scene.contains(a));
        assert!(!scene.contains(b));
        assert!(scene.contains(keep));
        assert!(scene.children(root).is_empty());

        let mut released = scene.take_released();
        released.sort();
        assert_eq!(released, vec![a, b]);
        assert!(scene.take_released().is_empty());
        assert!(!scene.remove(a));
    }

    #[test]
    fn hidden_parent_hides_children() {
        let mut scene = Scene::new();
        let root = scene.add(SceneObject::group("root"));
        let child = scene.add_child(root, cube("child"));
        assert!(scene.is_visible(child));
        if let Some(object) = scene.get_mut(root) {
            object.visible = false;
        }
        assert!(!scene.is_visible(child));
    }

    #[test]
    fn lookups_by_name_and_tag() {
        let mut scene = Scene::new();
        let artifact = scene.add(cube("artifact").with_tag(ObjectTag::Artifact));
        assert_eq!(scene.find_by_name("artifact"), Some(artifact));
        assert_eq!(scene.find_by_tag(ObjectTag::Artifact), Some(artifact));
        assert_eq!(scene.count_tagged(|tag| tag == ObjectTag::Artifact), 1);

        scene.clear();
        assert!(scene.is_empty());
        assert_eq!(scene.take_released(), vec![artifact]);
    }
}
