use cgmath::{
    perspective, Deg, InnerSpace, Matrix3, Matrix4, One, Quaternion, Rotation, SquareMatrix,
    Vector3, Vector4,
};

use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform, OPENGL_TO_WGPU_MATRIX};

/// Free perspective camera flying down the tunnel along -Z.
///
/// Orientation is a quaternion; identity looks down -Z with +Y up.
#[derive(Debug, Clone, Copy)]
pub struct TunnelCamera {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub fovy: Deg<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for TunnelCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.gl_view_projection()
    }
}

impl TunnelCamera {
    pub fn new(position: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            position,
            rotation: Quaternion::one(),
            fovy: Deg(60.0),
            aspect,
            znear: 0.1,
            zfar: 100.0,
            uniform: CameraUniform::default(),
        };
        camera.update_view_proj();
        camera
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::from(self.rotation.invert()) * Matrix4::from_translation(-self.position)
    }

    /// View-projection with OpenGL clip depth (`-1..1`), used for unprojection.
    pub fn gl_view_projection(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar) * self.view_matrix()
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(-Vector3::unit_z())
    }

    pub fn right(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_x())
    }

    pub fn up(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_y())
    }

    /// Turns the camera to face `target`, keeping world +Y as up.
    ///
    /// Leaves the orientation unchanged when the target coincides with the
    /// camera or lies straight above/below it.
    pub fn look_at(&mut self, target: Vector3<f32>) {
        let to_target = target - self.position;
        if to_target.magnitude2() <= f32::EPSILON {
            return;
        }
        let back = -to_target.normalize();
        let right = Vector3::unit_y().cross(back);
        if right.magnitude2() <= f32::EPSILON {
            return;
        }
        let right = right.normalize();
        let up = back.cross(right);
        self.rotation = Quaternion::from(Matrix3::from_cols(right, up, back)).normalize();
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn update_view_proj(&mut self) {
        let right = self.right();
        let up = self.up();
        self.uniform = CameraUniform {
            view_position: [self.position.x, self.position.y, self.position.z, 1.0],
            view_proj: convert_matrix4_to_array(self.build_view_projection_matrix()),
            right: [right.x, right.y, right.z, 0.0],
            up: [up.x, up.y, up.z, 0.0],
        };
    }

    /// Projects a world point to pixel coordinates (origin top-left).
    ///
    /// Returns `None` for points behind the camera.
    pub fn project_to_screen(
        &self,
        point: Vector3<f32>,
        viewport: (f32, f32),
    ) -> Option<(f32, f32)> {
        let clip = self.gl_view_projection() * Vector4::new(point.x, point.y, point.z, 1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        Some((
            (ndc_x + 1.0) * 0.5 * viewport.0,
            (1.0 - ndc_y) * 0.5 * viewport.1,
        ))
    }

    /// Inverse of [`gl_view_projection`](Self::gl_view_projection), identity if singular.
    pub fn inverse_gl_view_projection(&self) -> Matrix4<f32> {
        self.gl_view_projection()
            .invert()
            .unwrap_or(Matrix4::identity())
    }
}
