/// Placement of a mesh in world space. Composed as `T * S * R`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: glm::Vec3,
    pub scale: f32,
    /// Angle in degrees about an axis.
    pub rotation: Option<(f32, glm::Vec3)>,
}

impl Transform {
    pub fn at(translation: glm::Vec3, scale: f32) -> Self {
        Self {
            translation,
            scale,
            rotation: None,
        }
    }

    pub fn rotated(mut self, degrees: f32, axis: glm::Vec3) -> Self {
        self.rotation = Some((degrees, axis));
        self
    }

    pub fn model_matrix(&self) -> glm::Mat4 {
        let mut model = identity();
        model = glm::ext::translate(&model, self.translation);
        model = glm::ext::scale(&model, glm::vec3(self.scale, self.scale, self.scale));
        if let Some((degrees, axis)) = self.rotation {
            model = glm::ext::rotate(&model, degrees.to_radians(), axis);
        }
        model
    }
}

pub fn identity() -> glm::Mat4 {
    glm::Mat4::new(
        glm::vec4(1.0, 0.0, 0.0, 0.0),
        glm::vec4(0.0, 1.0, 0.0, 0.0),
        glm::vec4(0.0, 0.0, 1.0, 0.0),
        glm::vec4(0.0, 0.0, 0.0, 1.0),
    )
}

/// Keeps only the upper-left 3x3 block, so the result rotates but never translates.
pub fn strip_translation(m: &glm::Mat4) -> glm::Mat4 {
    glm::Mat4::new(
        glm::vec4(m.c0.x, m.c0.y, m.c0.z, 0.0),
        glm::vec4(m.c1.x, m.c1.y, m.c1.z, 0.0),
        glm::vec4(m.c2.x, m.c2.y, m.c2.z, 0.0),
        glm::vec4(0.0, 0.0, 0.0, 1.0),
    )
}

/// Column-major `[[f32; 4]; 4]`, as glTF stores node matrices.
pub fn from_columns(m: [[f32; 4]; 4]) -> glm::Mat4 {
    let column = |c: [f32; 4]| glm::vec4(c[0], c[1], c[2], c[3]);
    glm::Mat4::new(column(m[0]), column(m[1]), column(m[2]), column(m[3]))
}

/// `outer * inner`: applies `inner` first.
pub fn compose(outer: &glm::Mat4, inner: &glm::Mat4) -> glm::Mat4 {
    glm::Mat4::new(
        *outer * inner.c0,
        *outer * inner.c1,
        *outer * inner.c2,
        *outer * inner.c3,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(v: glm::Vec4, x: f32, y: f32, z: f32, w: f32) {
        let eps = 1e-4;
        assert!(
            (v.x - x).abs() < eps && (v.y - y).abs() < eps && (v.z - z).abs() < eps && (v.w - w).abs() < eps,
            "{v:?} != ({x}, {y}, {z}, {w})"
        );
    }

    #[test]
    fn origin_lands_on_translation() {
        let model = Transform::at(glm::vec3(7.0, -2.69, -2.5), 3.0)
            .rotated(180.0, glm::vec3(0.0, 1.0, 0.0))
            .model_matrix();
        let origin = model * glm::vec4(0.0, 0.0, 0.0, 1.0);
        assert_close(origin, 7.0, -2.69, -2.5, 1.0);
    }

    #[test]
    fn rotation_applies_before_scale_and_translation() {
        let model = Transform::at(glm::vec3(10.0, 0.0, 0.0), 2.0)
            .rotated(90.0, glm::vec3(0.0, 1.0, 0.0))
            .model_matrix();
        // +X rotated 90 degrees about +Y is -Z, then doubled, then shifted.
        let p = model * glm::vec4(1.0, 0.0, 0.0, 1.0);
        assert_close(p, 10.0, 0.0, -2.0, 1.0);
    }

    #[test]
    fn unrotated_transform_scales_about_origin() {
        let model = Transform::at(glm::vec3(0.0, -4.0, 0.0), 0.5).model_matrix();
        let p = model * glm::vec4(2.0, 2.0, 2.0, 1.0);
        assert_close(p, 1.0, -3.0, 1.0, 1.0);
    }

    #[test]
    fn stripped_view_ignores_translation() {
        let view = glm::ext::translate(&identity(), glm::vec3(3.0, 4.0, 5.0));
        let sky = strip_translation(&view);
        let p = sky * glm::vec4(1.0, 2.0, 3.0, 1.0);
        assert_close(p, 1.0, 2.0, 3.0, 1.0);
    }

    #[test]
    fn columns_keep_gltf_translation_in_last_column() {
        let m = from_columns([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [4.0, 5.0, 6.0, 1.0],
        ]);
        let p = m * glm::vec4(0.0, 0.0, 0.0, 1.0);
        assert_close(p, 4.0, 5.0, 6.0, 1.0);
    }

    #[test]
    fn composition_applies_inner_first() {
        let outer = Transform::at(glm::vec3(10.0, 0.0, 0.0), 2.0).model_matrix();
        let inner = glm::ext::translate(&identity(), glm::vec3(0.0, 1.0, 0.0));
        let p = compose(&outer, &inner) * glm::vec4(0.0, 0.0, 0.0, 1.0);
        // Shifted up first, then doubled and moved along X.
        assert_close(p, 10.0, 2.0, 0.0, 1.0);

        let q = compose(&inner, &outer) * glm::vec4(0.0, 0.0, 0.0, 1.0);
        assert_close(q, 10.0, 1.0, 0.0, 1.0);
    }
}
