use std::collections::HashMap;
use std::mem::{offset_of, size_of, size_of_val};
use std::path::Path;

use crate::error::AssetError;
use crate::renderer::gl;
use crate::shader;
use crate::texture::{self, Pixels};
use crate::transform::{compose, from_columns, identity};

/// Texture unit of `material.texture_diffuse1`.
pub const DIFFUSE_UNIT: u32 = 0;
/// Texture unit of `material.texture_specular1`.
pub const SPECULAR_UNIT: u32 = 1;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: glm::Vec3,
    pub normal: glm::Vec3,
    pub tex_coords: glm::Vec2,
}

/// One uploaded triangle primitive.
#[derive(Debug)]
struct Mesh {
    vao: gl::types::GLuint,
    vbo: gl::types::GLuint,
    ebo: gl::types::GLuint,
    index_count: gl::types::GLsizei,
    diffuse: gl::types::GLuint,
    specular: gl::types::GLuint,
}

/// What the scene walk needs from a glTF node.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub mesh: Option<usize>,
    /// Column-major local transform.
    pub matrix: [[f32; 4]; 4],
    pub children: Vec<usize>,
}

/// A glTF mesh drawn at a node's accumulated transform.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub mesh: usize,
    pub local: glm::Mat4,
}

/// Flattens the node tree below `roots` into one placement per mesh-bearing
/// node. A node already on the current path is not entered again.
pub fn place_meshes(nodes: &[NodeInfo], roots: &[usize]) -> Vec<Placement> {
    fn visit(
        nodes: &[NodeInfo],
        index: usize,
        parent: &glm::Mat4,
        on_path: &mut Vec<bool>,
        out: &mut Vec<Placement>,
    ) {
        let Some(node) = nodes.get(index) else {
            return;
        };
        if on_path[index] {
            return;
        }
        on_path[index] = true;

        let world = compose(parent, &from_columns(node.matrix));
        if let Some(mesh) = node.mesh {
            out.push(Placement { mesh, local: world });
        }
        for &child in &node.children {
            visit(nodes, child, &world, on_path, out);
        }

        on_path[index] = false;
    }

    let mut on_path = vec![false; nodes.len()];
    let mut out = Vec::new();
    for &root in roots {
        visit(nodes, root, &identity(), &mut on_path, &mut out);
    }
    out
}

/// Interleaves per-vertex attributes. `None` when the attribute streams
/// disagree on the vertex count.
pub fn build_vertices(
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    tex_coords: &[[f32; 2]],
) -> Option<Vec<Vertex>> {
    if normals.len() != positions.len() || tex_coords.len() != positions.len() {
        return None;
    }
    let vertices = positions
        .iter()
        .zip(normals)
        .zip(tex_coords)
        .map(|((p, n), t)| Vertex {
            position: glm::vec3(p[0], p[1], p[2]),
            normal: glm::vec3(n[0], n[1], n[2]),
            tex_coords: glm::vec2(t[0], t[1]),
        })
        .collect();
    Some(vertices)
}

pub fn indices_fit(indices: &[u32], vertex_count: usize) -> bool {
    indices.iter().all(|&i| (i as usize) < vertex_count)
}

/// Linear `[0, 1]` RGBA factor as texel bytes.
pub fn color_bytes(factor: [f32; 4]) -> [u8; 4] {
    factor.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Every triangle primitive of a glTF file, uploaded once per mesh and drawn
/// at each node that references it.
#[derive(Debug)]
pub struct Model {
    /// Indexed by glTF mesh index; meshes no node draws stay empty.
    meshes: Vec<Vec<Mesh>>,
    placements: Vec<Placement>,
    textures: Vec<gl::types::GLuint>,
}

impl Model {
    pub fn load(gl: &gl::Gl, path: &Path) -> Result<Self, AssetError> {
        let (document, buffers, images) =
            gltf::import(path).map_err(|source| AssetError::Gltf {
                path: path.to_path_buf(),
                source,
            })?;

        let nodes: Vec<NodeInfo> = document
            .nodes()
            .map(|node| NodeInfo {
                mesh: node.mesh().map(|mesh| mesh.index()),
                matrix: node.transform().matrix(),
                children: node.children().map(|child| child.index()).collect(),
            })
            .collect();
        let scene = document.default_scene().or_else(|| document.scenes().next());
        let mut placements = match scene {
            Some(scene) => {
                let roots: Vec<usize> = scene.nodes().map(|node| node.index()).collect();
                place_meshes(&nodes, &roots)
            }
            // No scene at all: draw every mesh where it was modelled.
            None => document
                .meshes()
                .map(|mesh| Placement {
                    mesh: mesh.index(),
                    local: identity(),
                })
                .collect(),
        };

        let mut textures = Vec::new();
        let mut uploaded: Vec<Option<gl::types::GLuint>> = vec![None; images.len()];
        let mut texture_for = |index: usize, textures: &mut Vec<gl::types::GLuint>| {
            if let Some(id) = uploaded[index] {
                return Some(id);
            }
            match upload_image(gl, &images[index]) {
                Ok(id) => {
                    textures.push(id);
                    uploaded[index] = Some(id);
                    Some(id)
                }
                Err(err) => {
                    tracing::warn!("Texture {index} of {} failed to load: {err}", path.display());
                    None
                }
            }
        };

        let mut solid: HashMap<[u8; 4], gl::types::GLuint> = HashMap::new();
        let mut solid_color = |rgba: [u8; 4], textures: &mut Vec<gl::types::GLuint>| {
            *solid.entry(rgba).or_insert_with(|| {
                let id = texture::upload_2d(
                    gl,
                    &Pixels {
                        width: 1,
                        height: 1,
                        format: gl::RGBA,
                        data: &rgba,
                    },
                );
                textures.push(id);
                id
            })
        };

        let mut meshes: Vec<Vec<Mesh>> = document.meshes().map(|_| Vec::new()).collect();
        for mesh in document.meshes() {
            if !placements.iter().any(|p| p.mesh == mesh.index()) {
                continue;
            }
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    continue;
                }
                let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

                let Some(positions) = reader.read_positions() else {
                    continue;
                };
                let positions: Vec<[f32; 3]> = positions.collect();
                let normals: Vec<[f32; 3]> = reader
                    .read_normals()
                    .map(|n| n.collect())
                    .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; positions.len()]);
                let tex_coords: Vec<[f32; 2]> = reader
                    .read_tex_coords(0)
                    .map(|t| t.into_f32().collect())
                    .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);
                let indices: Vec<u32> = reader
                    .read_indices()
                    .map(|i| i.into_u32().collect())
                    .unwrap_or_else(|| (0..positions.len() as u32).collect());

                let Some(vertices) = build_vertices(&positions, &normals, &tex_coords) else {
                    tracing::warn!(
                        "Skipping primitive {} of mesh {} in {}: {} positions, {} normals, {} uvs",
                        primitive.index(),
                        mesh.index(),
                        path.display(),
                        positions.len(),
                        normals.len(),
                        tex_coords.len()
                    );
                    continue;
                };
                if !indices_fit(&indices, vertices.len()) {
                    tracing::warn!(
                        "Skipping primitive {} of mesh {} in {}: index past {} vertices",
                        primitive.index(),
                        mesh.index(),
                        path.display(),
                        vertices.len()
                    );
                    continue;
                }

                let pbr = primitive.material().pbr_metallic_roughness();
                // Materials without a usable colour map are drawn in their flat colour.
                let diffuse = pbr
                    .base_color_texture()
                    .and_then(|info| texture_for(info.texture().source().index(), &mut textures))
                    .unwrap_or_else(|| {
                        solid_color(color_bytes(pbr.base_color_factor()), &mut textures)
                    });
                // Materials without a specular map get a uniform mid-grey one.
                let specular = pbr
                    .metallic_roughness_texture()
                    .and_then(|info| texture_for(info.texture().source().index(), &mut textures))
                    .unwrap_or_else(|| solid_color([128, 128, 128, 255], &mut textures));

                meshes[mesh.index()].push(upload_mesh(gl, &vertices, &indices, diffuse, specular));
            }
        }

        placements.retain(|p| meshes.get(p.mesh).is_some_and(|m| !m.is_empty()));
        let primitive_count: usize = meshes.iter().map(Vec::len).sum();

        let model = Self {
            meshes,
            placements,
            textures,
        };
        if model.placements.is_empty() {
            model.delete(gl);
            return Err(AssetError::EmptyModel {
                path: path.to_path_buf(),
            });
        }

        tracing::info!(
            "Loaded {}: {} primitives at {} placements, {} textures",
            path.display(),
            primitive_count,
            model.placements.len(),
            model.textures.len()
        );

        Ok(model)
    }

    /// Draws every placement with `model = object * local`. Samplers are
    /// expected on `DIFFUSE_UNIT` and `SPECULAR_UNIT`.
    pub fn draw(&self, gl: &gl::Gl, model_location: gl::types::GLint, object: &glm::Mat4) {
        for placement in &self.placements {
            shader::set_mat4(gl, model_location, &compose(object, &placement.local));
            for mesh in &self.meshes[placement.mesh] {
                unsafe {
                    gl.ActiveTexture(gl::TEXTURE0 + DIFFUSE_UNIT);
                    gl.BindTexture(gl::TEXTURE_2D, mesh.diffuse);
                    gl.ActiveTexture(gl::TEXTURE0 + SPECULAR_UNIT);
                    gl.BindTexture(gl::TEXTURE_2D, mesh.specular);

                    gl.BindVertexArray(mesh.vao);
                    gl.DrawElements(
                        gl::TRIANGLES,
                        mesh.index_count,
                        gl::UNSIGNED_INT,
                        std::ptr::null(),
                    );
                }
            }
        }
        unsafe {
            gl.BindVertexArray(0);
            gl.ActiveTexture(gl::TEXTURE0);
        }
    }

    pub fn delete(&self, gl: &gl::Gl) {
        unsafe {
            for mesh in self.meshes.iter().flatten() {
                gl.DeleteVertexArrays(1, &mesh.vao);
                gl.DeleteBuffers(1, &mesh.vbo);
                gl.DeleteBuffers(1, &mesh.ebo);
            }
            gl.DeleteTextures(self.textures.len() as gl::types::GLsizei, self.textures.as_ptr());
        }
    }
}

fn upload_image(gl: &gl::Gl, image: &gltf::image::Data) -> Result<gl::types::GLuint, AssetError> {
    use gltf::image::Format;

    let format = match image.format {
        Format::R8 => gl::RED,
        Format::R8G8 => gl::RG,
        Format::R8G8B8 => gl::RGB,
        Format::R8G8B8A8 => gl::RGBA,
        other => return Err(AssetError::UnsupportedPixelFormat(format!("{other:?}"))),
    };

    Ok(texture::upload_2d(
        gl,
        &Pixels {
            width: image.width,
            height: image.height,
            format,
            data: &image.pixels,
        },
    ))
}

fn upload_mesh(
    gl: &gl::Gl,
    vertices: &[Vertex],
    indices: &[u32],
    diffuse: gl::types::GLuint,
    specular: gl::types::GLuint,
) -> Mesh {
    unsafe {
        let mut vao = 0;
        gl.GenVertexArrays(1, &mut vao);
        gl.BindVertexArray(vao);

        let mut vbo = 0;
        gl.GenBuffers(1, &mut vbo);
        gl.BindBuffer(gl::ARRAY_BUFFER, vbo);
        gl.BufferData(
            gl::ARRAY_BUFFER,
            size_of_val(vertices) as gl::types::GLsizeiptr,
            vertices.as_ptr().cast(),
            gl::STATIC_DRAW,
        );

        let mut ebo = 0;
        gl.GenBuffers(1, &mut ebo);
        gl.BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ebo);
        gl.BufferData(
            gl::ELEMENT_ARRAY_BUFFER,
            size_of_val(indices) as gl::types::GLsizeiptr,
            indices.as_ptr().cast(),
            gl::STATIC_DRAW,
        );

        let stride = size_of::<Vertex>() as gl::types::GLsizei;
        let attributes = [
            (0, 3, offset_of!(Vertex, position)),
            (1, 3, offset_of!(Vertex, normal)),
            (2, 2, offset_of!(Vertex, tex_coords)),
        ];
        for (index, components, offset) in attributes {
            gl.EnableVertexAttribArray(index);
            gl.VertexAttribPointer(
                index,
                components,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const _,
            );
        }

        gl.BindVertexArray(0);

        Mesh {
            vao,
            vbo,
            ebo,
            index_count: indices.len() as gl::types::GLsizei,
            diffuse,
            specular,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY: [[f32; 4]; 4] = [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ];

    fn shifted(x: f32, y: f32, z: f32) -> [[f32; 4]; 4] {
        let mut m = IDENTITY;
        m[3] = [x, y, z, 1.0];
        m
    }

    fn origin_of(placement: &Placement) -> glm::Vec4 {
        placement.local * glm::vec4(0.0, 0.0, 0.0, 1.0)
    }

    #[test]
    fn child_nodes_inherit_parent_transform() {
        // 0: car body at (1, 0, 0) with a wheel child one unit down.
        let nodes = vec![
            NodeInfo {
                mesh: Some(0),
                matrix: shifted(1.0, 0.0, 0.0),
                children: vec![1],
            },
            NodeInfo {
                mesh: Some(1),
                matrix: shifted(0.0, -1.0, 0.0),
                children: vec![],
            },
        ];

        let placements = place_meshes(&nodes, &[0]);
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[1].mesh, 1);
        let wheel = origin_of(&placements[1]);
        assert_eq!((wheel.x, wheel.y, wheel.z), (1.0, -1.0, 0.0));
    }

    #[test]
    fn shared_mesh_is_placed_once_per_node() {
        // A transform-only group holding two instances of mesh 3.
        let nodes = vec![
            NodeInfo {
                mesh: None,
                matrix: shifted(0.0, 0.0, 5.0),
                children: vec![1, 2],
            },
            NodeInfo {
                mesh: Some(3),
                matrix: shifted(-2.0, 0.0, 0.0),
                children: vec![],
            },
            NodeInfo {
                mesh: Some(3),
                matrix: shifted(2.0, 0.0, 0.0),
                children: vec![],
            },
        ];

        let placements = place_meshes(&nodes, &[0]);
        assert_eq!(placements.iter().filter(|p| p.mesh == 3).count(), 2);
        let left = origin_of(&placements[0]);
        let right = origin_of(&placements[1]);
        assert_eq!((left.x, left.z), (-2.0, 5.0));
        assert_eq!((right.x, right.z), (2.0, 5.0));
    }

    #[test]
    fn cyclic_or_dangling_children_terminate() {
        let nodes = vec![NodeInfo {
            mesh: Some(0),
            matrix: IDENTITY,
            children: vec![0, 9],
        }];
        assert_eq!(place_meshes(&nodes, &[0, 4]).len(), 1);
    }

    #[test]
    fn mismatched_attribute_counts_are_rejected() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals = [[0.0, 0.0, 1.0]; 3];

        assert!(build_vertices(&positions, &normals, &[[0.0, 0.0]; 2]).is_none());
        assert!(build_vertices(&positions, &normals[..1], &[[0.0, 0.0]; 3]).is_none());

        let vertices = build_vertices(&positions, &normals, &[[0.5, 0.5]; 3]).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].position, glm::vec3(1.0, 0.0, 0.0));
        assert_eq!(vertices[2].tex_coords, glm::vec2(0.5, 0.5));
    }

    #[test]
    fn indices_must_stay_inside_the_vertex_buffer() {
        assert!(indices_fit(&[0, 1, 2, 2, 1, 0], 3));
        assert!(!indices_fit(&[0, 1, 3], 3));
        assert!(indices_fit(&[], 0));
    }

    #[test]
    fn color_factor_becomes_texel_bytes() {
        assert_eq!(color_bytes([1.0, 0.5, 0.0, 1.0]), [255, 128, 0, 255]);
        assert_eq!(color_bytes([1.7, -0.2, 0.2, 0.0]), [255, 0, 51, 0]);
    }
}
