//! Triangle geometry, loading it from OBJ files and uploading it to the GPU.

use std::path::Path;

use anyhow::Result;
use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::{Buffer, Camera, DefaultAllocator, Device, Error, GraphicsCmdBuffer};

/// Interleaved vertex as read by the scene pipeline, locations 0 to 3.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    /// Size of a vertex in bytes.
    pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;
}

/// Something that records its own draw commands. Vertex and index buffers are bound by the drawable itself.
pub trait Drawable {
    fn draw<C: GraphicsCmdBuffer>(&self, cmd: C) -> Result<C>;
}

/// Indexed triangle list in host memory. Front faces are wound counter-clockwise around their outward normal.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// A single triangle facing up.
    pub fn triangle() -> Self {
        let mut geometry = Self::default();
        let normal = Camera::up();
        let color = [1.0, 1.0, 1.0];
        for (position, uv) in [
            ([-1.0, 0.0, -1.0], [0.0, 0.0]),
            ([1.0, 0.0, -1.0], [1.0, 0.0]),
            ([0.0, 0.0, 1.0], [0.5, 1.0]),
        ] {
            geometry.vertices.push(Vertex {
                position,
                uv,
                color,
                normal: normal.to_array(),
            });
        }
        geometry.indices = vec![0, 1, 2];
        geometry
    }

    /// A ground plane with a few boxes standing on it.
    pub fn demo_scene() -> Self {
        let mut geometry = Self::default();
        geometry.quad(Vec3::new(-20.0, 0.0, -20.0), Vec3::X * 40.0, Vec3::Z * 40.0, Vec3::splat(0.6));
        geometry.cuboid(Vec3::new(-4.0, -3.0, -4.0), Vec3::new(1.5, 3.0, 1.5), Vec3::new(0.8, 0.2, 0.2));
        geometry.cuboid(Vec3::new(3.0, -1.5, -1.0), Vec3::new(1.5, 1.5, 1.5), Vec3::new(0.2, 0.7, 0.3));
        geometry.cuboid(Vec3::new(-1.0, -1.0, 4.0), Vec3::new(2.5, 1.0, 1.0), Vec3::new(0.2, 0.3, 0.8));
        geometry.cuboid(Vec3::new(5.0, -5.0, 5.0), Vec3::new(0.75, 5.0, 0.75), Vec3::new(0.9, 0.8, 0.3));
        geometry
    }

    /// Load all models in an OBJ file. Files are expected to be Y-up, so positions and normals are mirrored into
    /// the Y-down world and the winding is reversed to keep front faces. Missing colors default to white and
    /// missing normals are computed per face.
    /// # Errors
    /// Fails with [`Error::ModelLoad`] if the file cannot be parsed, or [`Error::EmptyGeometry`] if it holds no
    /// triangles.
    pub fn from_obj(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (models, _materials) = tobj::load_obj(path, &options).map_err(|err| Error::ModelLoad {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        let mut geometry = Self::default();
        for model in &models {
            geometry.append_obj_mesh(&model.mesh);
        }
        geometry.validate().map_err(|err| match err {
            Error::Uncategorized(reason) => Error::ModelLoad {
                path: path.to_path_buf(),
                reason: reason.to_string(),
            },
            other => other,
        })?;
        info!(
            "Loaded {} models from {} ({} vertices, {} triangles)",
            models.len(),
            path.display(),
            geometry.vertices.len(),
            geometry.triangle_count()
        );
        Ok(geometry)
    }

    fn append_obj_mesh(&mut self, mesh: &tobj::Mesh) {
        let base = self.vertices.len() as u32;
        let count = mesh.positions.len() / 3;
        let has_normals = mesh.normals.len() == mesh.positions.len();
        for i in 0..count {
            let read3 = |data: &[f32], default: [f32; 3]| {
                data.get(3 * i..3 * i + 3)
                    .map(|v| [v[0], v[1], v[2]])
                    .unwrap_or(default)
            };
            let [x, y, z] = read3(&mesh.positions, [0.0; 3]);
            let [nx, ny, nz] = read3(&mesh.normals, [0.0; 3]);
            let uv = mesh
                .texcoords
                .get(2 * i..2 * i + 2)
                .map(|t| [t[0], 1.0 - t[1]])
                .unwrap_or([0.0, 0.0]);
            self.vertices.push(Vertex {
                position: [x, -y, z],
                uv,
                color: read3(&mesh.vertex_color, [1.0; 3]),
                normal: [nx, -ny, nz],
            });
        }
        for triangle in mesh.indices.chunks_exact(3) {
            self.indices
                .extend_from_slice(&[base + triangle[0], base + triangle[2], base + triangle[1]]);
        }
        if !has_normals {
            self.compute_face_normals(base as usize);
        }
    }

    /// Accumulate face normals into the vertices starting at `first_vertex`.
    fn compute_face_normals(&mut self, first_vertex: usize) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len() - first_vertex];
        for triangle in self.indices.chunks_exact(3) {
            if triangle.iter().any(|&index| (index as usize) < first_vertex) {
                continue;
            }
            let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| Vec3::from(self.vertices[i as usize].position));
            let normal = (b - a).cross(c - a);
            for &index in triangle {
                normals[index as usize - first_vertex] += normal;
            }
        }
        for (vertex, normal) in self.vertices[first_vertex..].iter_mut().zip(normals) {
            vertex.normal = normal.normalize_or_zero().to_array();
        }
    }

    /// Add a quad spanned by `u` and `v` from `origin`. The front face looks along `u x v`.
    fn quad(&mut self, origin: Vec3, u: Vec3, v: Vec3, color: Vec3) {
        let base = self.vertices.len() as u32;
        let normal = u.cross(v).normalize().to_array();
        for (corner, uv) in [
            (origin, [0.0, 0.0]),
            (origin + u, [1.0, 0.0]),
            (origin + u + v, [1.0, 1.0]),
            (origin + v, [0.0, 1.0]),
        ] {
            self.vertices.push(Vertex {
                position: corner.to_array(),
                uv,
                color: color.to_array(),
                normal,
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Add an axis aligned box with outward facing sides.
    fn cuboid(&mut self, center: Vec3, half_extent: Vec3, color: Vec3) {
        let min = center - half_extent;
        let max = center + half_extent;
        let size = half_extent * 2.0;
        let (x, y, z) = (Vec3::X * size.x, Vec3::Y * size.y, Vec3::Z * size.z);
        self.quad(Vec3::new(max.x, min.y, min.z), y, z, color);
        self.quad(min, z, y, color);
        self.quad(Vec3::new(min.x, max.y, min.z), z, x, color);
        self.quad(min, x, z, color);
        self.quad(Vec3::new(min.x, min.y, max.z), x, y, color);
        self.quad(min, y, x, color);
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check that there is at least one triangle and every index refers to a vertex.
    pub fn validate(&self) -> std::result::Result<(), Error> {
        if self.indices.is_empty() || self.vertices.is_empty() {
            return Err(Error::EmptyGeometry);
        }
        if self.indices.len() % 3 != 0 {
            return Err(Error::Uncategorized("index count is not a multiple of three"));
        }
        if self.indices.iter().any(|&index| index as usize >= self.vertices.len()) {
            return Err(Error::Uncategorized("index refers to a vertex that does not exist"));
        }
        Ok(())
    }
}

/// Geometry uploaded into persistently mapped vertex and index buffers.
#[derive(Debug)]
pub struct Mesh {
    vertices: Buffer,
    indices: Buffer,
    index_count: u32,
}

impl Mesh {
    pub fn new(device: Device, alloc: &mut DefaultAllocator, geometry: &Geometry) -> Result<Self> {
        geometry.validate()?;
        let vertices = Buffer::with_data(device.clone(), alloc, &geometry.vertices, vk::BufferUsageFlags::VERTEX_BUFFER)?;
        let indices = Buffer::with_data(device, alloc, &geometry.indices, vk::BufferUsageFlags::INDEX_BUFFER)?;
        Ok(Self {
            vertices,
            indices,
            index_count: geometry.indices.len() as u32,
        })
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

impl Drawable for Mesh {
    fn draw<C: GraphicsCmdBuffer>(&self, cmd: C) -> Result<C> {
        cmd.bind_vertex_buffer(0, &self.vertices.view_full())?
            .bind_index_buffer(&self.indices.view_full(), vk::IndexType::UINT32)?
            .draw_indexed(self.index_count, 1, 0, 0, 0)
    }
}
