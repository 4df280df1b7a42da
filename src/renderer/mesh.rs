//! Mesh and vertex definitions, plus the primitive shapes the scene is built from

use std::f32::consts::TAU;
use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use smallvec::SmallVec;

/// Segments around the circumference of the cylinder meshes
pub const CYLINDER_SEGMENTS: u32 = 36;

/// Top radius of the tapered cylinder; its bottom radius is 1
pub const TAPERED_TOP_RADIUS: f32 = 0.5;

/// Vertex with position, normal, and UV coordinates
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// Get the vertex buffer layout for wgpu
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Normal
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // UV
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Which pieces of a cylinder to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeParts {
    pub top: bool,
    pub bottom: bool,
    pub sides: bool,
}

impl ShapeParts {
    /// Caps and sides
    pub const ALL: Self = Self::new(true, true, true);

    pub const fn new(top: bool, bottom: bool, sides: bool) -> Self {
        Self { top, bottom, sides }
    }
}

impl Default for ShapeParts {
    fn default() -> Self {
        Self::ALL
    }
}

/// Index ranges of the separately drawable pieces of a cylinder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CylinderSections {
    pub top: Range<u32>,
    pub bottom: Range<u32>,
    pub sides: Range<u32>,
}

/// A 3D mesh with vertices and indices
#[derive(Debug)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Cap/side index ranges for cylinder meshes
    pub sections: Option<CylinderSections>,
    /// GPU vertex buffer (created when uploaded)
    pub(crate) vertex_buffer: Option<wgpu::Buffer>,
    /// GPU index buffer (created when uploaded)
    pub(crate) index_buffer: Option<wgpu::Buffer>,
}

impl Mesh {
    /// Create a mesh from vertices and indices
    pub fn from_data(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            sections: None,
            vertex_buffer: None,
            index_buffer: None,
        }
    }

    /// Create a plane on the XZ axis facing +Y
    pub fn plane(size: f32) -> Self {
        let half = size / 2.0;
        let vertices = vec![
            Vertex::new([-half, 0.0, half], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex::new([half, 0.0, half], [0.0, 1.0, 0.0], [1.0, 0.0]),
            Vertex::new([half, 0.0, -half], [0.0, 1.0, 0.0], [1.0, 1.0]),
            Vertex::new([-half, 0.0, -half], [0.0, 1.0, 0.0], [0.0, 1.0]),
        ];

        let indices = vec![0, 1, 2, 2, 3, 0];

        Self::from_data(vertices, indices)
    }

    /// Create a capped cylinder standing on Y = 0 and reaching Y = 1
    pub fn cylinder(segments: u32) -> Self {
        Self::frustum(1.0, 1.0, segments)
    }

    /// Create a cylinder whose top radius is [`TAPERED_TOP_RADIUS`]
    pub fn tapered_cylinder(segments: u32) -> Self {
        Self::frustum(1.0, TAPERED_TOP_RADIUS, segments)
    }

    /// Capped conical frustum of height 1 with the base on Y = 0.
    ///
    /// Indices are laid out top cap, bottom cap, sides so each piece is one
    /// contiguous range. Triangles wind counter-clockwise seen from outside.
    fn frustum(bottom_radius: f32, top_radius: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        push_cap(&mut vertices, &mut indices, top_radius, 1.0, 1.0, segments);
        let top_end = indices.len() as u32;
        push_cap(&mut vertices, &mut indices, bottom_radius, 0.0, -1.0, segments);
        let bottom_end = indices.len() as u32;

        // Side normals tilt by the radius change over the unit height
        let slope = bottom_radius - top_radius;
        let side_start = vertices.len() as u32;
        for segment in 0..=segments {
            let (bottom, cos, sin) = ring_point(bottom_radius, 0.0, segment, segments);
            let (top, _, _) = ring_point(top_radius, 1.0, segment, segments);
            let normal = Vec3::new(cos, slope, sin).normalize();
            let u = segment as f32 / segments as f32;
            vertices.push(Vertex::new(bottom, normal.into(), [u, 0.0]));
            vertices.push(Vertex::new(top, normal.into(), [u, 1.0]));
        }
        for segment in 0..segments {
            let b0 = side_start + segment * 2;
            let t0 = b0 + 1;
            let b1 = b0 + 2;
            let t1 = b0 + 3;
            indices.extend_from_slice(&[b0, t0, b1, b1, t0, t1]);
        }
        let sides_end = indices.len() as u32;

        let mut mesh = Self::from_data(vertices, indices);
        mesh.sections = Some(CylinderSections {
            top: 0..top_end,
            bottom: top_end..bottom_end,
            sides: bottom_end..sides_end,
        });
        mesh
    }

    /// Get the number of indices
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Index ranges to draw for `parts`; meshes without sections draw whole
    pub fn index_ranges(&self, parts: ShapeParts) -> SmallVec<[Range<u32>; 3]> {
        let mut ranges = SmallVec::new();
        match &self.sections {
            None => ranges.push(0..self.index_count()),
            Some(sections) => {
                if parts.top {
                    ranges.push(sections.top.clone());
                }
                if parts.bottom {
                    ranges.push(sections.bottom.clone());
                }
                if parts.sides {
                    ranges.push(sections.sides.clone());
                }
            }
        }
        ranges
    }

    /// Check if the mesh has been uploaded to GPU
    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some() && self.index_buffer.is_some()
    }
}

/// Point on a horizontal ring, with the cosine and sine of its angle
fn ring_point(radius: f32, y: f32, segment: u32, segments: u32) -> ([f32; 3], f32, f32) {
    let theta = TAU * segment as f32 / segments as f32;
    let (sin, cos) = theta.sin_cos();
    ([radius * cos, y, radius * sin], cos, sin)
}

/// Triangle fan cap: a center vertex followed by a ring with radial UVs
fn push_cap(
    vertices: &mut Vec<Vertex>,
    indices: &mut Vec<u32>,
    radius: f32,
    y: f32,
    normal_y: f32,
    segments: u32,
) {
    let normal = [0.0, normal_y, 0.0];
    let center = vertices.len() as u32;
    vertices.push(Vertex::new([0.0, y, 0.0], normal, [0.5, 0.5]));
    for segment in 0..=segments {
        let (position, cos, sin) = ring_point(radius, y, segment, segments);
        vertices.push(Vertex::new(position, normal, [0.5 + 0.5 * cos, 0.5 + 0.5 * sin]));
    }
    for segment in 0..segments {
        let current = center + 1 + segment;
        let next = current + 1;
        if normal_y > 0.0 {
            indices.extend_from_slice(&[center, next, current]);
        } else {
            indices.extend_from_slice(&[center, current, next]);
        }
    }
}

/// Primitive shapes available to the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// 2×2 plane on XZ
    Plane,
    /// Unit-radius cylinder of height 1
    Cylinder,
    /// Cylinder narrowing to half radius at the top
    TaperedCylinder,
}

/// One shared mesh per [`Shape`], however often it is drawn
#[derive(Debug)]
pub struct ShapeMeshes {
    plane: Mesh,
    cylinder: Mesh,
    tapered_cylinder: Mesh,
}

impl ShapeMeshes {
    /// Build the CPU-side meshes
    pub fn new() -> Self {
        Self {
            plane: Mesh::plane(2.0),
            cylinder: Mesh::cylinder(CYLINDER_SEGMENTS),
            tapered_cylinder: Mesh::tapered_cylinder(CYLINDER_SEGMENTS),
        }
    }

    /// Mesh for a shape
    pub fn get(&self, shape: Shape) -> &Mesh {
        match shape {
            Shape::Plane => &self.plane,
            Shape::Cylinder => &self.cylinder,
            Shape::TaperedCylinder => &self.tapered_cylinder,
        }
    }

    /// All meshes, for uploading
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Mesh> {
        [
            &mut self.plane,
            &mut self.cylinder,
            &mut self.tapered_cylinder,
        ]
        .into_iter()
    }
}

impl Default for ShapeMeshes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_normal(mesh: &Mesh, tri: &[u32]) -> Vec3 {
        let a = Vec3::from(mesh.vertices[tri[0] as usize].position);
        let b = Vec3::from(mesh.vertices[tri[1] as usize].position);
        let c = Vec3::from(mesh.vertices[tri[2] as usize].position);
        (b - a).cross(c - a)
    }

    #[test]
    fn test_plane_faces_up() {
        let mesh = Mesh::plane(2.0);
        assert_eq!(mesh.index_count(), 6);
        for tri in mesh.indices.chunks(3) {
            assert!(triangle_normal(&mesh, tri).y > 0.0);
        }
        let xs: Vec<f32> = mesh.vertices.iter().map(|v| v.position[0]).collect();
        assert!(xs.iter().all(|x| x.abs() == 1.0));
    }

    #[test]
    fn test_cylinder_sections_are_disjoint_and_cover_all() {
        let mesh = Mesh::cylinder(CYLINDER_SEGMENTS);
        let sections = mesh.sections.clone().unwrap();
        assert_eq!(sections.top.start, 0);
        assert_eq!(sections.top.end, sections.bottom.start);
        assert_eq!(sections.bottom.end, sections.sides.start);
        assert_eq!(sections.sides.end, mesh.index_count());
        assert_eq!(sections.top.len() as u32, CYLINDER_SEGMENTS * 3);
        assert_eq!(sections.sides.len() as u32, CYLINDER_SEGMENTS * 6);
    }

    #[test]
    fn test_caps_wind_outward() {
        let mesh = Mesh::cylinder(12);
        let sections = mesh.sections.clone().unwrap();
        let top = &mesh.indices[sections.top.start as usize..sections.top.end as usize];
        for tri in top.chunks(3) {
            assert!(triangle_normal(&mesh, tri).y > 0.0);
            assert_eq!(mesh.vertices[tri[0] as usize].normal, [0.0, 1.0, 0.0]);
        }
        let bottom = &mesh.indices[sections.bottom.start as usize..sections.bottom.end as usize];
        for tri in bottom.chunks(3) {
            assert!(triangle_normal(&mesh, tri).y < 0.0);
            assert_eq!(mesh.vertices[tri[0] as usize].normal, [0.0, -1.0, 0.0]);
        }
    }

    #[test]
    fn test_sides_wind_outward() {
        let mesh = Mesh::tapered_cylinder(16);
        let sections = mesh.sections.clone().unwrap();
        let sides = &mesh.indices[sections.sides.start as usize..sections.sides.end as usize];
        for tri in sides.chunks(3) {
            let a = Vec3::from(mesh.vertices[tri[0] as usize].position);
            let outward = Vec3::new(a.x, 0.0, a.z);
            assert!(triangle_normal(&mesh, tri).dot(outward) > 0.0);
        }
    }

    #[test]
    fn test_tapered_radii() {
        let mesh = Mesh::tapered_cylinder(CYLINDER_SEGMENTS);
        let radius_at = |y: f32| {
            mesh.vertices
                .iter()
                .filter(|v| v.position[1] == y)
                .map(|v| Vec3::new(v.position[0], 0.0, v.position[2]).length())
                .fold(0.0_f32, f32::max)
        };
        assert!((radius_at(0.0) - 1.0).abs() < 1e-5);
        assert!((radius_at(1.0) - TAPERED_TOP_RADIUS).abs() < 1e-5);
    }

    #[test]
    fn test_tapered_side_normals_tilt_up() {
        let mesh = Mesh::tapered_cylinder(8);
        let sections = mesh.sections.clone().unwrap();
        let first_side = mesh.indices[sections.sides.start as usize] as usize;
        let normal = Vec3::from(mesh.vertices[first_side].normal);
        assert!((normal.length() - 1.0).abs() < 1e-5);
        assert!(normal.y > 0.0);
    }

    #[test]
    fn test_index_ranges_follow_parts() {
        let mesh = Mesh::cylinder(8);
        let sections = mesh.sections.clone().unwrap();

        let only_top = mesh.index_ranges(ShapeParts::new(true, false, false));
        assert_eq!(only_top.as_slice(), &[sections.top.clone()]);

        let rim = mesh.index_ranges(ShapeParts::new(false, true, true));
        assert_eq!(rim.as_slice(), &[sections.bottom.clone(), sections.sides.clone()]);

        assert_eq!(mesh.index_ranges(ShapeParts::ALL).len(), 3);
        assert!(mesh.index_ranges(ShapeParts::new(false, false, false)).is_empty());
    }

    #[test]
    fn test_plane_ignores_parts() {
        let mesh = Mesh::plane(2.0);
        let ranges = mesh.index_ranges(ShapeParts::new(false, false, false));
        assert_eq!(ranges.as_slice(), &[0..6]);
    }

    #[test]
    fn test_shape_meshes_lookup() {
        let shapes = ShapeMeshes::new();
        assert!(shapes.get(Shape::Plane).sections.is_none());
        assert!(shapes.get(Shape::Cylinder).sections.is_some());
        assert!(!shapes.get(Shape::TaperedCylinder).is_uploaded());
    }
}
