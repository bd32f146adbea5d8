//! Static vertex data uploaded once at startup.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::device::capture_errors;
use crate::error::{InitError, Resource};
use crate::shader::InputElement;

/// Vertex with a single position attribute.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

    /// Input layout of the vertex stream.
    pub const ELEMENTS: [InputElement; 1] = [InputElement {
        semantic: "POSITION",
        location: 0,
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
    }];

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z] }
    }
}

/// The one triangle, in normalized device coordinates.
pub const TRIANGLE: [Vertex; 3] = [
    Vertex::new(0.0, 0.5, 0.5),
    Vertex::new(0.5, -0.5, 0.5),
    Vertex::new(-0.5, -0.5, 0.5),
];

/// Arguments of a non-indexed draw.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DrawCall {
    pub vertices: Range<u32>,
    pub instances: Range<u32>,
}

impl DrawCall {
    /// Draws `count` vertices starting at vertex 0, one instance.
    pub fn covering(count: u32) -> Self {
        Self {
            vertices: 0..count,
            instances: 0..1,
        }
    }
}

/// Immutable GPU vertex buffer.
///
/// Created with `VERTEX` usage only: filled once while mapped at creation,
/// no CPU access and no uploads afterwards.
pub struct GeometryBuffer {
    buffer: wgpu::Buffer,
    vertex_count: u32,
    stride: u64,
    offset: u64,
}

impl GeometryBuffer {
    /// Uploads `TRIANGLE`.
    pub fn initialize(device: &wgpu::Device) -> Result<Self, InitError> {
        Self::from_vertices(device, &TRIANGLE)
    }

    pub fn from_vertices(device: &wgpu::Device, vertices: &[Vertex]) -> Result<Self, InitError> {
        let vertex_count = checked_vertex_count(vertices)?;
        let contents: &[u8] = bytemuck::cast_slice(vertices);

        // Mapped ranges of an invalid buffer abort, so the buffer is checked
        // before anything is written into it.
        let buffer = capture_errors(device, || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("trigon vertex buffer"),
                size: padded_size(contents.len()),
                usage: wgpu::BufferUsages::VERTEX,
                mapped_at_creation: true,
            })
        })
        .map_err(|e| InitError::resource(Resource::VertexBuffer, e.to_string()))?;

        buffer.slice(..).get_mapped_range_mut()[..contents.len()].copy_from_slice(contents);
        buffer.unmap();

        log::debug!("uploaded {vertex_count} vertices ({} bytes)", buffer.size());

        Ok(Self {
            buffer,
            vertex_count,
            stride: Vertex::STRIDE,
            offset: 0,
        })
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Vertex stream to bind at slot 0.
    pub fn slice(&self) -> wgpu::BufferSlice<'_> {
        self.buffer.slice(self.offset..)
    }

    /// Draw covering every vertex in the buffer.
    pub fn draw_call(&self) -> DrawCall {
        DrawCall::covering(self.vertex_count)
    }
}

/// Mapped-at-creation sizes must be a non-zero multiple of `COPY_BUFFER_ALIGNMENT`.
fn padded_size(len: usize) -> u64 {
    let align = wgpu::COPY_BUFFER_ALIGNMENT;
    (len as u64).div_ceil(align).max(1) * align
}

fn checked_vertex_count(vertices: &[Vertex]) -> Result<u32, InitError> {
    if vertices.is_empty() {
        return Err(InitError::resource(Resource::VertexBuffer, "no vertices"));
    }
    u32::try_from(vertices.len()).map_err(|_| {
        InitError::resource(
            Resource::VertexBuffer,
            format!("{} vertices exceed a single draw", vertices.len()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::headless;

    #[test]
    fn triangle_has_three_vertices_and_draws_all_of_them() {
        let count = checked_vertex_count(&TRIANGLE).unwrap();
        assert_eq!(count, 3);

        let draw = DrawCall::covering(count);
        assert_eq!(draw.vertices, 0..3);
        assert_eq!(draw.instances, 0..1);
        assert_eq!(draw.vertices.len(), TRIANGLE.len());
    }

    #[test]
    fn vertex_is_three_packed_floats() {
        assert_eq!(Vertex::STRIDE, 12);
        assert_eq!(bytemuck::cast_slice::<Vertex, u8>(&TRIANGLE).len(), 36);

        let el = Vertex::ELEMENTS[0];
        assert_eq!(el.offset + el.format.size(), Vertex::STRIDE);
    }

    #[test]
    fn triangle_lies_in_clip_space() {
        for v in TRIANGLE {
            assert!(v.position[0].abs() <= 1.0 && v.position[1].abs() <= 1.0);
            assert!((0.0..=1.0).contains(&v.position[2]));
        }
    }

    #[test]
    fn mapped_size_is_aligned() {
        assert_eq!(padded_size(36), 36);
        assert_eq!(padded_size(6), 8);
        assert_eq!(padded_size(0), 4);
    }

    #[test]
    fn uploaded_triangle_draws_its_three_vertices() {
        let Some((device, _queue)) = headless::device() else { return };

        let geometry = GeometryBuffer::initialize(&device).unwrap();
        assert_eq!(geometry.vertex_count(), 3);
        assert_eq!(geometry.stride(), 12);
        assert_eq!(geometry.offset(), 0);
        assert_eq!(geometry.draw_call().vertices, 0..3);
        assert_eq!(geometry.draw_call().instances, 0..1);
    }

    #[test]
    fn oversized_buffer_is_a_vertex_buffer_failure() {
        let Some((device, _queue)) = headless::device_with(|limits| wgpu::Limits {
            max_buffer_size: 1024,
            max_uniform_buffer_binding_size: limits.max_uniform_buffer_binding_size.min(1024),
            max_storage_buffer_binding_size: limits.max_storage_buffer_binding_size.min(1024),
            ..limits
        }) else {
            return;
        };

        // 100 vertices are 1200 bytes.
        let err = GeometryBuffer::from_vertices(&device, &[Vertex::new(0.0, 0.0, 0.0); 100])
            .err()
            .expect("buffer above max_buffer_size is refused");
        assert!(matches!(
            err,
            InitError::ResourceCreation { resource: Resource::VertexBuffer, .. }
        ));
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let err = checked_vertex_count(&[]).unwrap_err();
        assert!(matches!(
            err,
            InitError::ResourceCreation { resource: Resource::VertexBuffer, .. }
        ));
    }
}
