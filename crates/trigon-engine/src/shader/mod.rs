//! Shader compilation and the render pipeline built from it.
//!
//! WGSL is compiled and validated on the CPU first (naga), so a bad or
//! missing shader file is reported as a shader failure before any GPU
//! object is created from it.

mod compile;
mod layout;

pub use compile::{
    compile_file, compile_source, CompiledShader, PIXEL_ENTRY, SHADER_CAPABILITIES, SHADER_PATH,
    VERTEX_ENTRY,
};
pub use layout::{InputElement, InputLayout};

use std::path::Path;

use crate::device::capture_errors;
use crate::error::{InitError, Resource};
use crate::geometry::Vertex;

/// Vertex + pixel shaders, their input layout and the pipeline combining them.
///
/// Immutable after creation.
pub struct ShaderPipeline {
    vertex_shader: wgpu::ShaderModule,
    pixel_shader: wgpu::ShaderModule,
    input_layout: InputLayout,
    pipeline: wgpu::RenderPipeline,
}

impl ShaderPipeline {
    /// Compiles both entry points from the file at `path` and builds the pipeline
    /// for render targets of `target_format`.
    ///
    /// Nothing is created on the GPU unless the file compiles.
    pub fn initialize(
        path: &Path,
        gpu: &wgpu::Device,
        target_format: wgpu::TextureFormat,
    ) -> Result<Self, InitError> {
        let compiled = compile_file(path)?;

        let input_layout =
            InputLayout::derive(&compiled.module, VERTEX_ENTRY, &Vertex::ELEMENTS, Vertex::STRIDE)?;

        let vertex_shader = capture_errors(gpu, || {
            gpu.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("trigon vertex shader"),
                source: wgpu::ShaderSource::Wgsl(compiled.source.as_str().into()),
            })
        })
        .map_err(|e| InitError::resource(Resource::VertexShader, e.to_string()))?;

        let pixel_shader = capture_errors(gpu, || {
            gpu.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("trigon pixel shader"),
                source: wgpu::ShaderSource::Wgsl(compiled.source.as_str().into()),
            })
        })
        .map_err(|e| InitError::resource(Resource::PixelShader, e.to_string()))?;

        // The pipeline is where the vertex layout meets the vertex stage.
        let pipeline = capture_errors(gpu, || {
            build_pipeline(gpu, &vertex_shader, &pixel_shader, &input_layout, target_format)
        })
        .map_err(|e| InitError::resource(Resource::InputLayout, e.to_string()))?;

        log::info!(
            "shader pipeline ready: `{}` ({VERTEX_ENTRY}/{PIXEL_ENTRY})",
            compiled.path.display()
        );

        Ok(Self {
            vertex_shader,
            pixel_shader,
            input_layout,
            pipeline,
        })
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn input_layout(&self) -> &InputLayout {
        &self.input_layout
    }

    pub fn vertex_shader(&self) -> &wgpu::ShaderModule {
        &self.vertex_shader
    }

    pub fn pixel_shader(&self) -> &wgpu::ShaderModule {
        &self.pixel_shader
    }
}

fn build_pipeline(
    gpu: &wgpu::Device,
    vertex_shader: &wgpu::ShaderModule,
    pixel_shader: &wgpu::ShaderModule,
    input_layout: &InputLayout,
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let pipeline_layout = gpu.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("trigon pipeline layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });

    gpu.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("trigon triangle pipeline"),
        layout: Some(&pipeline_layout),

        vertex: wgpu::VertexState {
            module: vertex_shader,
            entry_point: Some(VERTEX_ENTRY),
            compilation_options: Default::default(),
            buffers: &[input_layout.buffer_layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: pixel_shader,
            entry_point: Some(PIXEL_ENTRY),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Cw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::device::headless;

    fn shipped_shader() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").join(SHADER_PATH)
    }

    #[test]
    fn shipped_shader_builds_a_pipeline() {
        let Some((device, _queue)) = headless::device() else { return };

        let shaders =
            ShaderPipeline::initialize(&shipped_shader(), &device, wgpu::TextureFormat::Rgba8Unorm)
                .unwrap();
        assert_eq!(shaders.input_layout().stride(), Vertex::STRIDE);
    }

    #[test]
    fn missing_file_fails_before_any_gpu_object() {
        let Some((device, _queue)) = headless::device() else { return };

        let err = ShaderPipeline::initialize(
            Path::new("shaders/does-not-exist.wgsl"),
            &device,
            wgpu::TextureFormat::Rgba8Unorm,
        )
        .err()
        .expect("missing shader file is refused");
        assert!(matches!(err, InitError::ShaderCompilation { .. }));
    }

    #[test]
    fn unrenderable_target_is_a_pipeline_failure() {
        let Some((device, _queue)) = headless::device() else { return };

        // Shared-exponent formats cannot be render targets.
        let err = ShaderPipeline::initialize(
            &shipped_shader(),
            &device,
            wgpu::TextureFormat::Rgb9e5Ufloat,
        )
        .err()
        .expect("pipeline with an unrenderable target is refused");
        assert!(matches!(
            err,
            InitError::ResourceCreation { resource: Resource::InputLayout, .. }
        ));
    }
}
