use naga::{Binding, Module, Scalar, ScalarKind, ShaderStage, TypeInner, VectorSize};

use crate::error::{InitError, Resource};

/// One attribute of the vertex buffer layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct InputElement {
    pub semantic: &'static str,
    pub location: u32,
    pub format: wgpu::VertexFormat,
    pub offset: u64,
}

/// Vertex buffer layout checked against a vertex entry point's inputs.
#[derive(Debug, Clone)]
pub struct InputLayout {
    attributes: Vec<wgpu::VertexAttribute>,
    stride: u64,
}

impl InputLayout {
    /// Binds `elements` to the inputs of `entry_point` in `module`.
    ///
    /// Every location the shader reads must be provided with the same format.
    /// Elements the shader ignores are kept in the layout.
    pub fn derive(
        module: &Module,
        entry_point: &str,
        elements: &[InputElement],
        stride: u64,
    ) -> Result<Self, InitError> {
        for (i, el) in elements.iter().enumerate() {
            if elements[..i].iter().any(|other| other.location == el.location) {
                return Err(layout_error(format!(
                    "location {} bound twice (`{}`)",
                    el.location, el.semantic
                )));
            }
            if el.offset + el.format.size() > stride {
                return Err(layout_error(format!(
                    "`{}` at offset {} overruns the {stride}-byte stride",
                    el.semantic, el.offset
                )));
            }
        }

        for (location, format) in shader_inputs(module, entry_point)? {
            let Some(el) = elements.iter().find(|el| el.location == location) else {
                return Err(layout_error(format!(
                    "`{entry_point}` reads location {location}, which the vertex layout does not provide"
                )));
            };
            if format != Some(el.format) {
                return Err(layout_error(format!(
                    "`{}` is {:?} but `{entry_point}` expects {format:?} at location {location}",
                    el.semantic, el.format
                )));
            }
        }

        let attributes = elements
            .iter()
            .map(|el| wgpu::VertexAttribute {
                format: el.format,
                offset: el.offset,
                shader_location: el.location,
            })
            .collect();

        Ok(Self { attributes, stride })
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn attributes(&self) -> &[wgpu::VertexAttribute] {
        &self.attributes
    }

    pub fn buffer_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

fn layout_error(message: String) -> InitError {
    InitError::resource(Resource::InputLayout, message)
}

/// Location-bound inputs of a vertex entry point, with their vertex format
/// (`None` for types a vertex buffer cannot feed).
fn shader_inputs(
    module: &Module,
    entry_point: &str,
) -> Result<Vec<(u32, Option<wgpu::VertexFormat>)>, InitError> {
    let Some(ep) = module
        .entry_points
        .iter()
        .find(|ep| ep.name == entry_point && ep.stage == ShaderStage::Vertex)
    else {
        return Err(layout_error(format!("no vertex entry point `{entry_point}`")));
    };

    let mut inputs = Vec::new();

    for arg in ep.function.arguments.iter() {
        match &arg.binding {
            Some(Binding::Location { location, .. }) => {
                inputs.push((*location, vertex_format(&module.types[arg.ty].inner)));
            }
            Some(_) => {}
            // Unbound arguments are structs whose members carry the bindings.
            None => {
                if let TypeInner::Struct { members, .. } = &module.types[arg.ty].inner {
                    for member in members {
                        if let Some(Binding::Location { location, .. }) = &member.binding {
                            inputs.push((*location, vertex_format(&module.types[member.ty].inner)));
                        }
                    }
                }
            }
        }
    }

    Ok(inputs)
}

fn vertex_format(inner: &TypeInner) -> Option<wgpu::VertexFormat> {
    use wgpu::VertexFormat as F;

    let (scalar, size) = match *inner {
        TypeInner::Scalar(scalar) => (scalar, None),
        TypeInner::Vector { size, scalar } => (scalar, Some(size)),
        _ => return None,
    };

    let Scalar { kind, width: 4 } = scalar else {
        return None;
    };

    let format = match (kind, size) {
        (ScalarKind::Float, None) => F::Float32,
        (ScalarKind::Float, Some(VectorSize::Bi)) => F::Float32x2,
        (ScalarKind::Float, Some(VectorSize::Tri)) => F::Float32x3,
        (ScalarKind::Float, Some(VectorSize::Quad)) => F::Float32x4,
        (ScalarKind::Sint, None) => F::Sint32,
        (ScalarKind::Sint, Some(VectorSize::Bi)) => F::Sint32x2,
        (ScalarKind::Sint, Some(VectorSize::Tri)) => F::Sint32x3,
        (ScalarKind::Sint, Some(VectorSize::Quad)) => F::Sint32x4,
        (ScalarKind::Uint, None) => F::Uint32,
        (ScalarKind::Uint, Some(VectorSize::Bi)) => F::Uint32x2,
        (ScalarKind::Uint, Some(VectorSize::Tri)) => F::Uint32x3,
        (ScalarKind::Uint, Some(VectorSize::Quad)) => F::Uint32x4,
        _ => return None,
    };

    Some(format)
}
