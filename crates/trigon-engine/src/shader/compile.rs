use std::path::{Path, PathBuf};

use naga::valid::{Capabilities, ModuleInfo, ValidationFlags, Validator};
use naga::{Module, ShaderStage};

use crate::error::InitError;

/// Shader file read at startup, relative to the working directory.
pub const SHADER_PATH: &str = "shaders/triangle.wgsl";

pub const VERTEX_ENTRY: &str = "vs_main";
pub const PIXEL_ENTRY: &str = "ps_main";

/// Shading-language capability set every shader is validated against.
///
/// Pinned to the portable baseline so a shader that validates here runs on
/// every feature level the device layer may negotiate.
pub const SHADER_CAPABILITIES: Capabilities = Capabilities::empty();

/// A validated shader module, still on the CPU.
#[derive(Debug)]
pub struct CompiledShader {
    pub path: PathBuf,
    pub source: String,
    pub module: Module,
    pub info: ModuleInfo,
}

/// Reads and compiles the shader file at `path`.
pub fn compile_file(path: &Path) -> Result<CompiledShader, InitError> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| compile_error(path, format!("cannot read shader file: {e}")))?;
    compile_source(path, source)
}

/// Parses and validates WGSL `source`, then checks that both entry points exist.
///
/// `path` only labels diagnostics.
pub fn compile_source(path: &Path, source: String) -> Result<CompiledShader, InitError> {
    let module = naga::front::wgsl::parse_str(&source)
        .map_err(|e| compile_error(path, e.emit_to_string(&source)))?;

    let info = Validator::new(ValidationFlags::all(), SHADER_CAPABILITIES)
        .validate(&module)
        .map_err(|e| compile_error(path, e.emit_to_string(&source)))?;

    for (name, stage) in [
        (VERTEX_ENTRY, ShaderStage::Vertex),
        (PIXEL_ENTRY, ShaderStage::Fragment),
    ] {
        let found = module
            .entry_points
            .iter()
            .any(|ep| ep.name == name && ep.stage == stage);
        if !found {
            return Err(compile_error(
                path,
                format!("missing {stage:?} entry point `{name}`"),
            ));
        }
    }

    log::debug!("compiled shader `{}`", path.display());

    Ok(CompiledShader {
        path: path.to_path_buf(),
        source,
        module,
        info,
    })
}

fn compile_error(path: &Path, diagnostic: String) -> InitError {
    log::error!("shader `{}`:\n{diagnostic}", path.display());
    InitError::ShaderCompilation {
        path: path.to_path_buf(),
        diagnostic,
    }
}
