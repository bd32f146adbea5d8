use std::fmt;
use std::path::PathBuf;

/// GPU resource kinds that can fail to be created during initialization.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Resource {
    RenderTarget,
    VertexShader,
    PixelShader,
    InputLayout,
    VertexBuffer,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::RenderTarget => "render target",
            Resource::VertexShader => "vertex shader",
            Resource::PixelShader => "pixel shader",
            Resource::InputLayout => "input layout",
            Resource::VertexBuffer => "vertex buffer",
        };
        f.write_str(name)
    }
}

/// Renderer initialization failure.
///
/// Every fallible setup step returns the first of these it hits; a renderer
/// that produced one is never used.
#[derive(Debug, Clone)]
pub enum InitError {
    /// No driver type produced a device at any requested feature level.
    DeviceCreation(String),
    /// The adapter behind the device could not be queried for presentation.
    AdapterQuery(String),
    /// The swap chain could not be bound to the window.
    SwapChainCreation(String),
    /// A render target, shader, input layout or buffer could not be created.
    ResourceCreation { resource: Resource, message: String },
    /// The shader file is missing or does not compile.
    ShaderCompilation { path: PathBuf, diagnostic: String },
}

impl InitError {
    pub(crate) fn resource(resource: Resource, message: impl Into<String>) -> Self {
        InitError::ResourceCreation { resource, message: message.into() }
    }

    /// Text meant for the person launching the program, if this failure has one.
    ///
    /// Only shader compilation failures are user-facing; they almost always
    /// mean the program was started from the wrong working directory.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            InitError::ShaderCompilation { .. } => Some(
                "The shader file cannot be compiled. Please run this executable from the \
                 directory that contains the shader file.",
            ),
            _ => None,
        }
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::DeviceCreation(msg) => write!(f, "device creation failed: {msg}"),
            InitError::AdapterQuery(msg) => write!(f, "adapter query failed: {msg}"),
            InitError::SwapChainCreation(msg) => write!(f, "swap chain creation failed: {msg}"),
            InitError::ResourceCreation { resource, message } => {
                write!(f, "{resource} creation failed: {message}")
            }
            InitError::ShaderCompilation { path, .. } => {
                write!(f, "shader `{}` cannot be compiled", path.display())
            }
        }
    }
}

impl std::error::Error for InitError {}
