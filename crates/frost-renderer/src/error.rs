//! Renderer error types

use thiserror::Error;

/// WGSL failed to parse or validate
#[derive(Debug, Clone, Error)]
#[error("failed to compile shader '{label}':\n{diagnostic}")]
pub struct CompileError {
    pub label: String,
    /// Compiler diagnostic rendered against the source
    pub diagnostic: String,
}

/// `set_uniform` named a member the program does not declare
#[derive(Debug, Clone, Error, PartialEq)]
#[error("shader '{program}' has no uniform named '{name}'")]
pub struct UnknownUniformError {
    pub program: String,
    pub name: String,
}

/// Value does not have the byte size of the declared member
#[derive(Debug, Clone, Error, PartialEq)]
#[error("uniform '{name}' of shader '{program}' is {expected} bytes, got a {got}-byte value")]
pub struct UniformTypeError {
    pub program: String,
    pub name: String,
    pub expected: u32,
    pub got: u32,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    UnknownUniform(#[from] UnknownUniformError),
    #[error(transparent)]
    UniformType(#[from] UniformTypeError),
    #[error("outline rendering failed: {0}")]
    Outline(String),
}
