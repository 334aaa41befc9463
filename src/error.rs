//! Renderer error types
//!
//! Every variant is a fatal setup failure: there is no recovery path once
//! pipeline compilation or entry-point resolution has failed, so callers are
//! expected to abort with the diagnostic. Steady-state conditions (zero-size
//! windows, empty draw lists, stale font atlases) are handled inline by the
//! renderer and never surface here.

use thiserror::Error;

/// Fatal initialization failure of the rendering backend.
#[derive(Debug, Error)]
pub enum RendererError {
    /// One or more required driver entry points could not be resolved.
    #[error("missing OpenGL entry point(s): {0}")]
    MissingEntryPoints(String),

    /// A GL object (buffer, texture, shader, program) could not be created.
    #[error("failed to create GL object: {0}")]
    ObjectCreation(String),

    /// A shader stage failed to compile.
    #[error("{stage} shader compilation failed: {log}")]
    ShaderCompile {
        stage: &'static str,
        log: String,
    },

    /// The UI program failed to link.
    #[error("program link failed: {0}")]
    ProgramLink(String),

    /// A uniform required by the pipeline is absent from the linked program.
    #[error("uniform {0:?} not found in UI program")]
    MissingUniform(&'static str),
}

/// Convenience alias used throughout the crate.
pub type RendererResult<T> = Result<T, RendererError>;
