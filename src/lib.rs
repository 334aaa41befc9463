//! glim
//!
//! An OpenGL rendering backend and winit input shim for Dear ImGui.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **gl** - Raw driver entry points resolved at startup
//! 2. **renderer** - ImGui draw-data replay over an OpenGL context
//! 3. **platform** - winit event forwarding into ImGui's input queue
//! 4. **error** - Initialization error taxonomy
//!
//! A frame looks like: drain window events through [`Platform::handle_event`],
//! call [`Platform::prepare_frame`], build the UI, then hand the context to
//! [`Renderer::render`] and swap buffers.

pub mod error;
pub mod gl;
pub mod platform;
pub mod renderer;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use error::{RendererError, RendererResult};
pub use gl::GlFns;
pub use platform::Platform;
pub use renderer::Renderer;

// Re-export imgui for convenience
pub use imgui;
