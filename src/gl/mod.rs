//! Raw driver entry points
//!
//! glow covers resource creation and fixed per-frame state, but the draw-list
//! replay loop talks to the driver directly. The handful of functions it
//! needs are resolved once at initialization from a caller-provided loader
//! and cached for the renderer's lifetime. A symbol that fails to resolve is
//! a fatal error, never a silent no-op: a missing draw call would otherwise
//! show up as a confusing blank screen.

use std::ffi::c_void;
use std::mem;

use crate::error::{RendererError, RendererResult};

/// Table of raw OpenGL functions used by the per-frame replay loop.
///
/// Signatures follow the GL 3.3 core / GLES 3.0 prototypes. The table is
/// deliberately small: everything that can go through glow does.
pub struct GlFns {
    pub(crate) enable: unsafe extern "system" fn(u32),
    pub(crate) disable: unsafe extern "system" fn(u32),
    pub(crate) scissor: unsafe extern "system" fn(i32, i32, i32, i32),
    pub(crate) active_texture: unsafe extern "system" fn(u32),
    pub(crate) bind_texture: unsafe extern "system" fn(u32, u32),
    pub(crate) bind_buffer: unsafe extern "system" fn(u32, u32),
    pub(crate) buffer_data: unsafe extern "system" fn(u32, isize, *const c_void, u32),
    pub(crate) tex_image_2d:
        unsafe extern "system" fn(u32, i32, i32, i32, i32, i32, u32, u32, *const c_void),
    pub(crate) draw_elements_instanced:
        unsafe extern "system" fn(u32, i32, u32, *const c_void, i32),
}

impl GlFns {
    /// Resolve every entry point through `loader`.
    ///
    /// The loader receives the unmangled symbol name (e.g. `"glScissor"`) and
    /// returns the function's address, or null if the symbol is unknown. If
    /// any symbol comes back null the whole load fails, listing every missing
    /// symbol in the error.
    ///
    /// The loader must come from a current GL context (on some platforms
    /// addresses are only valid while that context is current).
    pub fn load(mut loader: impl FnMut(&str) -> *const c_void) -> RendererResult<Self> {
        let enable = loader("glEnable");
        let disable = loader("glDisable");
        let scissor = loader("glScissor");
        let active_texture = loader("glActiveTexture");
        let bind_texture = loader("glBindTexture");
        let bind_buffer = loader("glBindBuffer");
        let buffer_data = loader("glBufferData");
        let tex_image_2d = loader("glTexImage2D");
        let draw_elements_instanced = loader("glDrawElementsInstanced");

        let mut missing = Vec::new();
        for (name, ptr) in [
            ("glEnable", enable),
            ("glDisable", disable),
            ("glScissor", scissor),
            ("glActiveTexture", active_texture),
            ("glBindTexture", bind_texture),
            ("glBindBuffer", bind_buffer),
            ("glBufferData", buffer_data),
            ("glTexImage2D", tex_image_2d),
            ("glDrawElementsInstanced", draw_elements_instanced),
        ] {
            if ptr.is_null() {
                missing.push(name);
            }
        }
        if !missing.is_empty() {
            return Err(RendererError::MissingEntryPoints(missing.join(", ")));
        }

        tracing::debug!("resolved raw OpenGL entry points");

        // All pointers are non-null; the transmutes only reinterpret them as
        // the matching GL prototypes.
        unsafe {
            Ok(Self {
                enable: mem::transmute(enable),
                disable: mem::transmute(disable),
                scissor: mem::transmute(scissor),
                active_texture: mem::transmute(active_texture),
                bind_texture: mem::transmute(bind_texture),
                bind_buffer: mem::transmute(bind_buffer),
                buffer_data: mem::transmute(buffer_data),
                tex_image_2d: mem::transmute(tex_image_2d),
                draw_elements_instanced: mem::transmute(draw_elements_instanced),
            })
        }
    }
}
