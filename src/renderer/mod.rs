//! ImGui renderer
//!
//! Owns the GPU-side state the GUI needs: one vertex buffer, one index
//! buffer, the font atlas texture, and a single fixed-function textured,
//! alpha-blended triangle pipeline. Each frame it uploads the current draw
//! data in full and replays the command list against the GL context.
//!
//! Resource creation and fixed per-frame state go through glow; the replay
//! loop itself issues raw driver calls through the entry-point table
//! resolved at startup (see the `gl` module).

mod draw;
mod shaders;

use std::ffi::c_void;
use std::mem;

use glow::HasContext;
use imgui::{FontSource, TextureId};

use crate::error::{RendererError, RendererResult};
use crate::gl::GlFns;

/// The font atlas texture and its invalidation state.
///
/// The texture object lives for the renderer's lifetime; its contents are
/// (re)uploaded lazily, whenever the atlas has been marked dirty, at the top
/// of the next frame. Registering the handle with ImGui after every upload
/// keeps glyph UVs pointing at live data.
pub(crate) struct AtlasTexture {
    pub(crate) texture: glow::NativeTexture,
    pub(crate) dirty: bool,
}

impl AtlasTexture {
    pub(crate) fn new(texture: glow::NativeTexture) -> Self {
        // Starts dirty so the first flush performs the initial upload.
        Self {
            texture,
            dirty: true,
        }
    }

    /// Upload the atlas bitmap and re-register the handle if the atlas was
    /// invalidated. Returns whether an upload happened.
    pub(crate) fn flush(&mut self, fns: &GlFns, fonts: &mut imgui::FontAtlas) -> bool {
        if !self.dirty {
            return false;
        }
        let raw = self.texture.0.get();
        let (width, height) = {
            let atlas = fonts.build_rgba32_texture();
            unsafe {
                (fns.bind_texture)(glow::TEXTURE_2D, raw);
                (fns.tex_image_2d)(
                    glow::TEXTURE_2D,
                    0,
                    glow::RGBA as i32,
                    atlas.width as i32,
                    atlas.height as i32,
                    0,
                    glow::RGBA,
                    glow::UNSIGNED_BYTE,
                    atlas.data.as_ptr().cast(),
                );
            }
            (atlas.width, atlas.height)
        };
        fonts.tex_id = TextureId::new(raw as usize);
        self.dirty = false;
        tracing::debug!(width, height, "uploaded font atlas");
        true
    }
}

/// Renders ImGui draw data through an OpenGL context.
///
/// Texture handles follow one convention: a [`TextureId`]'s value is the raw
/// GL texture name. The renderer registers the font atlas this way and binds
/// every draw command's texture by converting back.
pub struct Renderer {
    program: glow::NativeProgram,
    scale_loc: glow::NativeUniformLocation,
    vao: glow::NativeVertexArray,
    vbo: glow::NativeBuffer,
    ebo: glow::NativeBuffer,
    atlas: AtlasTexture,
    fns: GlFns,
}

impl Renderer {
    /// Set up the UI pipeline against a current GL context.
    ///
    /// Compiles the pipeline, registers the default font atlas as a GL
    /// texture, and resolves the raw entry points through `loader` (the same
    /// proc-address source the GL context was created from). Any failure is
    /// fatal; there is no degraded mode.
    pub fn new(
        gl: &glow::Context,
        imgui_ctx: &mut imgui::Context,
        loader: impl FnMut(&str) -> *const c_void,
    ) -> RendererResult<Self> {
        let fns = GlFns::load(loader)?;
        let header = shaders::header(gl.version().is_embedded);

        unsafe {
            let program = gl.create_program().map_err(RendererError::ObjectCreation)?;
            for (stage, kind, source) in [
                ("vertex", glow::VERTEX_SHADER, shaders::VERTEX),
                ("fragment", glow::FRAGMENT_SHADER, shaders::FRAGMENT),
            ] {
                let shader = gl.create_shader(kind).map_err(RendererError::ObjectCreation)?;
                gl.shader_source(shader, &format!("{header}\n{source}"));
                gl.compile_shader(shader);
                if !gl.get_shader_compile_status(shader) {
                    return Err(RendererError::ShaderCompile {
                        stage,
                        log: gl.get_shader_info_log(shader),
                    });
                }
                gl.attach_shader(program, shader);
            }
            gl.link_program(program);
            if !gl.get_program_link_status(program) {
                return Err(RendererError::ProgramLink(gl.get_program_info_log(program)));
            }

            let scale_loc = gl
                .get_uniform_location(program, "Scale")
                .ok_or(RendererError::MissingUniform("Scale"))?;
            let texture_loc = gl
                .get_uniform_location(program, "Texture")
                .ok_or(RendererError::MissingUniform("Texture"))?;
            gl.use_program(Some(program));
            // The sampler reads from texture unit 0 for the renderer's lifetime.
            gl.uniform_1_i32(Some(&texture_loc), 0);

            let vao = gl
                .create_vertex_array()
                .map_err(RendererError::ObjectCreation)?;
            let vbo = gl.create_buffer().map_err(RendererError::ObjectCreation)?;
            let ebo = gl.create_buffer().map_err(RendererError::ObjectCreation)?;
            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            let stride = mem::size_of::<imgui::DrawVert>() as i32;
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, stride, 8);
            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_f32(2, 4, glow::UNSIGNED_BYTE, true, stride, 16);
            gl.bind_vertex_array(None);

            imgui_ctx
                .fonts()
                .add_font(&[FontSource::DefaultFontData { config: None }]);
            let texture = gl.create_texture().map_err(RendererError::ObjectCreation)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::NEAREST as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::NEAREST as i32,
            );
            let mut atlas = AtlasTexture::new(texture);
            atlas.flush(&fns, imgui_ctx.fonts());

            imgui_ctx.set_renderer_name(Some(format!("glim {}", env!("CARGO_PKG_VERSION"))));
            tracing::debug!("compiled UI pipeline");

            Ok(Self {
                program,
                scale_loc,
                vao,
                vbo,
                ebo,
                atlas,
                fns,
            })
        }
    }

    /// Mark the font atlas as needing a re-upload.
    ///
    /// Call after changing the context's fonts; the next frame re-uploads the
    /// bitmap and re-registers the handle before anything is drawn (stale
    /// handles would show up as missing or garbled glyphs).
    pub fn invalidate_font_atlas(&mut self) {
        self.atlas.dirty = true;
    }

    /// Finish the current ImGui frame and render it.
    ///
    /// Fetches the draw data from the context, refreshing the font atlas
    /// first if it was invalidated. Call once per frame, after building the
    /// UI and before swapping buffers.
    pub fn render(
        &mut self,
        gl: &glow::Context,
        imgui_ctx: &mut imgui::Context,
    ) -> RendererResult<()> {
        // End the frame before touching the atlas: ImGui forbids font
        // rebuilds while a frame is in progress.
        let draw_data = imgui_ctx.render() as *const imgui::DrawData;
        if self.atlas.dirty {
            self.atlas.flush(&self.fns, imgui_ctx.fonts());
        }
        // The draw data lives inside the context until the next frame
        // begins; the atlas flush above only touches font storage.
        let draw_data = unsafe { &*draw_data };
        self.render_draw_data(gl, draw_data)
    }

    /// Render already-fetched draw data.
    ///
    /// Skips the frame (without error) when the framebuffer has zero area or
    /// there is nothing to draw.
    pub fn render_draw_data(
        &mut self,
        gl: &glow::Context,
        draw_data: &imgui::DrawData,
    ) -> RendererResult<()> {
        let [display_width, display_height] = draw_data.display_size;
        let [scale_x, scale_y] = draw_data.framebuffer_scale;
        let fb_width = (display_width * scale_x) as i32;
        let fb_height = (display_height * scale_y) as i32;
        if draw::should_skip_frame(fb_width, fb_height, draw_data.total_idx_count) {
            return Ok(());
        }

        let scale = draw::scale_uniform([display_width, display_height]);
        unsafe {
            gl.viewport(0, 0, fb_width, fb_height);
            gl.use_program(Some(self.program));
            gl.uniform_2_f32(Some(&self.scale_loc), scale[0], scale[1]);
            gl.bind_vertex_array(Some(self.vao));
            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            gl.disable(glow::CULL_FACE);
            gl.disable(glow::DEPTH_TEST);
        }

        draw::replay_draw_lists(
            &self.fns,
            self.vbo.0.get(),
            self.ebo.0.get(),
            draw_data,
            fb_height,
            [scale_x, scale_y],
        );

        unsafe {
            gl.bind_vertex_array(None);
            gl.use_program(None);
        }
        Ok(())
    }
}
