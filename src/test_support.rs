//! Shared helpers for headless tests.
//!
//! ImGui allows only one context per process. Tests that need a context run
//! their body through [`with_context`], which serializes context creation
//! behind a process-wide lock and hands each test a freshly configured,
//! headless context.

use std::sync::Mutex;

static CTX_GUARD: Mutex<()> = Mutex::new(());

/// Run `f` with exclusive access to a fresh headless ImGui context.
///
/// The context has a default font with a built atlas and a fixed display
/// size, so tests can start frames and generate draw data without a window.
pub(crate) fn with_context<R>(f: impl FnOnce(&mut imgui::Context) -> R) -> R {
    let _guard = CTX_GUARD.lock().unwrap_or_else(|e| e.into_inner());

    let mut ctx = imgui::Context::create();
    ctx.set_ini_filename(None::<std::path::PathBuf>);
    let io = ctx.io_mut();
    io.display_size = [800.0, 600.0];
    io.display_framebuffer_scale = [1.0, 1.0];
    io.delta_time = 1.0 / 60.0;
    ctx.fonts()
        .add_font(&[imgui::FontSource::DefaultFontData { config: None }]);
    ctx.fonts().build_rgba32_texture();

    f(&mut ctx)
}
