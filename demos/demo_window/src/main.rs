//! Demo Window - The full ImGui demo over an animated clear color
//!
//! Opens a window, creates an OpenGL context with glutin, and drives the
//! built-in ImGui demo window every frame. The background cycles through
//! colors so missing redraws are easy to spot.
//!
//! Run with: cargo run

use std::ffi::CString;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Instant;

use glow::HasContext;
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextAttributesBuilder, PossiblyCurrentContext};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

struct Gui {
    window: Window,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    gl: glow::Context,
    imgui: imgui::Context,
    platform: glim::Platform,
    renderer: glim::Renderer,
    start: Instant,
    demo_open: bool,
}

impl Gui {
    fn new(event_loop: &ActiveEventLoop) -> Self {
        let attributes = Window::default_attributes()
            .with_title("glim demo")
            .with_inner_size(LogicalSize::new(1280.0, 720.0));
        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, ConfigTemplateBuilder::new(), |mut configs| {
                configs.next().expect("no matching GL config")
            })
            .expect("failed to create window");
        let window = window.expect("window was not created");

        let display = gl_config.display();
        let raw_handle = window.window_handle().ok().map(|handle| handle.as_raw());
        let context_attributes = ContextAttributesBuilder::new().build(raw_handle);
        let not_current = unsafe { display.create_context(&gl_config, &context_attributes) }
            .expect("failed to create GL context");
        let surface_attributes = window
            .build_surface_attributes(SurfaceAttributesBuilder::<WindowSurface>::new())
            .expect("failed to build surface attributes");
        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes) }
            .expect("failed to create GL surface");
        let context = not_current
            .make_current(&surface)
            .expect("failed to make GL context current");
        // Vsync is best effort; some drivers refuse the request.
        let _ = surface.set_swap_interval(
            &context,
            SwapInterval::Wait(NonZeroU32::new(1).expect("nonzero")),
        );

        let gl =
            unsafe { glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s)) };

        let mut imgui = imgui::Context::create();
        imgui.set_ini_filename(None::<PathBuf>);
        let platform = glim::Platform::new(&mut imgui, &window);
        let renderer = glim::Renderer::new(&gl, &mut imgui, |name| {
            let name = CString::new(name).expect("symbol name contains NUL");
            display.get_proc_address(&name)
        })
        .expect("failed to initialize UI renderer");

        Self {
            window,
            surface,
            context,
            gl,
            imgui,
            platform,
            renderer,
            start: Instant::now(),
            demo_open: true,
        }
    }

    fn draw(&mut self) {
        self.platform
            .prepare_frame(self.imgui.io_mut(), &self.window);
        let ui = self.imgui.new_frame();
        ui.show_demo_window(&mut self.demo_open);

        let t = self.start.elapsed().as_secs_f32();
        unsafe {
            self.gl.clear_color(
                t.sin() * 0.5 + 0.5,
                (t + 2.1).sin() * 0.5 + 0.5,
                (t + 4.2).sin() * 0.5 + 0.5,
                1.0,
            );
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
        self.renderer
            .render(&self.gl, &mut self.imgui)
            .expect("failed to render UI");
        self.surface
            .swap_buffers(&self.context)
            .expect("failed to swap buffers");
    }
}

#[derive(Default)]
struct App {
    gui: Option<Gui>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gui.is_none() {
            self.gui = Some(Gui::new(event_loop));
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(gui) = self.gui.as_mut() else {
            return;
        };
        gui.platform
            .handle_event(gui.imgui.io_mut(), &gui.window, &event);
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let (Some(width), Some(height)) =
                    (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                {
                    gui.surface.resize(&gui.context, width, height);
                }
            }
            WindowEvent::RedrawRequested => gui.draw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gui) = &self.gui {
            gui.window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = App::default();
    event_loop.run_app(&mut app)?;
    Ok(())
}
