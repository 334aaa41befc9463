//! Window input forwarding
//!
//! Feeds winit window events into ImGui's input queue and finalizes
//! per-frame inputs (display size, framebuffer scale, delta time). This is a
//! plain adapter over the event types; it keeps no input state of its own
//! beyond the frame clock, so button and key up/down pairing is exactly as
//! the window system delivered it.

use std::time::Instant;

use imgui::Io;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key as WinitKey, NamedKey};
use winit::window::Window;

/// Wheel events arriving as pixel deltas are converted to lines.
const WHEEL_PIXELS_PER_LINE: f32 = 20.0;

/// Forwards winit events into an ImGui context.
pub struct Platform {
    last_frame: Instant,
}

impl Platform {
    /// Attach to a context: names the platform backend and seeds the display
    /// size and framebuffer scale from the window.
    pub fn new(imgui_ctx: &mut imgui::Context, window: &Window) -> Self {
        imgui_ctx.set_platform_name(Some(format!("glim-winit {}", env!("CARGO_PKG_VERSION"))));
        let scale = window.scale_factor();
        let size = window.inner_size().to_logical::<f32>(scale);
        push_frame_inputs(imgui_ctx.io_mut(), [size.width, size.height], scale as f32);
        Self {
            last_frame: Instant::now(),
        }
    }

    /// Forward one window event. Call for every event the window receives,
    /// before the next frame's layout runs.
    pub fn handle_event(&mut self, io: &mut Io, window: &Window, event: &WindowEvent) {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                push_modifiers(io, modifiers.state());
            }
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                let pressed = key_event.state == ElementState::Pressed;
                if let Some(key) = map_key(&key_event.logical_key) {
                    io.add_key_event(key, pressed);
                }
                if pressed {
                    if let Some(text) = &key_event.text {
                        for ch in text.chars() {
                            io.add_input_character(ch);
                        }
                    }
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let scale = *scale_factor as f32;
                io.display_framebuffer_scale = [scale, scale];
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = position.to_logical::<f32>(window.scale_factor());
                io.add_mouse_pos_event([pos.x, pos.y]);
            }
            WindowEvent::CursorLeft { .. } => {
                io.add_mouse_pos_event([-f32::MAX, -f32::MAX]);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = map_mouse_button(*button) {
                    io.add_mouse_button_event(button, state.is_pressed());
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                io.add_mouse_wheel_event(wheel_delta(*delta));
            }
            _ => {}
        }
    }

    /// Finalize inputs for the coming frame: display size, framebuffer scale
    /// and delta time. Call once per frame, after the event drain and before
    /// building the UI.
    pub fn prepare_frame(&mut self, io: &mut Io, window: &Window) {
        let now = Instant::now();
        io.update_delta_time(now - self.last_frame);
        self.last_frame = now;

        let scale = window.scale_factor();
        let size = window.inner_size().to_logical::<f32>(scale);
        push_frame_inputs(io, [size.width, size.height], scale as f32);
    }
}

fn push_frame_inputs(io: &mut Io, logical_size: [f32; 2], scale: f32) {
    io.display_size = logical_size;
    io.display_framebuffer_scale = [scale, scale];
}

fn push_modifiers(io: &mut Io, state: winit::keyboard::ModifiersState) {
    io.add_key_event(imgui::Key::ModShift, state.shift_key());
    io.add_key_event(imgui::Key::ModCtrl, state.control_key());
    io.add_key_event(imgui::Key::ModAlt, state.alt_key());
    io.add_key_event(imgui::Key::ModSuper, state.super_key());
}

fn wheel_delta(delta: MouseScrollDelta) -> [f32; 2] {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => [x, y],
        MouseScrollDelta::PixelDelta(pos) => [
            pos.x as f32 / WHEEL_PIXELS_PER_LINE,
            pos.y as f32 / WHEEL_PIXELS_PER_LINE,
        ],
    }
}

fn map_mouse_button(button: winit::event::MouseButton) -> Option<imgui::MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(imgui::MouseButton::Left),
        winit::event::MouseButton::Right => Some(imgui::MouseButton::Right),
        winit::event::MouseButton::Middle => Some(imgui::MouseButton::Middle),
        winit::event::MouseButton::Back => Some(imgui::MouseButton::Extra1),
        winit::event::MouseButton::Forward => Some(imgui::MouseButton::Extra2),
        winit::event::MouseButton::Other(_) => None,
    }
}

/// Convert a winit logical key to its ImGui equivalent. Unmapped keys are
/// dropped (never queued), which keeps up/down pairing intact.
fn map_key(key: &WinitKey) -> Option<imgui::Key> {
    use imgui::Key;

    match key {
        WinitKey::Character(text) => {
            let ch = text.chars().next()?;
            match ch.to_ascii_lowercase() {
                'a' => Some(Key::A),
                'b' => Some(Key::B),
                'c' => Some(Key::C),
                'd' => Some(Key::D),
                'e' => Some(Key::E),
                'f' => Some(Key::F),
                'g' => Some(Key::G),
                'h' => Some(Key::H),
                'i' => Some(Key::I),
                'j' => Some(Key::J),
                'k' => Some(Key::K),
                'l' => Some(Key::L),
                'm' => Some(Key::M),
                'n' => Some(Key::N),
                'o' => Some(Key::O),
                'p' => Some(Key::P),
                'q' => Some(Key::Q),
                'r' => Some(Key::R),
                's' => Some(Key::S),
                't' => Some(Key::T),
                'u' => Some(Key::U),
                'v' => Some(Key::V),
                'w' => Some(Key::W),
                'x' => Some(Key::X),
                'y' => Some(Key::Y),
                'z' => Some(Key::Z),
                '0' => Some(Key::Alpha0),
                '1' => Some(Key::Alpha1),
                '2' => Some(Key::Alpha2),
                '3' => Some(Key::Alpha3),
                '4' => Some(Key::Alpha4),
                '5' => Some(Key::Alpha5),
                '6' => Some(Key::Alpha6),
                '7' => Some(Key::Alpha7),
                '8' => Some(Key::Alpha8),
                '9' => Some(Key::Alpha9),
                ' ' => Some(Key::Space),
                '\'' => Some(Key::Apostrophe),
                ',' => Some(Key::Comma),
                '-' => Some(Key::Minus),
                '.' => Some(Key::Period),
                '/' => Some(Key::Slash),
                ';' => Some(Key::Semicolon),
                '=' => Some(Key::Equal),
                '[' => Some(Key::LeftBracket),
                '\\' => Some(Key::Backslash),
                ']' => Some(Key::RightBracket),
                '`' => Some(Key::GraveAccent),
                _ => None,
            }
        }
        WinitKey::Named(named) => match named {
            NamedKey::Tab => Some(Key::Tab),
            NamedKey::Space => Some(Key::Space),
            NamedKey::Enter => Some(Key::Enter),
            NamedKey::Escape => Some(Key::Escape),
            NamedKey::Backspace => Some(Key::Backspace),
            NamedKey::Delete => Some(Key::Delete),
            NamedKey::Insert => Some(Key::Insert),
            NamedKey::Home => Some(Key::Home),
            NamedKey::End => Some(Key::End),
            NamedKey::PageUp => Some(Key::PageUp),
            NamedKey::PageDown => Some(Key::PageDown),
            NamedKey::ArrowLeft => Some(Key::LeftArrow),
            NamedKey::ArrowRight => Some(Key::RightArrow),
            NamedKey::ArrowUp => Some(Key::UpArrow),
            NamedKey::ArrowDown => Some(Key::DownArrow),
            NamedKey::Shift => Some(Key::LeftShift),
            NamedKey::Control => Some(Key::LeftCtrl),
            NamedKey::Alt => Some(Key::LeftAlt),
            NamedKey::Super => Some(Key::LeftSuper),
            NamedKey::ContextMenu => Some(Key::Menu),
            NamedKey::CapsLock => Some(Key::CapsLock),
            NamedKey::ScrollLock => Some(Key::ScrollLock),
            NamedKey::NumLock => Some(Key::NumLock),
            NamedKey::PrintScreen => Some(Key::PrintScreen),
            NamedKey::Pause => Some(Key::Pause),
            NamedKey::F1 => Some(Key::F1),
            NamedKey::F2 => Some(Key::F2),
            NamedKey::F3 => Some(Key::F3),
            NamedKey::F4 => Some(Key::F4),
            NamedKey::F5 => Some(Key::F5),
            NamedKey::F6 => Some(Key::F6),
            NamedKey::F7 => Some(Key::F7),
            NamedKey::F8 => Some(Key::F8),
            NamedKey::F9 => Some(Key::F9),
            NamedKey::F10 => Some(Key::F10),
            NamedKey::F11 => Some(Key::F11),
            NamedKey::F12 => Some(Key::F12),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalPosition;
    use winit::keyboard::{Key as WinitKey, ModifiersState, NamedKey};

    use super::*;
    use crate::test_support::with_context;

    #[test]
    fn test_map_key_characters_and_named() {
        assert_eq!(map_key(&WinitKey::Character("a".into())), Some(imgui::Key::A));
        assert_eq!(map_key(&WinitKey::Character("Z".into())), Some(imgui::Key::Z));
        assert_eq!(
            map_key(&WinitKey::Character("7".into())),
            Some(imgui::Key::Alpha7)
        );
        assert_eq!(
            map_key(&WinitKey::Named(NamedKey::Enter)),
            Some(imgui::Key::Enter)
        );
        assert_eq!(
            map_key(&WinitKey::Named(NamedKey::ArrowUp)),
            Some(imgui::Key::UpArrow)
        );
        assert_eq!(map_key(&WinitKey::Named(NamedKey::F5)), Some(imgui::Key::F5));
        // Unmapped keys are dropped, not mis-queued.
        assert_eq!(map_key(&WinitKey::Character("ß".into())), None);
        assert_eq!(map_key(&WinitKey::Named(NamedKey::MediaPlayPause)), None);
    }

    #[test]
    fn test_map_mouse_buttons() {
        assert_eq!(
            map_mouse_button(winit::event::MouseButton::Left),
            Some(imgui::MouseButton::Left)
        );
        assert_eq!(
            map_mouse_button(winit::event::MouseButton::Middle),
            Some(imgui::MouseButton::Middle)
        );
        assert_eq!(map_mouse_button(winit::event::MouseButton::Other(9)), None);
    }

    #[test]
    fn test_wheel_delta_units() {
        assert_eq!(wheel_delta(MouseScrollDelta::LineDelta(1.0, -2.0)), [1.0, -2.0]);
        let pixels = MouseScrollDelta::PixelDelta(PhysicalPosition::new(40.0, -20.0));
        assert_eq!(wheel_delta(pixels), [2.0, -1.0]);
    }

    #[test]
    fn test_frame_inputs_push_size_and_scale() {
        with_context(|ctx| {
            let io = ctx.io_mut();
            push_frame_inputs(io, [1280.0, 720.0], 2.0);
            assert_eq!(io.display_size, [1280.0, 720.0]);
            assert_eq!(io.display_framebuffer_scale, [2.0, 2.0]);
        });
    }

    #[test]
    fn test_modifier_state_forwarding() {
        with_context(|ctx| {
            push_modifiers(ctx.io_mut(), ModifiersState::SHIFT | ModifiersState::CONTROL);
            let ui = ctx.new_frame();
            assert!(ui.io().key_shift);
            assert!(ui.io().key_ctrl);
            assert!(!ui.io().key_alt);
        });
    }

    #[test]
    fn test_button_press_release_pairing() {
        with_context(|ctx| {
            let io = ctx.io_mut();
            io.add_mouse_button_event(imgui::MouseButton::Left, true);
            let ui = ctx.new_frame();
            assert!(ui.io().mouse_down[0]);
            ctx.render();

            ctx.io_mut()
                .add_mouse_button_event(imgui::MouseButton::Left, false);
            let ui = ctx.new_frame();
            assert!(!ui.io().mouse_down[0]);
        });
    }
}
