//! Per-frame draw-list replay
//!
//! Translates one frame's `imgui::DrawData` into scissored, textured draw
//! calls issued through the raw entry-point table. Commands are replayed in
//! exactly the order ImGui produced them; that ordering is what implements
//! Z-ordering and clipping for overlapping panels, so it is a correctness
//! requirement, not a scheduling choice.

use std::ffi::c_void;
use std::mem;

use imgui::{DrawCmd, DrawData, DrawIdx};

use crate::gl::GlFns;

// The replay loop issues GL_UNSIGNED_SHORT draws.
const _: () = assert!(mem::size_of::<DrawIdx>() == 2);

/// Whether this frame should be skipped outright: a minimized / zero-size
/// window or an empty draw list. Expected steady-state, not an error.
pub(crate) fn should_skip_frame(fb_width: i32, fb_height: i32, total_idx_count: i32) -> bool {
    fb_width <= 0 || fb_height <= 0 || total_idx_count <= 0
}

/// The `Scale` uniform for a display size: maps pixel-space positions into
/// the [-1, 1] clip-space range. Independent of the framebuffer scale.
pub(crate) fn scale_uniform(display_size: [f32; 2]) -> [f32; 2] {
    [2.0 / display_size[0], 2.0 / display_size[1]]
}

/// Convert a clip rectangle (logical pixels, top-left origin) into a
/// framebuffer-space scissor box (physical pixels, bottom-left origin).
pub(crate) fn scissor_from_clip(
    clip: [f32; 4],
    fb_height: i32,
    clip_scale: [f32; 2],
) -> (i32, i32, i32, i32) {
    let x1 = clip[0] * clip_scale[0];
    let y1 = clip[1] * clip_scale[1];
    let x2 = clip[2] * clip_scale[0];
    let y2 = clip[3] * clip_scale[1];
    (
        x1 as i32,
        fb_height - y2 as i32,
        (x2 - x1).max(0.0) as i32,
        (y2 - y1).max(0.0) as i32,
    )
}

/// Replay every draw list in order.
///
/// Each list's vertex and index buffers are uploaded whole with stream-draw
/// semantics (full replacement, no reuse of the previous frame's contents),
/// then each command in the list is drawn with the scissor set from its clip
/// rectangle and an index-buffer byte offset that advances by
/// `count * size_of::<DrawIdx>()` per command.
pub(crate) fn replay_draw_lists(
    fns: &GlFns,
    vertex_buffer: u32,
    index_buffer: u32,
    draw_data: &DrawData,
    fb_height: i32,
    clip_scale: [f32; 2],
) {
    unsafe {
        (fns.enable)(glow::SCISSOR_TEST);
        (fns.active_texture)(glow::TEXTURE0);
        for list in draw_data.draw_lists() {
            let vtx = list.vtx_buffer();
            let idx = list.idx_buffer();
            (fns.bind_buffer)(glow::ARRAY_BUFFER, vertex_buffer);
            (fns.buffer_data)(
                glow::ARRAY_BUFFER,
                mem::size_of_val(vtx) as isize,
                vtx.as_ptr().cast(),
                glow::STREAM_DRAW,
            );
            (fns.bind_buffer)(glow::ELEMENT_ARRAY_BUFFER, index_buffer);
            (fns.buffer_data)(
                glow::ELEMENT_ARRAY_BUFFER,
                mem::size_of_val(idx) as isize,
                idx.as_ptr().cast(),
                glow::STREAM_DRAW,
            );

            let mut idx_offset = 0usize;
            for cmd in list.commands() {
                match cmd {
                    DrawCmd::Elements { count, cmd_params } => {
                        let (x, y, width, height) =
                            scissor_from_clip(cmd_params.clip_rect, fb_height, clip_scale);
                        (fns.scissor)(x, y, width, height);
                        (fns.bind_texture)(glow::TEXTURE_2D, cmd_params.texture_id.id() as u32);
                        (fns.draw_elements_instanced)(
                            glow::TRIANGLES,
                            count as i32,
                            glow::UNSIGNED_SHORT,
                            idx_offset as *const c_void,
                            1,
                        );
                        idx_offset += count * mem::size_of::<DrawIdx>();
                    }
                    // Render state is fixed for the whole pass.
                    DrawCmd::ResetRenderState => {}
                    DrawCmd::RawCallback { .. } => {
                        tracing::warn!("skipping unsupported imgui raw callback");
                    }
                }
            }
        }
        (fns.disable)(glow::SCISSOR_TEST);
    }
}

#[cfg(test)]
mod tests {
    use imgui::TextureId;

    use super::*;
    use crate::gl::recorder::{recording_fns, take_calls, Call};
    use crate::test_support::with_context;

    fn draws(calls: &[Call]) -> Vec<(i32, u32, usize)> {
        calls
            .iter()
            .filter_map(|call| match call {
                Call::Draw(count, ty, offset) => Some((*count, *ty, *offset)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_scale_uniform_is_two_over_display_size() {
        assert_eq!(scale_uniform([800.0, 600.0]), [2.0 / 800.0, 2.0 / 600.0]);
        // Framebuffer scale never enters the computation.
        assert_eq!(scale_uniform([1280.0, 720.0]), [2.0 / 1280.0, 2.0 / 720.0]);
    }

    #[test]
    fn test_scissor_flips_y_to_bottom_left_origin() {
        // clip (10, 20) .. (110, 220) in a 600px-tall framebuffer
        let (x, y, w, h) = scissor_from_clip([10.0, 20.0, 110.0, 220.0], 600, [1.0, 1.0]);
        assert_eq!(x, 10);
        assert_eq!(y, 600 - 220);
        assert_eq!(w, 100);
        assert_eq!(h, 200);
    }

    #[test]
    fn test_scissor_applies_framebuffer_scale() {
        let (x, y, w, h) = scissor_from_clip([0.0, 0.0, 800.0, 600.0], 1200, [2.0, 2.0]);
        assert_eq!((x, y, w, h), (0, 0, 1600, 1200));
    }

    #[test]
    fn test_scissor_clamps_degenerate_rects() {
        let (_, _, w, h) = scissor_from_clip([50.0, 50.0, 40.0, 30.0], 600, [1.0, 1.0]);
        assert_eq!((w, h), (0, 0));
    }

    #[test]
    fn test_skip_frame_on_zero_size_or_empty() {
        assert!(should_skip_frame(0, 0, 100));
        assert!(should_skip_frame(0, 600, 100));
        assert!(should_skip_frame(800, 0, 100));
        assert!(should_skip_frame(800, 600, 0));
        assert!(!should_skip_frame(800, 600, 100));
    }

    #[test]
    fn test_replay_issues_every_index_with_advancing_offsets() {
        with_context(|ctx| {
            let ui = ctx.new_frame();
            let draw_list = ui.get_background_draw_list();
            draw_list
                .add_rect([10.0, 10.0], [60.0, 60.0], [1.0, 0.0, 0.0, 1.0])
                .filled(true)
                .build();
            draw_list
                .add_rect([70.0, 10.0], [120.0, 60.0], [0.0, 1.0, 0.0, 1.0])
                .filled(true)
                .build();
            drop(draw_list);

            let draw_data = ctx.render();
            let total_idx = draw_data.total_idx_count;
            assert!(total_idx > 0);

            take_calls();
            replay_draw_lists(&recording_fns(), 1, 2, draw_data, 600, [1.0, 1.0]);
            let calls = take_calls();

            let draws = draws(&calls);
            assert!(!draws.is_empty());
            let issued: i32 = draws.iter().map(|(count, _, _)| count).sum();
            assert_eq!(issued, total_idx);

            // Offsets advance by count * index size, starting at zero.
            let mut expected_offset = 0usize;
            for (count, ty, offset) in &draws {
                assert_eq!(*ty, glow::UNSIGNED_SHORT);
                assert_eq!(*offset, expected_offset);
                expected_offset += *count as usize * std::mem::size_of::<DrawIdx>();
            }
            assert_eq!(expected_offset, total_idx as usize * std::mem::size_of::<DrawIdx>());
        });
    }

    #[test]
    fn test_replay_uploads_full_buffers_before_drawing() {
        with_context(|ctx| {
            let ui = ctx.new_frame();
            let draw_list = ui.get_background_draw_list();
            draw_list
                .add_rect([0.0, 0.0], [100.0, 100.0], [1.0, 1.0, 1.0, 1.0])
                .filled(true)
                .build();
            drop(draw_list);

            let draw_data = ctx.render();
            let total_vtx = draw_data.total_vtx_count as usize;
            let total_idx = draw_data.total_idx_count as usize;

            take_calls();
            replay_draw_lists(&recording_fns(), 7, 8, draw_data, 600, [1.0, 1.0]);
            let calls = take_calls();

            let vtx_bytes = (total_vtx * std::mem::size_of::<imgui::DrawVert>()) as isize;
            let idx_bytes = (total_idx * std::mem::size_of::<DrawIdx>()) as isize;
            assert!(calls.contains(&Call::BindBuffer(glow::ARRAY_BUFFER, 7)));
            assert!(calls.contains(&Call::BufferData(glow::ARRAY_BUFFER, vtx_bytes, glow::STREAM_DRAW)));
            assert!(calls.contains(&Call::BindBuffer(glow::ELEMENT_ARRAY_BUFFER, 8)));
            assert!(calls.contains(&Call::BufferData(
                glow::ELEMENT_ARRAY_BUFFER,
                idx_bytes,
                glow::STREAM_DRAW
            )));

            // Uploads precede the first draw.
            let first_draw = calls
                .iter()
                .position(|call| matches!(call, Call::Draw(..)))
                .expect("one draw expected");
            let last_upload = calls
                .iter()
                .rposition(|call| matches!(call, Call::BufferData(..)))
                .expect("uploads expected");
            assert!(last_upload < first_draw);
        });
    }

    #[test]
    fn test_replay_binds_textures_in_command_order() {
        with_context(|ctx| {
            let ui = ctx.new_frame();
            let draw_list = ui.get_background_draw_list();
            for (id, x) in [(7usize, 0.0f32), (8, 110.0), (9, 220.0)] {
                draw_list
                    .add_image(TextureId::new(id), [x, 0.0], [x + 100.0, 100.0])
                    .build();
            }
            drop(draw_list);

            let draw_data = ctx.render();
            take_calls();
            replay_draw_lists(&recording_fns(), 1, 2, draw_data, 600, [1.0, 1.0]);
            let calls = take_calls();

            let bound: Vec<u32> = calls
                .iter()
                .filter_map(|call| match call {
                    Call::BindTexture(_, texture) => Some(*texture),
                    _ => None,
                })
                .collect();
            assert_eq!(bound, vec![7, 8, 9]);
        });
    }

    #[test]
    fn test_replay_wraps_pass_in_scissor_toggle() {
        with_context(|ctx| {
            let ui = ctx.new_frame();
            let draw_list = ui.get_background_draw_list();
            draw_list
                .add_rect([0.0, 0.0], [50.0, 50.0], [1.0, 1.0, 1.0, 1.0])
                .filled(true)
                .build();
            drop(draw_list);

            let draw_data = ctx.render();
            take_calls();
            replay_draw_lists(&recording_fns(), 1, 2, draw_data, 600, [1.0, 1.0]);
            let calls = take_calls();

            assert_eq!(calls.first(), Some(&Call::Enable(glow::SCISSOR_TEST)));
            assert_eq!(calls.last(), Some(&Call::Disable(glow::SCISSOR_TEST)));
        });
    }

    #[test]
    fn test_replay_scissors_full_screen_clip() {
        with_context(|ctx| {
            let ui = ctx.new_frame();
            let draw_list = ui.get_background_draw_list();
            draw_list
                .add_rect([0.0, 0.0], [50.0, 50.0], [1.0, 1.0, 1.0, 1.0])
                .filled(true)
                .build();
            drop(draw_list);

            // Background commands carry the full-display clip rect, so at
            // scale 2 the scissor must cover the whole framebuffer.
            let draw_data = ctx.render();
            take_calls();
            replay_draw_lists(&recording_fns(), 1, 2, draw_data, 1200, [2.0, 2.0]);
            let calls = take_calls();

            let scissors: Vec<_> = calls
                .iter()
                .filter(|call| matches!(call, Call::Scissor(..)))
                .collect();
            assert_eq!(scissors, vec![&Call::Scissor(0, 0, 1600, 1200)]);
        });
    }

    #[test]
    fn test_empty_frame_issues_no_draws() {
        with_context(|ctx| {
            let _ui = ctx.new_frame();
            let draw_data = ctx.render();
            assert_eq!(draw_data.total_idx_count, 0);

            take_calls();
            replay_draw_lists(&recording_fns(), 1, 2, draw_data, 600, [1.0, 1.0]);
            let calls = take_calls();
            assert!(draws(&calls).is_empty());
        });
    }
}
