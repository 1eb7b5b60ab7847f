// src/renderer/tests.rs

mod render_tests {
    use crate::angle::AngleKey;
    use crate::config::ProjectionConfig;
    use crate::projection::Viewport;
    use crate::rasterizer::LUMINANCE_RAMP;
    use crate::renderer::*;
    use crate::solid::Solid;
    use std::rc::Rc;
    use test_log::test; // For logging within tests

    const VIEWPORT: Viewport = Viewport::new(80, 24);

    fn default_renderer(cache_frames: bool) -> Renderer {
        Renderer::new(Solid::torus(), ProjectionConfig::default(), cache_frames, VIEWPORT)
    }

    #[test]
    fn independent_runs_are_byte_identical() {
        let key = AngleKey::from_radians(1.23, 4.56);
        let mut first = default_renderer(false);
        let mut second = default_renderer(false);
        assert_eq!(*first.render(key), *second.render(key));
        // And again on the same instance after other frames went through.
        first.render(AngleKey::from_radians(0.5, 0.5));
        assert_eq!(first.compute_frame(key), *second.render(key));
    }

    #[test]
    fn second_render_is_served_from_cache() {
        let mut renderer = default_renderer(true);
        let key = AngleKey::from_radians(0.8, 2.0);

        let first = renderer.render(key);
        let stats_after_first = renderer.stats();
        let trig_after_first = renderer.trig_misses();
        assert_eq!(stats_after_first.frames_rendered, 1);
        assert!(stats_after_first.fragments_projected > 0);

        let second = renderer.render(key);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);

        let stats = renderer.stats();
        assert_eq!(stats.frames_rendered, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.fragments_projected, stats_after_first.fragments_projected);
        assert_eq!(renderer.trig_misses(), trig_after_first);
        assert_eq!(renderer.cached_frames(), Some(1));
    }

    #[test]
    fn cached_frame_matches_fresh_computation() {
        let mut renderer = default_renderer(true);
        let key = AngleKey::from_radians(3.3, 0.4);
        renderer.render(key);
        let cached = renderer.render(key);
        assert_eq!(*cached, renderer.compute_frame(key));
    }

    #[test]
    fn disabled_cache_recomputes_every_time() {
        let mut renderer = default_renderer(false);
        let key = AngleKey::from_radians(0.1, 0.2);
        renderer.render(key);
        renderer.render(key);
        assert_eq!(renderer.stats().frames_rendered, 2);
        assert_eq!(renderer.stats().cache_hits, 0);
        assert_eq!(renderer.cached_frames(), None);
    }

    #[test]
    fn resize_never_returns_stale_size_frames() {
        let mut renderer = default_renderer(true);
        let key = AngleKey::from_radians(1.0, 1.0);
        let before = renderer.render(key);
        assert_eq!(before.viewport(), VIEWPORT);

        let smaller = Viewport::new(40, 12);
        renderer.resize(smaller);
        assert_eq!(renderer.cached_frames(), Some(0));

        let after = renderer.render(key);
        assert_eq!(after.viewport(), smaller);
        assert_eq!(renderer.stats().frames_rendered, 2);
        assert_eq!(renderer.stats().cache_hits, 0);
    }

    #[test]
    fn resize_to_same_viewport_keeps_cache() {
        let mut renderer = default_renderer(true);
        let key = AngleKey::default();
        renderer.render(key);
        renderer.resize(VIEWPORT);
        renderer.render(key);
        assert_eq!(renderer.stats().cache_hits, 1);
    }

    #[test]
    fn default_torus_front_faces_right_of_center() {
        let mut renderer = default_renderer(true);
        let frame = renderer.render(AngleKey::from_radians(0.0, 0.0));

        // Object point (3, 0, 0) projects to column 40 + 30·3/5 = 58 on the middle row.
        let front = frame.get(58, 12).expect("cell inside the viewport");
        let ramp_index = LUMINANCE_RAMP
            .iter()
            .position(|&g| char::from(g) == front)
            .unwrap_or_else(|| panic!("front cell {front:?} is not a ramp glyph\n{frame}"));
        assert!(ramp_index > 0, "front cell {front:?} is the dimmest glyph\n{frame}");

        // The lit half of the torus shows more than the dimmest glyph.
        let brighter = frame
            .rows()
            .flatten()
            .any(|&c| c != b' ' && c != LUMINANCE_RAMP[0]);
        assert!(brighter, "frame:\n{frame}");
    }

    #[test]
    fn fitted_projection_rescales_on_resize() {
        let projection = ProjectionConfig {
            fit_to_viewport: true,
            ..ProjectionConfig::default()
        };
        let mut renderer = Renderer::new(Solid::torus(), projection, true, VIEWPORT);
        let wide_k1 = renderer.projector().k1;
        renderer.resize(Viewport::new(40, 24));
        assert!(renderer.projector().k1 < wide_k1);
        assert_eq!(renderer.projector().k1, wide_k1 / 2.0);
    }

    #[test]
    fn cube_renders_visible_faces() {
        let mut renderer = Renderer::new(Solid::cube(), ProjectionConfig::default(), true, VIEWPORT);
        let frame = renderer.render(AngleKey::from_radians(0.6, 0.4));
        assert!(frame.lit_cells() > 0);
    }
}
