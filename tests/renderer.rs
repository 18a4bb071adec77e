#![cfg(feature = "winit")]

use anyhow::Result;
use winit::dpi::PhysicalSize;
use winit::event_loop::{EventLoop, EventLoopBuilder};
use winit::window::{Window, WindowBuilder};

use umbra::{FrameOutcome, RendererBuilder, ShadowRenderer, FRAMES_IN_FLIGHT};

mod framework;

fn event_loop() -> EventLoop<()> {
    let mut builder = EventLoopBuilder::new();
    // The test harness runs every test on its own thread.
    #[cfg(all(unix, not(target_os = "macos")))]
    winit::platform::x11::EventLoopBuilderExtX11::with_any_thread(&mut builder, true);
    #[cfg(target_os = "windows")]
    winit::platform::windows::EventLoopBuilderExtWindows::with_any_thread(&mut builder, true);
    builder.build()
}

fn make_renderer(window: &Window) -> Result<ShadowRenderer> {
    let ctx = framework::make_window_context(window)?;
    let settings = RendererBuilder::new()
        .extent(320, 240)
        .shadow_map_size(256)
        .shader_dir(framework::shader_dir())
        .build()?;
    ShadowRenderer::new(ctx, window, settings)
}

fn assert_one_framebuffer_per_image(renderer: &ShadowRenderer) {
    assert_eq!(
        renderer.scene_pass().framebuffer_count(),
        renderer.swapchain().image_count(),
        "Scene pass must have exactly one framebuffer per swapchain image"
    );
    assert_eq!(renderer.scene_pass().extent(), renderer.swapchain().extent());
}

// winit allows only one event loop per process, so everything that needs a window lives in this one test.
#[test]
#[ignore = "needs a Vulkan driver and a display"]
pub fn swapchain_recreation_keeps_rendering() -> Result<()> {
    let event_loop = event_loop();
    let window = WindowBuilder::new()
        .with_title("umbra test")
        .with_inner_size(PhysicalSize::new(320, 240))
        .build(&event_loop)?;
    let mut renderer = make_renderer(&window)?;
    assert_one_framebuffer_per_image(&renderer);

    // Recreating twice in a row must not leak or duplicate framebuffers.
    for _ in 0..2 {
        assert!(renderer.recreate(&window)?, "A visible window must not skip recreation");
        assert_one_framebuffer_per_image(&renderer);
    }

    renderer.draw_frame(&window)?;
    renderer.notify_resized();
    // Enough frames for the synchronization set replaced by the resize to be released.
    for _ in 0..=FRAMES_IN_FLIGHT {
        let outcome = renderer.draw_frame(&window)?;
        assert_ne!(outcome, FrameOutcome::Skipped);
    }
    assert_one_framebuffer_per_image(&renderer);
    assert!(renderer.frame_count() > FRAMES_IN_FLIGHT as u64);
    Ok(())
}
