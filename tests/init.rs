use anyhow::Result;
use ash::vk;
use ash::vk::Handle;

use umbra::{DepthUsage, Geometry, RendererBuilder, RendererSettings};

mod framework;

#[test]
#[ignore = "needs a Vulkan driver"]
pub fn can_initialize_headless() -> Result<()> {
    let context = framework::make_context()?;
    assert!(context.surface.is_none(), "Headless context should not have a surface");
    assert!(context.debug_messenger.is_none());
    assert_ne!(unsafe { context.physical_device.handle().as_raw() }, 0);
    context.device.wait_idle()?;
    Ok(())
}

#[test]
#[ignore = "needs a Vulkan driver"]
pub fn depth_formats_are_found() -> Result<()> {
    let context = framework::make_context()?;
    let attachment = context.physical_device.depth_format(&context.instance, DepthUsage::Attachment)?;
    let sampled = context
        .physical_device
        .depth_format(&context.instance, DepthUsage::SampledAttachment)?;
    assert_ne!(attachment, vk::Format::UNDEFINED);
    assert!(
        [vk::Format::D16_UNORM, vk::Format::D32_SFLOAT, vk::Format::D24_UNORM_S8_UINT].contains(&sampled),
        "Shadow map format {sampled:?} is not one of the sampled candidates"
    );
    Ok(())
}

#[test]
pub fn default_settings_are_valid() -> Result<()> {
    let settings = RendererBuilder::new().build()?;
    assert_eq!(settings, RendererSettings::default());
    Ok(())
}

#[test]
pub fn demo_scene_is_renderable() -> Result<()> {
    let geometry = Geometry::demo_scene();
    geometry.validate()?;
    assert!(geometry.triangle_count() > 2);
    Ok(())
}
