//! Depth attachments and depth format selection.

use anyhow::Result;
use ash::vk;

use crate::{Allocator, DefaultAllocator, Device, Error, Image, ImageCreateInfo, ImageView};

/// How a depth attachment will be used. Determines the candidate formats and the features they must support.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DepthUsage {
    /// Only used as a depth attachment, never read in a shader.
    Attachment,
    /// Written as a depth attachment and sampled in a later pass, like a shadow map.
    SampledAttachment,
}

impl DepthUsage {
    /// Formats to try, in order of preference.
    pub fn candidates(self) -> &'static [vk::Format] {
        match self {
            DepthUsage::Attachment => &[
                vk::Format::D32_SFLOAT_S8_UINT,
                vk::Format::D32_SFLOAT,
                vk::Format::D24_UNORM_S8_UINT,
                vk::Format::D16_UNORM_S8_UINT,
                vk::Format::D16_UNORM,
            ],
            DepthUsage::SampledAttachment => &[vk::Format::D16_UNORM, vk::Format::D32_SFLOAT, vk::Format::D24_UNORM_S8_UINT],
        }
    }

    /// Optimal tiling features a candidate must support.
    pub fn required_features(self) -> vk::FormatFeatureFlags {
        match self {
            DepthUsage::Attachment => vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT,
            DepthUsage::SampledAttachment => {
                vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT | vk::FormatFeatureFlags::SAMPLED_IMAGE
            }
        }
    }

    /// Image usage flags for an attachment with this usage.
    pub fn image_usage(self) -> vk::ImageUsageFlags {
        match self {
            DepthUsage::Attachment => vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
            DepthUsage::SampledAttachment => vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT | vk::ImageUsageFlags::SAMPLED,
        }
    }
}

/// Pick the first candidate format for `usage` whose optimal tiling features satisfy it.
/// `properties` queries the format properties of the physical device.
/// # Errors
/// Fails with [`Error::NoDepthFormat`] if no candidate is supported.
pub fn choose_depth_format(usage: DepthUsage, mut properties: impl FnMut(vk::Format) -> vk::FormatProperties) -> Result<vk::Format> {
    let required = usage.required_features();
    usage
        .candidates()
        .iter()
        .copied()
        .find(|&format| properties(format).optimal_tiling_features.contains(required))
        .ok_or_else(|| anyhow::Error::from(Error::NoDepthFormat(usage)))
}

/// Whether this is a combined depth and stencil format.
pub fn has_stencil(format: vk::Format) -> bool {
    matches!(
        format,
        vk::Format::D16_UNORM_S8_UINT | vk::Format::D24_UNORM_S8_UINT | vk::Format::D32_SFLOAT_S8_UINT
    )
}

/// Aspect flags for a view of a depth attachment. Sampled views only ever expose the depth aspect.
pub fn depth_aspect(format: vk::Format, usage: DepthUsage) -> vk::ImageAspectFlags {
    if usage == DepthUsage::Attachment && has_stencil(format) {
        vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
    } else {
        vk::ImageAspectFlags::DEPTH
    }
}

/// A depth image together with the view that is attached to a framebuffer.
#[derive(Debug)]
pub struct FrameBufferAttachment<A: Allocator = DefaultAllocator> {
    // Declared first so the view is destroyed before its image.
    view: ImageView,
    image: Image<A>,
}

impl<A: Allocator> FrameBufferAttachment<A> {
    /// Allocate a new depth attachment of the given size and format.
    pub fn new(device: Device, alloc: &mut A, extent: vk::Extent2D, format: vk::Format, usage: DepthUsage) -> Result<Self> {
        let image = Image::new(
            device,
            alloc,
            ImageCreateInfo {
                extent,
                format,
                usage: usage.image_usage(),
            },
        )?;
        let view = image.view(depth_aspect(format, usage))?;
        Ok(Self {
            view,
            image,
        })
    }

    pub fn view(&self) -> &ImageView {
        &self.view
    }

    pub fn format(&self) -> vk::Format {
        self.image.format()
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.image.extent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supports(formats: &'static [vk::Format], features: vk::FormatFeatureFlags) -> impl FnMut(vk::Format) -> vk::FormatProperties {
        move |format| {
            let mut properties = vk::FormatProperties::default();
            if formats.contains(&format) {
                properties.optimal_tiling_features = features;
            }
            properties
        }
    }

    #[test]
    fn attachment_prefers_highest_precision() {
        let all = vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT;
        let format = choose_depth_format(
            DepthUsage::Attachment,
            supports(&[vk::Format::D16_UNORM, vk::Format::D32_SFLOAT_S8_UINT, vk::Format::D32_SFLOAT], all),
        )
        .unwrap();
        assert_eq!(format, vk::Format::D32_SFLOAT_S8_UINT);
    }

    #[test]
    fn attachment_falls_back_to_d16() {
        let format = choose_depth_format(
            DepthUsage::Attachment,
            supports(&[vk::Format::D16_UNORM], vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT),
        )
        .unwrap();
        assert_eq!(format, vk::Format::D16_UNORM);
    }

    #[test]
    fn sampled_attachment_requires_sampling_support() {
        // D16 can be attached but not sampled, so the next candidate wins.
        let format = choose_depth_format(DepthUsage::SampledAttachment, |format| {
            let mut properties = vk::FormatProperties::default();
            properties.optimal_tiling_features = match format {
                vk::Format::D16_UNORM => vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT,
                vk::Format::D32_SFLOAT => {
                    vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT | vk::FormatFeatureFlags::SAMPLED_IMAGE
                }
                _ => vk::FormatFeatureFlags::empty(),
            };
            properties
        })
        .unwrap();
        assert_eq!(format, vk::Format::D32_SFLOAT);
    }

    #[test]
    fn no_supported_format_is_an_error() {
        let err = choose_depth_format(DepthUsage::SampledAttachment, |_| vk::FormatProperties::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NoDepthFormat(DepthUsage::SampledAttachment))
        ));
    }

    #[test]
    fn stencil_aspect_only_for_combined_attachment_formats() {
        assert_eq!(
            depth_aspect(vk::Format::D24_UNORM_S8_UINT, DepthUsage::Attachment),
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        );
        assert_eq!(depth_aspect(vk::Format::D32_SFLOAT, DepthUsage::Attachment), vk::ImageAspectFlags::DEPTH);
        assert_eq!(
            depth_aspect(vk::Format::D24_UNORM_S8_UINT, DepthUsage::SampledAttachment),
            vk::ImageAspectFlags::DEPTH
        );
    }
}
