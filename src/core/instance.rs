//! Exposes the Vulkan instance, which represents the loaded Vulkan library

use std::ffi::{c_char, CStr, CString};
use std::ops::Deref;

use anyhow::Result;
use ash::extensions::ext::DebugUtils;
use ash::vk;

use crate::util::string::unwrap_to_raw_strings;
use crate::AppSettings;

const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// The loaded Vulkan library and the `VkInstance` created from it. Dereferences to [`ash::Instance`].
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Instance {
    #[derivative(Debug = "ignore")]
    entry: ash::Entry,
    #[derivative(Debug = "ignore")]
    instance: ash::Instance,
}

impl Instance {
    /// Initializes the Vulkan API.
    /// # Errors
    /// * Can fail if the Vulkan loader was not found. Check for valid Vulkan drivers.
    /// * Can fail if an instance extension or layer was requested that is not supported. This can happen when
    ///   validation is enabled through [`AppSettings`], but the Vulkan SDK is not installed.
    pub fn new(settings: &AppSettings) -> Result<Self> {
        let entry = unsafe { ash::Entry::load()? };
        let instance = create_vk_instance(&entry, settings)?;
        #[cfg(feature = "log-objects")]
        trace!("Created new VkInstance {:p}", instance.handle());
        Ok(Instance {
            entry,
            instance,
        })
    }

    /// Get unsafe access to the vulkan entry point.
    /// # Safety
    /// Any vulkan calls that modify the system's state may put the system in an undefined state.
    pub unsafe fn loader(&self) -> &ash::Entry {
        &self.entry
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkInstance {:p}", self.instance.handle());
        unsafe {
            self.instance.destroy_instance(None);
        }
    }
}

impl Deref for Instance {
    type Target = ash::Instance;

    fn deref(&self) -> &Self::Target {
        &self.instance
    }
}

/// Layers and extensions the instance is created with.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct InstanceRequest {
    layers: Vec<CString>,
    extensions: Vec<CString>,
}

impl InstanceRequest {
    /// Validation adds the Khronos validation layer and `VK_EXT_debug_utils` for the debug messenger.
    fn new(validation: bool, surface_extensions: &[*const c_char]) -> Result<Self> {
        let mut request = Self::default();
        if validation {
            request.layers.push(CString::new(VALIDATION_LAYER)?);
            request.extensions.push(CString::from(DebugUtils::name()));
        }
        request.extensions.extend(
            surface_extensions
                .iter()
                .map(|&name| unsafe { CString::from(CStr::from_ptr(name)) }),
        );
        Ok(request)
    }
}

fn create_vk_instance(entry: &ash::Entry, settings: &AppSettings) -> Result<ash::Instance> {
    let app_name = CString::new(settings.name.as_str())?;
    let engine_name = CString::new(env!("CARGO_PKG_NAME"))?;
    let (major, minor, patch) = settings.version;
    let app_info = vk::ApplicationInfo::builder()
        .api_version(vk::API_VERSION_1_0)
        .application_name(&app_name)
        .application_version(vk::make_api_version(0, major, minor, patch))
        .engine_name(&engine_name)
        .engine_version(vk::make_api_version(
            0,
            env!("CARGO_PKG_VERSION_MAJOR").parse()?,
            env!("CARGO_PKG_VERSION_MINOR").parse()?,
            env!("CARGO_PKG_VERSION_PATCH").parse()?,
        ))
        .build();

    let surface_extensions = match settings.window {
        Some(window) => ash_window::enumerate_required_extensions(window.raw_display_handle())?,
        None => &[],
    };
    let request = InstanceRequest::new(settings.enable_validation, surface_extensions)?;
    info!("Enabled instance extensions: {:?}", request.extensions);
    if !request.layers.is_empty() {
        info!("Enabled instance layers: {:?}", request.layers);
    }

    let layers = unwrap_to_raw_strings(&request.layers);
    let extensions = unwrap_to_raw_strings(&request.extensions);
    let instance_info = vk::InstanceCreateInfo::builder()
        .application_info(&app_info)
        .enabled_layer_names(&layers)
        .enabled_extension_names(&extensions)
        .build();

    Ok(unsafe { entry.create_instance(&instance_info, None)? })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_without_validation_requests_nothing() {
        let request = InstanceRequest::new(false, &[]).unwrap();
        assert!(request.layers.is_empty());
        assert!(request.extensions.is_empty());
    }

    #[test]
    fn validation_adds_layer_and_debug_utils() {
        let surface = [ash::extensions::khr::Surface::name().as_ptr()];
        let request = InstanceRequest::new(true, &surface).unwrap();
        assert_eq!(request.layers, vec![CString::new(VALIDATION_LAYER).unwrap()]);
        assert_eq!(request.extensions[0].as_c_str(), DebugUtils::name());
        assert_eq!(request.extensions[1].as_c_str(), ash::extensions::khr::Surface::name());
    }
}
