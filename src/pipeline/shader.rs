//! SPIR-V shader loading and `VkShaderModule` wrappers.

use std::fs::File;
use std::path::Path;

use anyhow::Result;
use ash::vk;

use crate::{Device, Error};

/// A shader module. Only needs to live until the pipelines using it are created.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Shader {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::ShaderModule,
    stage: vk::ShaderStageFlags,
}

/// SPIR-V code for a single shader stage.
#[derive(Debug, Clone)]
pub struct ShaderCreateInfo {
    stage: vk::ShaderStageFlags,
    code: Vec<u32>,
}

impl ShaderCreateInfo {
    /// Wrap SPIR-V words for the given stage.
    pub fn from_spirv(stage: vk::ShaderStageFlags, code: Vec<u32>) -> Self {
        Self {
            stage,
            code,
        }
    }

    /// Read a SPIR-V binary from disk.
    /// # Errors
    /// Fails with [`Error::ShaderLoad`] if the file is missing, or its size or magic number is not valid SPIR-V.
    pub fn load(path: impl AsRef<Path>, stage: vk::ShaderStageFlags) -> Result<Self> {
        let path = path.as_ref();
        let code = File::open(path)
            .and_then(|mut file| ash::util::read_spv(&mut file))
            .map_err(|source| Error::ShaderLoad {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Loaded {stage:?} shader {} ({} words)", path.display(), code.len());
        Ok(Self::from_spirv(stage, code))
    }

    pub fn stage(&self) -> vk::ShaderStageFlags {
        self.stage
    }

    pub fn code(&self) -> &[u32] {
        self.code.as_slice()
    }
}

impl Shader {
    pub fn new(device: Device, info: &ShaderCreateInfo) -> Result<Self> {
        let create_info = vk::ShaderModuleCreateInfo::builder().code(info.code()).build();
        let handle = unsafe { device.create_shader_module(&create_info, None)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkShaderModule {handle:p}");
        Ok(Self {
            device,
            handle,
            stage: info.stage(),
        })
    }

    pub fn stage(&self) -> vk::ShaderStageFlags {
        self.stage
    }

    /// Get unsafe access to the underlying `VkShaderModule` handle.
    /// # Safety
    /// The caller must not destroy the module.
    pub unsafe fn handle(&self) -> vk::ShaderModule {
        self.handle
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkShaderModule {:p}", self.handle);
        unsafe {
            self.device.destroy_shader_module(self.handle, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_is_a_shader_load_error() {
        let err = ShaderCreateInfo::load("does/not/exist.spv", vk::ShaderStageFlags::VERTEX).unwrap_err();
        match err.downcast_ref::<Error>() {
            Some(Error::ShaderLoad {
                path,
                ..
            }) => assert_eq!(path, Path::new("does/not/exist.spv")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn truncated_spirv_is_rejected() {
        let path = std::env::temp_dir().join(format!("umbra-truncated-{}.spv", std::process::id()));
        File::create(&path).unwrap().write_all(&[0x03, 0x02, 0x23]).unwrap();
        let result = ShaderCreateInfo::load(&path, vk::ShaderStageFlags::FRAGMENT);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result.unwrap_err().downcast_ref::<Error>(), Some(Error::ShaderLoad { .. })));
    }

    #[test]
    fn valid_spirv_words_are_read() {
        let path = std::env::temp_dir().join(format!("umbra-valid-{}.spv", std::process::id()));
        let words: [u32; 2] = [0x0723_0203, 0x0001_0000];
        let bytes: Vec<u8> = words.iter().flat_map(|word| word.to_le_bytes()).collect();
        File::create(&path).unwrap().write_all(&bytes).unwrap();
        let info = ShaderCreateInfo::load(&path, vk::ShaderStageFlags::VERTEX).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(info.code(), &words);
        assert_eq!(info.stage(), vk::ShaderStageFlags::VERTEX);
    }
}
