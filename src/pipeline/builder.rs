//! The pipeline builder is used to easily create graphics pipelines correctly.
//!
//! # Example
//! ```
//! # use umbra::*;
//! # use anyhow::Result;
//! # fn build(device: Device, layout: &PipelineLayout, render_pass: &RenderPass, vertex: ShaderCreateInfo) -> Result<Pipeline> {
//! let pipeline = PipelineBuilder::new("shadow")
//!     .vertex_input(0, vk::VertexInputRate::VERTEX)
//!     .vertex_attribute(0, 0, vk::Format::R32G32B32_SFLOAT)?
//!     .attach_shader(vertex)
//!     .depth(true, true, vk::CompareOp::LESS_OR_EQUAL)
//!     .depth_bias(true)
//!     .dynamic_states(&[vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR, vk::DynamicState::DEPTH_BIAS])
//!     .build(device, layout, render_pass)?;
//! # Ok(pipeline)
//! # }
//! ```

use std::collections::HashMap;
use std::ffi::CString;

use anyhow::Result;
use ash::vk;

use crate::{ByteSize, Device, Error, Pipeline, PipelineLayout, RenderPass, Shader, ShaderCreateInfo};

/// Collects the fixed function state, vertex layout and shaders of a graphics pipeline.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    name: String,
    vertex_bindings: Vec<vk::VertexInputBindingDescription>,
    vertex_attributes: Vec<vk::VertexInputAttributeDescription>,
    vertex_binding_offsets: HashMap<u32, u32>,
    shaders: Vec<ShaderCreateInfo>,
    rasterizer: vk::PipelineRasterizationStateCreateInfo,
    depth_stencil: vk::PipelineDepthStencilStateCreateInfo,
    blend_attachments: Vec<vk::PipelineColorBlendAttachmentState>,
    dynamic_states: Vec<vk::DynamicState>,
}

impl PipelineBuilder {
    /// Start a new triangle list pipeline with no culling, counter-clockwise front faces, no depth testing
    /// and no color attachments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertex_bindings: vec![],
            vertex_attributes: vec![],
            vertex_binding_offsets: Default::default(),
            shaders: vec![],
            rasterizer: vk::PipelineRasterizationStateCreateInfo::builder()
                .polygon_mode(vk::PolygonMode::FILL)
                .cull_mode(vk::CullModeFlags::NONE)
                .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
                .line_width(1.0)
                .build(),
            depth_stencil: vk::PipelineDepthStencilStateCreateInfo::builder()
                .depth_compare_op(vk::CompareOp::ALWAYS)
                .build(),
            blend_attachments: vec![],
            dynamic_states: vec![],
        }
    }

    /// Add a vertex binding. Attributes for it are added with [`PipelineBuilder::vertex_attribute`].
    pub fn vertex_input(mut self, binding: u32, rate: vk::VertexInputRate) -> Self {
        self.vertex_binding_offsets.insert(binding, 0);
        self.vertex_bindings.push(vk::VertexInputBindingDescription {
            binding,
            stride: 0,
            input_rate: rate,
        });
        self
    }

    /// Add a tightly packed vertex attribute after the previous attributes of the binding. The stride of the binding grows accordingly.
    /// # Errors
    /// * Fails with [`Error::NoVertexBinding`] if the binding was not added first.
    /// * Fails with [`Error::Uncategorized`] if the format has no known size.
    pub fn vertex_attribute(mut self, binding: u32, location: u32, format: vk::Format) -> Result<Self> {
        let size = format
            .byte_size()
            .ok_or(Error::Uncategorized("vertex attribute format has no known size"))? as u32;
        let offset = self
            .vertex_binding_offsets
            .get_mut(&binding)
            .ok_or(Error::NoVertexBinding)?;
        self.vertex_attributes.push(vk::VertexInputAttributeDescription {
            location,
            binding,
            format,
            offset: *offset,
        });
        *offset += size;
        for description in self.vertex_bindings.iter_mut().filter(|d| d.binding == binding) {
            description.stride += size;
        }
        Ok(self)
    }

    /// Override the stride of a binding, for when the vertex buffer holds attributes this pipeline does not read.
    pub fn vertex_stride(mut self, binding: u32, stride: u32) -> Self {
        for description in self.vertex_bindings.iter_mut().filter(|d| d.binding == binding) {
            description.stride = stride;
        }
        self
    }

    pub fn attach_shader(mut self, info: ShaderCreateInfo) -> Self {
        self.shaders.push(info);
        self
    }

    pub fn depth_test(mut self, enable: bool) -> Self {
        self.depth_stencil.depth_test_enable = vk::Bool32::from(enable);
        self
    }

    pub fn depth_write(mut self, enable: bool) -> Self {
        self.depth_stencil.depth_write_enable = vk::Bool32::from(enable);
        self
    }

    pub fn depth_op(mut self, op: vk::CompareOp) -> Self {
        self.depth_stencil.depth_compare_op = op;
        self
    }

    pub fn depth(self, test: bool, write: bool, op: vk::CompareOp) -> Self {
        self.depth_test(test).depth_write(write).depth_op(op)
    }

    /// Enable depth bias. The factors themselves are set with the `DEPTH_BIAS` dynamic state.
    pub fn depth_bias(mut self, enable: bool) -> Self {
        self.rasterizer.depth_bias_enable = vk::Bool32::from(enable);
        self
    }

    pub fn dynamic_state(mut self, state: vk::DynamicState) -> Self {
        if !self.dynamic_states.contains(&state) {
            self.dynamic_states.push(state);
        }
        self
    }

    pub fn dynamic_states(mut self, states: &[vk::DynamicState]) -> Self {
        for state in states {
            self = self.dynamic_state(*state);
        }
        self
    }

    pub fn cull_mask(mut self, cull: vk::CullModeFlags) -> Self {
        self.rasterizer.cull_mode = cull;
        self
    }

    pub fn front_face(mut self, face: vk::FrontFace) -> Self {
        self.rasterizer.front_face = face;
        self
    }

    /// Add a color attachment with blending disabled that writes all components.
    pub fn blend_attachment_none(mut self) -> Self {
        self.blend_attachments.push(
            vk::PipelineColorBlendAttachmentState::builder()
                .blend_enable(false)
                .color_write_mask(vk::ColorComponentFlags::RGBA)
                .build(),
        );
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_bindings(&self) -> &[vk::VertexInputBindingDescription] {
        self.vertex_bindings.as_slice()
    }

    pub fn vertex_attributes(&self) -> &[vk::VertexInputAttributeDescription] {
        self.vertex_attributes.as_slice()
    }

    pub fn shaders(&self) -> &[ShaderCreateInfo] {
        self.shaders.as_slice()
    }

    pub fn dynamic_state_list(&self) -> &[vk::DynamicState] {
        self.dynamic_states.as_slice()
    }

    pub fn rasterization(&self) -> &vk::PipelineRasterizationStateCreateInfo {
        &self.rasterizer
    }

    pub fn depth_stencil(&self) -> &vk::PipelineDepthStencilStateCreateInfo {
        &self.depth_stencil
    }

    pub fn color_attachment_count(&self) -> usize {
        self.blend_attachments.len()
    }

    /// Create the pipeline for the first subpass of `render_pass`. Shader modules only live for this call.
    pub fn build(self, device: Device, layout: &PipelineLayout, render_pass: &RenderPass) -> Result<Pipeline> {
        let entry_point = CString::new("main")?;
        let modules = self
            .shaders
            .iter()
            .map(|info| Shader::new(device.clone(), info))
            .collect::<Result<Vec<_>>>()?;
        let stages = modules
            .iter()
            .map(|module| {
                vk::PipelineShaderStageCreateInfo::builder()
                    .stage(module.stage())
                    .module(unsafe { module.handle() })
                    .name(&entry_point)
                    .build()
            })
            .collect::<Vec<_>>();

        let vertex_input = vk::PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(&self.vertex_bindings)
            .vertex_attribute_descriptions(&self.vertex_attributes);
        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::builder().topology(vk::PrimitiveTopology::TRIANGLE_LIST);
        // Viewport and scissor are dynamic, only the counts matter here.
        let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
            .viewport_count(1)
            .scissor_count(1);
        let multisample =
            vk::PipelineMultisampleStateCreateInfo::builder().rasterization_samples(vk::SampleCountFlags::TYPE_1);
        let blend_state = vk::PipelineColorBlendStateCreateInfo::builder()
            .logic_op_enable(false)
            .attachments(&self.blend_attachments);
        let dynamic_state = vk::PipelineDynamicStateCreateInfo::builder().dynamic_states(&self.dynamic_states);

        let info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&self.rasterizer)
            .multisample_state(&multisample)
            .depth_stencil_state(&self.depth_stencil)
            .color_blend_state(&blend_state)
            .dynamic_state(&dynamic_state)
            .layout(unsafe { layout.handle() })
            .render_pass(unsafe { render_pass.handle() })
            .subpass(0)
            .build();

        let handle = unsafe {
            device
                .create_graphics_pipelines(vk::PipelineCache::null(), std::slice::from_ref(&info), None)
                .map_err(Error::from)?
        }
        .into_iter()
        .next()
        .ok_or(Error::Uncategorized("pipeline creation returned no pipeline"))?;
        debug!("Created pipeline {}", self.name);

        Ok(Pipeline::new(device, handle, self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_are_packed_in_order() {
        let builder = PipelineBuilder::new("packed")
            .vertex_input(0, vk::VertexInputRate::VERTEX)
            .vertex_attribute(0, 0, vk::Format::R32G32B32_SFLOAT)
            .unwrap()
            .vertex_attribute(0, 1, vk::Format::R32G32_SFLOAT)
            .unwrap()
            .vertex_attribute(0, 2, vk::Format::R32G32B32_SFLOAT)
            .unwrap();
        let offsets = builder.vertex_attributes().iter().map(|a| a.offset).collect::<Vec<_>>();
        assert_eq!(offsets, vec![0, 12, 20]);
        assert_eq!(builder.vertex_bindings()[0].stride, 32);
    }

    #[test]
    fn stride_override_keeps_offsets() {
        let builder = PipelineBuilder::new("position only")
            .vertex_input(0, vk::VertexInputRate::VERTEX)
            .vertex_attribute(0, 0, vk::Format::R32G32B32_SFLOAT)
            .unwrap()
            .vertex_stride(0, 44);
        assert_eq!(builder.vertex_bindings()[0].stride, 44);
        assert_eq!(builder.vertex_attributes()[0].offset, 0);
    }

    #[test]
    fn attribute_without_binding_fails() {
        let err = PipelineBuilder::new("unbound")
            .vertex_attribute(1, 0, vk::Format::R32_SFLOAT)
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NoVertexBinding)));
    }

    #[test]
    fn dynamic_states_are_not_duplicated() {
        let builder = PipelineBuilder::new("dynamic")
            .dynamic_states(&[vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR])
            .dynamic_state(vk::DynamicState::VIEWPORT);
        assert_eq!(builder.dynamic_state_list(), &[vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR]);
    }

    #[test]
    fn depth_only_pipelines_have_no_color_attachments() {
        let builder = PipelineBuilder::new("depth").depth(true, true, vk::CompareOp::LESS_OR_EQUAL).depth_bias(true);
        assert_eq!(builder.color_attachment_count(), 0);
        assert_eq!(builder.depth_stencil().depth_compare_op, vk::CompareOp::LESS_OR_EQUAL);
        assert_eq!(builder.rasterization().depth_bias_enable, vk::TRUE);
    }
}
