//! Buffers, images and the depth attachments built from them.

pub mod attachment;
pub mod buffer;
pub mod image;
