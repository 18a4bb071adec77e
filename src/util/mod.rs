//! Various utilities

pub mod byte_size;
pub(crate) mod string;
