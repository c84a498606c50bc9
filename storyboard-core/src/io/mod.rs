//! Project files and the image codecs they embed.

pub mod codec;
pub mod project;

pub use codec::{DecodeError, EncodeError};
pub use project::{Project, ProjectError};
