//! Name generators for folders and target files.

pub mod filename;
pub mod folder;
