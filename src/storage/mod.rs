//! On-disk bundle artifact.

mod artifact;

pub use artifact::{read_artifact, write_artifact, ArtifactFormat, FORMAT_VERSION, MAGIC};
