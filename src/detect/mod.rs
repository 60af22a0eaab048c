//! Landmark detection boundary.
//!
//! Detection is performed by an external, pre-trained model treated as a
//! black box. This module only defines the boundary: the `LandmarkBackend`
//! trait, its result types, and pluggable backends (a scripted stub for
//! tests and camera-less runs, and an optional ONNX backend behind the
//! `backend-tract` feature).

mod backend;
mod backends;
mod result;

pub use backend::LandmarkBackend;
pub use backends::StubLandmarkBackend;
#[cfg(feature = "backend-tract")]
pub use backends::TractLandmarkBackend;
pub use result::{Landmark, SubjectLandmarks};
