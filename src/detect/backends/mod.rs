mod stub;
#[cfg(feature = "backend-tract")]
mod tract;

pub use stub::StubLandmarkBackend;
#[cfg(feature = "backend-tract")]
pub use tract::TractLandmarkBackend;
