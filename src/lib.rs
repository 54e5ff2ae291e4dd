#![doc = include_str!("../README.md")]

mod channel_buffer;
mod config;
mod engine;
mod error;
mod handle;
mod mixing;
mod parameter;
mod spectral;
mod transform;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use handle::*;
pub use parameter::*;
pub use spectral::*;
pub use transform::*;

/// Returns the version of the Just Voice library.
///
/// # Example
///
/// ```rust
/// let version = just_voice::get_version();
/// println!("Just Voice version: {version}");
/// ```
pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    #[test]
    fn version_matches_crate_version() {
        assert_eq!(crate::get_version(), env!("CARGO_PKG_VERSION"));
        assert!(!crate::get_version().is_empty());
    }
}
