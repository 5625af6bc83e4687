//! Pipeline configuration

mod mxbuild_toml;

pub use mxbuild_toml::Settings;
