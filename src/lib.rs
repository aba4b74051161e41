//! Wavescroll library - scrolling bar-graph audio visualization

pub mod analysis;
pub mod cli;
pub mod error;
pub mod params;
pub mod playback;
pub mod rendering;
pub mod timeline;
