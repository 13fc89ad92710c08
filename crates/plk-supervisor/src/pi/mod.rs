// crates/plk-supervisor/src/pi/mod.rs

pub mod channel;
pub mod image;

pub use channel::Channel;
pub use image::ProcessImage;
