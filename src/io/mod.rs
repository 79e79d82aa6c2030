//! I/O layer: decode source images into RGB buffers and write transformed
//! results as JPEG or PNG according to the destination extension.
pub mod reader;
pub use reader::load_rgb_image;

pub mod writers;
pub use writers::save_rgb_image;
