pub mod caption;
pub mod image_file;
pub mod jpeg;
