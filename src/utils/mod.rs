pub mod coordinate;
pub mod image;
pub mod staging;
pub mod utils;
pub mod video;
