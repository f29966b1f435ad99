pub mod haar_cascade;
pub mod haar_cascade_detector;
mod integral_image;
