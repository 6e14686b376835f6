pub mod frames;
pub mod timer;
