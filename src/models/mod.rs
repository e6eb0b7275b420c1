pub mod knowledge;
mod lenient;
pub mod video;

pub use knowledge::*;
pub use video::*;
