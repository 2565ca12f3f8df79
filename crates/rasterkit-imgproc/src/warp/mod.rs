mod affine;
pub use affine::*;

mod perspective;
pub use perspective::*;
