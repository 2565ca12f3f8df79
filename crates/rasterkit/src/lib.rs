#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use rasterkit_image as image;

#[doc(inline)]
pub use rasterkit_imgproc as imgproc;

#[doc(inline)]
pub use rasterkit_io as io;

/// Session level defaults loaded from JSON.
pub mod config;

/// The editing operations a session can apply.
pub mod operation;

/// The original and processed buffer pair of an editing session.
pub mod session;

pub use crate::config::{ConfigError, SessionConfig};
pub use crate::operation::Operation;
pub use crate::session::{Session, SessionError};
