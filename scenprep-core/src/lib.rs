pub mod document;
pub mod projection;
pub mod time;
pub mod util;

mod error;

pub use error::DocumentError;
