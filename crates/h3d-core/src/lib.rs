pub mod config;
pub mod error;
pub mod tolerance;
pub mod traits;

pub use config::TessellationConfig;
pub use error::{H3dError, Result};
pub use tolerance::Tolerance;
pub use traits::Validate;
