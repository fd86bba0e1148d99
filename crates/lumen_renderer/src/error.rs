//! Errors raised while setting up a render.
//!
//! Nothing on the per-ray path fails: misses, absorption and depth exhaustion
//! are ordinary results. These errors cover bad configuration and geometry
//! rejected at construction time.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
