//! External service integrations.

pub mod distribution {
    pub use crate::distribution::*;
}

pub mod circuit_breaker {
    pub use crate::circuit_breaker::*;
}
