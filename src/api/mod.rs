// Thin namespace wrapper for API-layer components
pub mod handlers {
    pub use crate::handlers::*;
}

pub mod plan_cache {
    pub use crate::plan_cache::*;
}
