// Domain-layer modules and shared errors/models
pub mod analysis {
    pub use crate::opportunities::*;
    pub use crate::risks::*;
    pub use crate::scoring::*;
    pub use crate::stakeholders::*;
    pub use crate::trends::*;
}

pub mod pipeline {
    pub use crate::pipeline::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
