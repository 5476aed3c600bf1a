// Domain-layer modules and shared errors/models
pub mod form {
    pub use crate::form::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod ui_state {
    pub use crate::ui_state::*;
}

pub mod errors {
    pub use crate::errors::*;
}
