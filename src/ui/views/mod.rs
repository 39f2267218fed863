pub mod deploy;
pub mod history;
pub mod plan;
pub mod state;
pub mod validation;
