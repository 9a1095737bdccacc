pub mod clock;
pub mod enums;
pub mod errors;
pub mod models;
pub mod state;
