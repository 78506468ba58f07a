pub mod engine;
pub mod lock;
