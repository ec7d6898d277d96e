pub mod cancel;
pub mod lifetime;
pub mod pending;
