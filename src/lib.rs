pub mod backends;
pub mod chunker;
pub mod dynamics;
pub mod engine;
pub mod imperfection;
pub mod keycodes;
pub mod layout;

#[cfg(feature = "net")]
pub mod net;
pub mod profile;
pub mod protocol;
pub mod rng;
pub mod runner;
pub mod sink;
