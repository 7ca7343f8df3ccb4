//! Typing shooter simulation core.
//!
//! Letters fall down the field; typing a letter launches homing projectiles
//! at every enemy carrying it. Everything here is headless: the terminal
//! frontend lives in the binary.

pub mod clock;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod session;
