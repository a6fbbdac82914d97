//! Milk Blaster: simulation core for a top-down arcade shooter.
//!
//! The library owns every rule of the game and nothing about how it is
//! drawn or heard. A frontend feeds `InputFrame`s into a `GameSession` once
//! per display frame and consumes the `Effect`s it returns.

pub mod audio;
pub mod compute;
pub mod config;
pub mod effects;
pub mod entities;
pub mod geometry;
pub mod hud;
pub mod input;
pub mod presentation;
pub mod session;
pub mod weapons;
