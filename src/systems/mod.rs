//! The ordered system pipeline
//!
//! Each system is one pass over the entities holding the component types it
//! names, executed in a fixed order every tick:
//!
//! state -> oscillate -> power -> aim -> trajectory -> score -> clear ->
//! physics -> render
//!
//! A system that cannot find a required component on an entity skips that
//! entity silently; that is how entities opt out of behaviors.

pub mod aim;
pub mod clear;
pub mod oscillate;
pub mod physics;
pub mod power;
pub mod render;
pub mod score;
pub mod state;
pub mod trajectory;
