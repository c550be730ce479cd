#![cfg_attr(not(test), no_std)]

//! Board-agnostic core of the Beacon status-message handheld.
//!
//! Everything here is driven by caller-supplied millisecond timestamps and
//! talks to the outside world through the [`input::ButtonSource`] and
//! [`sync::Transport`] seams, so the whole state machine runs on the host.

extern crate alloc;

pub mod app;
pub mod gesture;
pub mod input;
pub mod rate;
pub mod render;
pub mod scroll;
pub mod sync;
pub mod text_policy;
