#![cfg_attr(not(test), no_std)]

//! ESP32-S3 board glue for the Beacon handheld: GPIO buttons, Wi-Fi state,
//! the inbox HTTP client, the Sharp memory LCD and the buzzer.

pub mod audio;
pub mod input;
pub mod network;
pub mod platform;
pub mod render;
