//! Sharp LS027B7DH01 memory LCD: wire protocol, framebuffer and SPI adapter.

pub mod display;
pub mod frame;
pub mod protocol;
