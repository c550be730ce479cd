//! LS027B7DH01 serial command layout.

pub const WIDTH: usize = 400;
pub const HEIGHT: usize = 240;
pub const LINE_BYTES: usize = WIDTH / 8;
pub const BUFFER_SIZE: usize = LINE_BYTES * HEIGHT;

const MODE_WRITE: u8 = 0x80;
const MODE_CLEAR: u8 = 0x20;
const VCOM: u8 = 0x40;

/// First byte of a transfer. `vcom` must alternate between transfers.
pub const fn command(write: bool, vcom: bool) -> u8 {
    let mode = if write { MODE_WRITE } else { MODE_CLEAR };
    if vcom { mode | VCOM } else { mode }
}

/// Gate address for panel line 1..=240, sent LSB first.
pub fn line_address(line: u16) -> Option<u8> {
    if !(1..=HEIGHT as u16).contains(&line) {
        return None;
    }
    Some((line as u8).reverse_bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_bits() {
        assert_eq!(command(true, false), 0x80);
        assert_eq!(command(true, true), 0xC0);
        assert_eq!(command(false, false), 0x20);
        assert_eq!(command(false, true), 0x60);
    }

    #[test]
    fn line_addresses_are_bit_reversed() {
        assert_eq!(line_address(1), Some(0x80));
        assert_eq!(line_address(3), Some(0xC0));
        assert_eq!(line_address(240), Some(0x0F));
        assert_eq!(line_address(0), None);
        assert_eq!(line_address(241), None);
    }
}
