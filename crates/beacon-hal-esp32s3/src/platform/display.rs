use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};

use super::{
    frame::FrameBuffer,
    protocol::{self, HEIGHT, LINE_BYTES},
};

const CS_SETUP_NS: u32 = 3_000;
const CS_HOLD_NS: u32 = 1_000;
const CLEAR_HOLD_NS: u32 = 220_000;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DisplayError<SpiErr, DispErr, EmdErr, CsErr> {
    Spi(SpiErr),
    Disp(DispErr),
    Emd(EmdErr),
    Cs(CsErr),
    Protocol,
}

pub type SharpDisplayResult<T, SpiErr, DispErr, EmdErr, CsErr> =
    Result<T, DisplayError<SpiErr, DispErr, EmdErr, CsErr>>;

/// Board adapter for the LS027B7DH01 with software VCOM (EMD held low).
///
/// Keeps a copy of the last frame sent so marquee frames only push the rows
/// that actually changed.
#[derive(Debug)]
pub struct SharpDisplay<SPI, DISP, EMD, CS> {
    spi: SPI,
    disp: DISP,
    emd: EMD,
    cs: CS,
    vcom_high: bool,
    sent: FrameBuffer,
    primed: bool,
}

impl<SPI, DISP, EMD, CS> SharpDisplay<SPI, DISP, EMD, CS>
where
    SPI: SpiBus<u8>,
    DISP: OutputPin,
    EMD: OutputPin,
    CS: OutputPin,
{
    pub fn new(spi: SPI, disp: DISP, emd: EMD, cs: CS) -> Self {
        Self {
            spi,
            disp,
            emd,
            cs,
            vcom_high: false,
            sent: FrameBuffer::new(),
            primed: false,
        }
    }

    pub fn initialize<D>(
        &mut self,
        delay: &mut D,
    ) -> SharpDisplayResult<(), SPI::Error, DISP::Error, EMD::Error, CS::Error>
    where
        D: DelayNs,
    {
        self.disp.set_high().map_err(DisplayError::Disp)?;
        self.emd.set_low().map_err(DisplayError::Emd)?;
        self.cs.set_low().map_err(DisplayError::Cs)?;

        delay.delay_us(60);
        Ok(())
    }

    pub fn clear_all<D>(
        &mut self,
        delay: &mut D,
    ) -> SharpDisplayResult<(), SPI::Error, DISP::Error, EMD::Error, CS::Error>
    where
        D: DelayNs,
    {
        let command = self.next_command(false);
        self.begin(delay)?;
        self.spi
            .write(&[command, 0x00])
            .map_err(DisplayError::Spi)?;
        self.spi.flush().map_err(DisplayError::Spi)?;
        delay.delay_ns(CLEAR_HOLD_NS);
        self.cs.set_low().map_err(DisplayError::Cs)?;

        self.primed = false;
        Ok(())
    }

    /// Writes every row.
    pub fn flush_frame<D>(
        &mut self,
        frame: &FrameBuffer,
        delay: &mut D,
    ) -> SharpDisplayResult<usize, SPI::Error, DISP::Error, EMD::Error, CS::Error>
    where
        D: DelayNs,
    {
        self.primed = false;
        self.flush_changed(frame, delay)
    }

    /// Writes only rows whose content differs from the last flush.
    /// Returns the number of rows sent.
    pub fn flush_changed<D>(
        &mut self,
        frame: &FrameBuffer,
        delay: &mut D,
    ) -> SharpDisplayResult<usize, SPI::Error, DISP::Error, EMD::Error, CS::Error>
    where
        D: DelayNs,
    {
        let changed = (0..HEIGHT).filter(|&row| self.row_stale(frame, row)).count();
        if changed == 0 {
            return Ok(0);
        }

        let command = self.next_command(true);
        self.begin(delay)?;
        self.spi.write(&[command]).map_err(DisplayError::Spi)?;

        // [address][50 data bytes][dummy]
        let mut packet = [0u8; LINE_BYTES + 2];
        for row in 0..HEIGHT {
            if !self.row_stale(frame, row) {
                continue;
            }
            let bytes = frame.row(row).ok_or(DisplayError::Protocol)?;
            packet[0] = protocol::line_address(row as u16 + 1).ok_or(DisplayError::Protocol)?;
            packet[1..1 + LINE_BYTES].copy_from_slice(bytes);
            self.spi.write(&packet).map_err(DisplayError::Spi)?;
        }

        self.spi.write(&[0x00]).map_err(DisplayError::Spi)?;
        self.spi.flush().map_err(DisplayError::Spi)?;
        delay.delay_ns(CS_HOLD_NS);
        self.cs.set_low().map_err(DisplayError::Cs)?;

        self.sent.clone_from(frame);
        self.primed = true;
        Ok(changed)
    }

    /// Toggles VCOM without touching pixel memory. Needed about once a second
    /// while the image is static.
    pub fn refresh_vcom<D>(
        &mut self,
        delay: &mut D,
    ) -> SharpDisplayResult<(), SPI::Error, DISP::Error, EMD::Error, CS::Error>
    where
        D: DelayNs,
    {
        self.vcom_high = !self.vcom_high;
        let command = if self.vcom_high { 0x40 } else { 0x00 };

        self.begin(delay)?;
        self.spi
            .write(&[command, 0x00])
            .map_err(DisplayError::Spi)?;
        self.spi.flush().map_err(DisplayError::Spi)?;
        delay.delay_ns(CS_HOLD_NS);
        self.cs.set_low().map_err(DisplayError::Cs)
    }

    fn next_command(&mut self, write: bool) -> u8 {
        self.vcom_high = !self.vcom_high;
        protocol::command(write, self.vcom_high)
    }

    fn row_stale(&self, frame: &FrameBuffer, row: usize) -> bool {
        !self.primed || frame.row(row) != self.sent.row(row)
    }

    fn begin<D>(
        &mut self,
        delay: &mut D,
    ) -> SharpDisplayResult<(), SPI::Error, DISP::Error, EMD::Error, CS::Error>
    where
        D: DelayNs,
    {
        self.cs.set_high().map_err(DisplayError::Cs)?;
        delay.delay_ns(CS_SETUP_NS);
        Ok(())
    }
}
