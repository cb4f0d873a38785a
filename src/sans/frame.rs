//! FT 1.2 framing constants and the frame header.

use zerocopy::FromBytes;

/// Start byte of an FT 1.2 variable-length frame, repeated after the length.
pub const START_BYTE: u8 = 0x68;
/// End byte of an FT 1.2 frame.
pub const END_BYTE: u8 = 0x16;
/// Main-service code of BAOS object server telegrams.
pub const MAIN_SERVICE: u8 = 0xF0;

/// Number of leading offsets searched for a frame.
pub const SCAN_WINDOW: usize = 5;
/// A shorter buffer cannot hold a serial BAOS telegram.
pub const MIN_TELEGRAM_LEN: usize = 10;
/// Length of the FT 1.2 header: start, length, length, start, control.
pub const HEADER_LEN: usize = 5;

wire_enum! {
    /// FT 1.2 control byte, encoding direction and frame-count parity.
    pub enum ControlByte: u8 {
        TxOdd = 0x73 => "TX - Odd",
        TxEven = 0x53 => "TX - Even",
        RxOdd = 0xF3 => "RX - Odd",
        RxEven = 0xD3 => "RX - Even",
    }
}

impl ControlByte {
    /// Whether the frame was sent by the host towards the device.
    pub const fn is_tx(self) -> bool {
        matches!(self, Self::TxOdd | Self::TxEven)
    }
}

/// The five bytes opening an FT 1.2 variable-length frame.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes)]
pub struct FrameHeader {
    pub start: u8,
    pub length: u8,
    pub length_repeat: u8,
    pub start_repeat: u8,
    pub control: u8,
}

impl FrameHeader {
    pub fn new(r: [u8; HEADER_LEN]) -> Self {
        zerocopy::transmute!(r)
    }

    /// Length of the BAOS payload, excluding the control byte.
    pub const fn payload_len(&self) -> usize {
        self.length.saturating_sub(1) as usize
    }
}
