//! Serial transport for VC-C4 cameras.
//!
//! The camera's "VISCA" port runs at 9600 baud, 8 data bits, no parity, one
//! stop bit. Replies only arrive if the CTS line is connected.
use crate::{driver::Vcc4, protocol::Response, transport::Transport, Result};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::{
    io::{Read, Write},
    time::Duration,
};

pub struct Vcc4SerialChannel {
    port: Box<dyn SerialPort>,
}

impl Vcc4SerialChannel {
    pub const BAUD_RATE: u32 = 9600;

    /// How long a write may block for.
    const TIMEOUT: Duration = Duration::from_millis(100);

    /// Opens a serial port by name (eg: `/dev/ttyUSB0` or `COM3`).
    pub fn open(path: &str) -> Result<Self> {
        info!("opening {path}");
        let port = serialport::new(path, Self::BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Self::TIMEOUT)
            .open()?;
        Ok(Self::new(port))
    }

    /// Wraps an already-open serial port.
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }

    /// Reads whatever bytes are waiting, without blocking.
    ///
    /// Returns the number of bytes read into `buf`.
    pub fn poll(&mut self, buf: &mut [u8]) -> Result<usize> {
        let waiting = usize::try_from(self.port.bytes_to_read()?).unwrap_or(usize::MAX);
        if waiting == 0 {
            return Ok(0);
        }

        let l = waiting.min(buf.len());
        Ok(self.port.read(&mut buf[..l])?)
    }
}

impl Transport for Vcc4SerialChannel {
    fn send(&mut self, frame: &[u8]) -> Result {
        self.port.write_all(frame)?;
        self.port.flush()?;
        Ok(())
    }
}

impl Vcc4<Vcc4SerialChannel> {
    /// Moves any bytes waiting on the serial port into the driver.
    ///
    /// Call this before each [`tick()`][Self::tick].
    pub fn poll_serial(&mut self) -> Result<usize> {
        let mut b = [0; Response::MAX_LENGTH * 4];
        let l = self.transport_mut().poll(&mut b)?;
        if l > 0 {
            self.receive(&b[..l]);
        }
        Ok(l)
    }
}
