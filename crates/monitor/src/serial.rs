//! Link serial real via `serialport`, orientado a linhas.

use serialport::{ClearBuffer, SerialPort};
use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};
use thermowatch_core::config::SerialConfig;
use thermowatch_core::transport::{SerialLink, TransportError};
use thermowatch_core::types::{DataBits, Parity, SerialFraming, StopBits};
use tracing::{debug, info, warn};

/// Comprimento máximo de uma linha de telemetria.
pub const MAX_LINE_LENGTH: usize = 128;

/// Junta bytes recebidos em linhas completas.
///
/// Linhas parciais ficam guardadas até o `\n` chegar; linhas maiores que
/// [`MAX_LINE_LENGTH`] são descartadas até o próximo `\n`.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Vec<u8>,
    lines: VecDeque<Vec<u8>>,
    overflowed: bool,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if byte == b'\n' {
                if self.overflowed {
                    self.overflowed = false;
                } else {
                    if self.pending.last() == Some(&b'\r') {
                        self.pending.pop();
                    }
                    if !self.pending.is_empty() {
                        self.lines.push_back(std::mem::take(&mut self.pending));
                    }
                }
                self.pending.clear();
                continue;
            }

            if self.overflowed {
                continue;
            }

            if self.pending.len() < MAX_LINE_LENGTH {
                self.pending.push(byte);
            } else {
                warn!("Linha serial excedeu {MAX_LINE_LENGTH} bytes, descartando");
                self.pending.clear();
                self.overflowed = true;
            }
        }
    }

    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        self.lines.pop_front()
    }

    pub fn reset(&mut self) {
        self.pending.clear();
        self.lines.clear();
        self.overflowed = false;
    }
}

/// Porta serial com leitura de linha limitada pelo timeout.
pub struct SerialPortLink {
    port: Box<dyn SerialPort>,
    assembler: LineAssembler,
    timeout: Duration,
}

impl SerialPortLink {
    pub fn open(config: &SerialConfig, timeout: Duration) -> Result<Self, TransportError> {
        let framing = config.framing();
        let port = serialport::new(&config.port, framing.baud_rate.bps())
            .data_bits(to_data_bits(framing.data_bits))
            .parity(to_parity(framing.parity))
            .stop_bits(to_stop_bits(framing.stop_bits))
            .timeout(timeout)
            .open()
            .map_err(|e| TransportError::Config(format!("{}: {e}", config.port)))?;

        info!("Serial aberta em {} ({framing})", config.port);
        Ok(Self {
            port,
            assembler: LineAssembler::new(),
            timeout,
        })
    }
}

impl SerialLink for SerialPortLink {
    fn read_line(&mut self) -> Result<Vec<u8>, TransportError> {
        let deadline = Instant::now() + self.timeout;
        let mut buf = [0u8; 64];

        loop {
            if let Some(line) = self.assembler.next_line() {
                return Ok(line);
            }
            let Some(remaining) = remaining_until(deadline, Instant::now()) else {
                return Err(TransportError::Timeout);
            };
            self.port
                .set_timeout(remaining)
                .map_err(|e| TransportError::Config(e.to_string()))?;
            match self.port.read(&mut buf) {
                Ok(0) => return Err(TransportError::Timeout),
                Ok(n) => {
                    debug!("← {n} bytes");
                    self.assembler.push(&buf[..n]);
                }
                Err(ref e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock => {
                    return Err(TransportError::Timeout);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(TransportError::Read(e.to_string())),
            }
        }
    }

    fn write_packet(&mut self, packet: &[u8]) -> Result<(), TransportError> {
        self.port
            .write_all(packet)
            .and_then(|()| self.port.flush())
            .map_err(|e| TransportError::Write(e.to_string()))?;
        debug!("→ {}", String::from_utf8_lossy(packet));
        Ok(())
    }

    fn apply_framing(&mut self, framing: &SerialFraming) -> Result<(), TransportError> {
        let config_err = |e: serialport::Error| TransportError::Config(e.to_string());
        self.port
            .set_baud_rate(framing.baud_rate.bps())
            .map_err(config_err)?;
        self.port
            .set_data_bits(to_data_bits(framing.data_bits))
            .map_err(config_err)?;
        self.port
            .set_parity(to_parity(framing.parity))
            .map_err(config_err)?;
        self.port
            .set_stop_bits(to_stop_bits(framing.stop_bits))
            .map_err(config_err)?;
        Ok(())
    }

    fn clear_buffers(&mut self) -> Result<(), TransportError> {
        self.assembler.reset();
        self.port
            .clear(ClearBuffer::All)
            .map_err(|e| TransportError::Config(e.to_string()))
    }
}

/// Tempo que ainda resta até `deadline`; `None` quando já passou.
fn remaining_until(deadline: Instant, now: Instant) -> Option<Duration> {
    deadline
        .checked_duration_since(now)
        .filter(|remaining| !remaining.is_zero())
}

fn to_data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn to_parity(parity: Parity) -> serialport::Parity {
    match parity {
        Parity::None => serialport::Parity::None,
        Parity::Even => serialport::Parity::Even,
        Parity::Odd => serialport::Parity::Odd,
    }
}

fn to_stop_bits(stop: StopBits) -> serialport::StopBits {
    match stop {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
    }
}
