//! Tipos compartilhados: unidade de tempo selecionada e parâmetros de
//! enquadramento da linha serial.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ──────────────────────────────────────────────
// Seleção de unidade de tempo
// ──────────────────────────────────────────────

/// Unidade do relógio selecionada para incremento/decremento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    /// Próxima seleção ao pressionar o botão de ciclo.
    ///
    /// Sem seleção (ou após `Seconds`) volta para `Hours`.
    pub fn cycle(current: Option<TimeUnit>) -> TimeUnit {
        match current {
            Some(TimeUnit::Hours) => TimeUnit::Minutes,
            Some(TimeUnit::Minutes) => TimeUnit::Seconds,
            Some(TimeUnit::Seconds) | None => TimeUnit::Hours,
        }
    }

    /// Quantidade de valores válidos da unidade (60 ou 24).
    pub fn modulus(self) -> i32 {
        match self {
            TimeUnit::Hours => 24,
            TimeUnit::Minutes | TimeUnit::Seconds => 60,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Hours => "horas",
            TimeUnit::Minutes => "minutos",
            TimeUnit::Seconds => "segundos",
        }
    }
}

// ──────────────────────────────────────────────
// Enquadramento serial
// ──────────────────────────────────────────────

/// Erros de validação dos parâmetros seriais.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FramingError {
    #[error("Baud rate não suportado: {0} (9600, 19200, 38400, 57600)")]
    BaudRate(u32),

    #[error("Número de bits inválido: {0} (7 ou 8)")]
    DataBits(u8),

    #[error("Paridade inválida: {0:?} (NONE, EVEN, ODD)")]
    Parity(String),

    #[error("Stop bits inválido: {0} (1 ou 2)")]
    StopBits(u8),
}

/// Baud rates aceitos pelo microcontrolador remoto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BaudRate {
    B9600,
    B19200,
    B38400,
    B57600,
}

impl BaudRate {
    pub fn bps(self) -> u32 {
        match self {
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B57600 => 57600,
        }
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = FramingError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            9600 => Ok(BaudRate::B9600),
            19200 => Ok(BaudRate::B19200),
            38400 => Ok(BaudRate::B38400),
            57600 => Ok(BaudRate::B57600),
            other => Err(FramingError::BaudRate(other)),
        }
    }
}

impl From<BaudRate> for u32 {
    fn from(baud: BaudRate) -> u32 {
        baud.bps()
    }
}

/// Bits de dados por caractere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DataBits {
    Seven,
    Eight,
}

impl DataBits {
    pub fn count(self) -> u8 {
        match self {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

impl TryFrom<u8> for DataBits {
    type Error = FramingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            7 => Ok(DataBits::Seven),
            8 => Ok(DataBits::Eight),
            other => Err(FramingError::DataBits(other)),
        }
    }
}

impl From<DataBits> for u8 {
    fn from(bits: DataBits) -> u8 {
        bits.count()
    }
}

/// Paridade da linha serial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl Parity {
    /// Código numérico usado no pacote de reconfiguração.
    ///
    /// O mapeamento (EVEN=1, NONE=2, ODD=0) é o que o firmware remoto espera.
    pub fn wire_code(self) -> u8 {
        match self {
            Parity::Even => 1,
            Parity::None => 2,
            Parity::Odd => 0,
        }
    }
}

impl FromStr for Parity {
    type Err = FramingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Parity::None),
            "EVEN" => Ok(Parity::Even),
            "ODD" => Ok(Parity::Odd),
            _ => Err(FramingError::Parity(s.to_string())),
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Parity::None => "NONE",
            Parity::Even => "EVEN",
            Parity::Odd => "ODD",
        };
        f.write_str(name)
    }
}

/// Stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StopBits {
    One,
    Two,
}

impl StopBits {
    pub fn count(self) -> u8 {
        match self {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }
}

impl TryFrom<u8> for StopBits {
    type Error = FramingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(StopBits::One),
            2 => Ok(StopBits::Two),
            other => Err(FramingError::StopBits(other)),
        }
    }
}

impl From<StopBits> for u8 {
    fn from(stop: StopBits) -> u8 {
        stop.count()
    }
}

/// Parâmetros completos de enquadramento (baud/bits/paridade/stop).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialFraming {
    pub baud_rate: BaudRate,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl Default for SerialFraming {
    fn default() -> Self {
        Self {
            baud_rate: BaudRate::B9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl SerialFraming {
    /// Valida valores crus (ex: vindos do console do operador).
    pub fn new(baud: u32, bits: u8, parity: &str, stop: u8) -> Result<Self, FramingError> {
        Ok(Self {
            baud_rate: BaudRate::try_from(baud)?,
            data_bits: DataBits::try_from(bits)?,
            parity: parity.parse()?,
            stop_bits: StopBits::try_from(stop)?,
        })
    }
}

impl fmt::Display for SerialFraming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} baud, {} bits, {}, {} stop",
            self.baud_rate.bps(),
            self.data_bits.count(),
            self.parity,
            self.stop_bits.count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_cycles_hours_minutes_seconds() {
        let first = TimeUnit::cycle(None);
        let second = TimeUnit::cycle(Some(first));
        let third = TimeUnit::cycle(Some(second));
        let fourth = TimeUnit::cycle(Some(third));
        assert_eq!(
            [first, second, third, fourth],
            [TimeUnit::Hours, TimeUnit::Minutes, TimeUnit::Seconds, TimeUnit::Hours]
        );
    }

    #[test]
    fn parity_wire_codes() {
        assert_eq!(Parity::Even.wire_code(), 1);
        assert_eq!(Parity::None.wire_code(), 2);
        assert_eq!(Parity::Odd.wire_code(), 0);
    }

    #[test]
    fn framing_validation() {
        let framing = SerialFraming::new(19200, 7, "even", 2).unwrap();
        assert_eq!(framing.baud_rate, BaudRate::B19200);
        assert_eq!(framing.parity, Parity::Even);
        assert_eq!(
            SerialFraming::new(115200, 8, "NONE", 1),
            Err(FramingError::BaudRate(115200))
        );
        assert_eq!(
            SerialFraming::new(9600, 6, "NONE", 1),
            Err(FramingError::DataBits(6))
        );
        assert!(matches!(
            SerialFraming::new(9600, 8, "MARK", 1),
            Err(FramingError::Parity(_))
        ));
        assert_eq!(
            SerialFraming::new(9600, 8, "ODD", 3),
            Err(FramingError::StopBits(3))
        );
    }
}
