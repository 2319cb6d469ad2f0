//! Horário de parede (HH:MM:SS) lido do RTC.
//!
//! O mesmo tipo representa também a duração de um episódio de
//! superaquecimento, já que a diferença é sempre calculada dentro de um
//! único dia de 24 h.

use crate::bcd::{self, BcdError};
use crate::observable::{Observable, SubscriberError};
use serde::{Deserialize, Serialize};
use std::fmt;

const SECONDS_PER_DAY: i32 = 24 * 60 * 60;

/// Erros de construção de um [`ClockTime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("Registrador de {field} corrompido: {source}")]
    Bcd {
        field: &'static str,
        #[source]
        source: BcdError,
    },

    #[error("Campo {field} fora do intervalo: {value} (máximo {max})")]
    FieldOutOfRange {
        field: &'static str,
        value: u8,
        max: u8,
    },
}

/// Horário do dia com segundos, minutos e horas limitados.
///
/// A desserialização passa por [`ClockTime::new`], então campos fora do
/// intervalo são rejeitados.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ClockFields", into = "ClockFields")]
pub struct ClockTime {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

#[derive(Serialize, Deserialize)]
struct ClockFields {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl TryFrom<ClockFields> for ClockTime {
    type Error = ClockError;

    fn try_from(f: ClockFields) -> Result<Self, Self::Error> {
        ClockTime::new(f.hours, f.minutes, f.seconds)
    }
}

impl From<ClockTime> for ClockFields {
    fn from(t: ClockTime) -> Self {
        Self {
            hours: t.hours,
            minutes: t.minutes,
            seconds: t.seconds,
        }
    }
}

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    pub fn new(hours: u8, minutes: u8, seconds: u8) -> Result<Self, ClockError> {
        check_field("horas", hours, 23)?;
        check_field("minutos", minutes, 59)?;
        check_field("segundos", seconds, 59)?;
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }

    /// Constrói a partir dos registradores BCD 0 (s), 1 (min) e 2 (h).
    pub fn from_registers(seconds: u8, minutes: u8, hours: u8) -> Result<Self, ClockError> {
        let seconds = decode_field("segundos", seconds)?;
        let minutes = decode_field("minutos", minutes)?;
        let hours = decode_field("horas", hours)?;
        Self::new(hours, minutes, seconds)
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    /// Tupla `(segundos, minutos, horas)` na ordem dos registradores.
    pub fn triple(&self) -> (u8, u8, u8) {
        (self.seconds, self.minutes, self.hours)
    }

    pub fn seconds_since_midnight(&self) -> i32 {
        self.hours as i32 * 3600 + self.minutes as i32 * 60 + self.seconds as i32
    }

    /// Tempo decorrido de `earlier` até `self` no mesmo dia.
    ///
    /// Se `earlier` for posterior a `self`, o resultado dá a volta pela
    /// meia-noite (aritmética módulo 24 h).
    pub fn difference(&self, earlier: &ClockTime) -> ClockTime {
        let total = (self.seconds_since_midnight() - earlier.seconds_since_midnight())
            .rem_euclid(SECONDS_PER_DAY);
        let hours = total / 3600;
        let rest = total % 3600;
        ClockTime {
            hours: hours as u8,
            minutes: (rest / 60) as u8,
            seconds: (rest % 60) as u8,
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

fn decode_field(field: &'static str, byte: u8) -> Result<u8, ClockError> {
    bcd::decode(byte).map_err(|source| ClockError::Bcd { field, source })
}

fn check_field(field: &'static str, value: u8, max: u8) -> Result<(), ClockError> {
    if value > max {
        return Err(ClockError::FieldOutOfRange { field, value, max });
    }
    Ok(())
}

/// Horário observável (relógio, início/fim do episódio, duração).
pub type TimeValue = Observable<ClockTime>;

impl Observable<ClockTime> {
    /// Publica um novo horário para os inscritos.
    pub fn set_time(&mut self, time: ClockTime) -> Result<(), SubscriberError> {
        self.set(time)
    }
}
