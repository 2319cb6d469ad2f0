//! Acesso ao RTC (DS3231) via registradores I2C.
//!
//! Mapa usado pelo monitor:
//!
//! | Reg. | Conteúdo                         |
//! |------|----------------------------------|
//! | 0    | segundos (BCD)                   |
//! | 1    | minutos (BCD)                    |
//! | 2    | horas (BCD, modo 24 h)           |
//! | 3    | dia da semana (BCD, não usado)   |
//! | 17   | temperatura interna (°C, i8)     |

use crate::bcd::{self, BcdError};
use crate::clock::{ClockError, ClockTime};
use crate::types::TimeUnit;
use embedded_hal::i2c::I2c;
use tracing::debug;

/// Endereço I2C padrão do DS3231.
pub const DEFAULT_ADDRESS: u8 = 0x68;

pub const REG_SECONDS: u8 = 0;
pub const REG_MINUTES: u8 = 1;
pub const REG_HOURS: u8 = 2;
pub const REG_DAY: u8 = 3;
pub const REG_TEMPERATURE: u8 = 17;

/// Erros de acesso ao RTC.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RtcError {
    #[error("Erro no barramento I2C: {0}")]
    Bus(String),

    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error("Registrador {register} corrompido: {source}")]
    Bcd {
        register: u8,
        #[source]
        source: BcdError,
    },
}

/// Leitura/escrita de registradores de um byte.
pub trait RtcBus {
    fn read_register(&mut self, register: u8) -> Result<u8, RtcError>;
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), RtcError>;
}

/// DS3231 sobre qualquer barramento `embedded-hal` I2C.
pub struct Ds3231<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Ds3231<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RtcBus for Ds3231<I> {
    fn read_register(&mut self, register: u8) -> Result<u8, RtcError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(|e| RtcError::Bus(format!("leitura reg {register}: {e:?}")))?;
        Ok(buf[0])
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), RtcError> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|e| RtcError::Bus(format!("escrita reg {register}: {e:?}")))
    }
}

/// Registrador correspondente a uma unidade de tempo.
pub fn register_for(unit: TimeUnit) -> u8 {
    match unit {
        TimeUnit::Seconds => REG_SECONDS,
        TimeUnit::Minutes => REG_MINUTES,
        TimeUnit::Hours => REG_HOURS,
    }
}

/// Lê e decodifica o horário atual (registradores 0–2).
pub fn read_clock<B: RtcBus + ?Sized>(bus: &mut B) -> Result<ClockTime, RtcError> {
    let seconds = bus.read_register(REG_SECONDS)?;
    let minutes = bus.read_register(REG_MINUTES)?;
    let hours = bus.read_register(REG_HOURS)?;
    Ok(ClockTime::from_registers(seconds, minutes, hours)?)
}

/// Lê o sensor de temperatura interno (°C, complemento de dois).
pub fn read_temperature<B: RtcBus + ?Sized>(bus: &mut B) -> Result<i8, RtcError> {
    Ok(bus.read_register(REG_TEMPERATURE)? as i8)
}

/// Soma `delta` à unidade selecionada, dando a volta dentro da faixa
/// da unidade. Retorna o novo valor decimal gravado.
pub fn adjust<B: RtcBus + ?Sized>(bus: &mut B, unit: TimeUnit, delta: i32) -> Result<u8, RtcError> {
    let register = register_for(unit);
    let raw = bus.read_register(register)?;
    let current = bcd::decode(raw).map_err(|source| RtcError::Bcd { register, source })?;
    let next = (current as i32 + delta).rem_euclid(unit.modulus());
    let encoded = bcd::encode(next).map_err(|source| RtcError::Bcd { register, source })?;
    bus.write_register(register, encoded)?;
    debug!("RTC {}: {current} → {next}", unit.label());
    Ok(next as u8)
}

/// Zera segundos, minutos, horas e dia.
pub fn reset<B: RtcBus + ?Sized>(bus: &mut B) -> Result<(), RtcError> {
    for register in [REG_SECONDS, REG_MINUTES, REG_HOURS, REG_DAY] {
        bus.write_register(register, 0)?;
    }
    Ok(())
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// RTC falso com 19 registradores.
    #[derive(Debug, Default)]
    pub(crate) struct FakeRtc {
        pub regs: [u8; 19],
        pub writes: Vec<(u8, u8)>,
        pub fail_reads: bool,
    }

    impl RtcBus for FakeRtc {
        fn read_register(&mut self, register: u8) -> Result<u8, RtcError> {
            if self.fail_reads {
                return Err(RtcError::Bus("NACK".into()));
            }
            Ok(self.regs[register as usize])
        }

        fn write_register(&mut self, register: u8, value: u8) -> Result<(), RtcError> {
            self.regs[register as usize] = value;
            self.writes.push((register, value));
            Ok(())
        }
    }

    /// Barramento I2C falso que simula o ponteiro de registrador do chip.
    struct FakeI2c {
        address: u8,
        regs: [u8; 19],
        pointer: usize,
    }

    impl ErrorType for FakeI2c {
        type Error = ErrorKind;
    }

    impl I2c for FakeI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if address != self.address {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        if let Some((&reg, data)) = bytes.split_first() {
                            self.pointer = reg as usize;
                            for (i, b) in data.iter().enumerate() {
                                self.regs[self.pointer + i] = *b;
                            }
                        }
                    }
                    Operation::Read(buf) => {
                        for (i, b) in buf.iter_mut().enumerate() {
                            *b = self.regs[self.pointer + i];
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn ds3231_reads_and_writes_registers() {
        let mut regs = [0u8; 19];
        regs[REG_SECONDS as usize] = 0x15;
        regs[REG_MINUTES as usize] = 0x30;
        regs[REG_HOURS as usize] = 0x08;
        regs[REG_TEMPERATURE as usize] = 25;
        let mut rtc = Ds3231::new(
            FakeI2c {
                address: DEFAULT_ADDRESS,
                regs,
                pointer: 0,
            },
            DEFAULT_ADDRESS,
        );

        assert_eq!(read_clock(&mut rtc).unwrap().to_string(), "08:30:15");
        assert_eq!(read_temperature(&mut rtc).unwrap(), 25);

        rtc.write_register(REG_MINUTES, 0x45).unwrap();
        assert_eq!(rtc.release().regs[REG_MINUTES as usize], 0x45);
    }

    #[test]
    fn wrong_address_is_bus_error() {
        let mut rtc = Ds3231::new(
            FakeI2c {
                address: 0x57,
                regs: [0; 19],
                pointer: 0,
            },
            DEFAULT_ADDRESS,
        );
        assert!(matches!(rtc.read_register(0), Err(RtcError::Bus(_))));
    }

    #[test]
    fn negative_temperature_is_signed() {
        let mut rtc = FakeRtc::default();
        rtc.regs[REG_TEMPERATURE as usize] = 0xF6;
        assert_eq!(read_temperature(&mut rtc).unwrap(), -10);
    }

    #[test]
    fn adjust_writes_bcd_and_wraps() {
        let mut rtc = FakeRtc::default();
        rtc.regs[REG_HOURS as usize] = 0x09;
        assert_eq!(adjust(&mut rtc, TimeUnit::Hours, 1).unwrap(), 10);
        assert_eq!(rtc.regs[REG_HOURS as usize], 0x10);

        rtc.regs[REG_MINUTES as usize] = 0x59;
        assert_eq!(adjust(&mut rtc, TimeUnit::Minutes, 1).unwrap(), 0);
        assert_eq!(rtc.regs[REG_MINUTES as usize], 0x00);

        rtc.regs[REG_SECONDS as usize] = 0x00;
        assert_eq!(adjust(&mut rtc, TimeUnit::Seconds, -1).unwrap(), 59);
        assert_eq!(rtc.regs[REG_SECONDS as usize], 0x59);

        rtc.regs[REG_HOURS as usize] = 0x00;
        assert_eq!(adjust(&mut rtc, TimeUnit::Hours, -1).unwrap(), 23);
        assert_eq!(rtc.regs[REG_HOURS as usize], 0x23);
    }

    #[test]
    fn adjust_refuses_corrupted_register() {
        let mut rtc = FakeRtc::default();
        rtc.regs[REG_SECONDS as usize] = 0x5F;
        assert!(matches!(
            adjust(&mut rtc, TimeUnit::Seconds, 1),
            Err(RtcError::Bcd { register: 0, .. })
        ));
        assert!(rtc.writes.is_empty());
    }

    #[test]
    fn reset_zeroes_time_registers() {
        let mut rtc = FakeRtc::default();
        rtc.regs[..4].copy_from_slice(&[0x12, 0x34, 0x05, 0x03]);
        reset(&mut rtc).unwrap();
        assert_eq!(&rtc.regs[..4], &[0, 0, 0, 0]);
        assert_eq!(rtc.writes.len(), 4);
    }
}
