//! # Thermowatch Core
//!
//! Crate compartilhada com o núcleo de protocolo e estado do monitor de
//! temperatura: decodificação BCD dos registradores do RTC, protocolo
//! serial texto, rastreamento de superaquecimento e configuração TOML.
//!
//! ## Módulos
//! - [`bcd`] – Codec BCD dos registradores
//! - [`clock`] – Horário HH:MM:SS e diferença com volta na meia-noite
//! - [`observable`] – Valor com inscritos (publish/subscribe síncrono)
//! - [`protocol`] – Linhas de telemetria de entrada e pacotes de saída
//! - [`overheat`] – Máquina de estados do episódio de superaquecimento
//! - [`alerts`] – Nível de alerta, volume e colaboradores de áudio/ADC
//! - [`rtc`] – Registradores do DS3231 sobre `embedded-hal` I2C
//! - [`transport`] – Trait do link serial e sequência de reconfiguração
//! - [`types`] – Unidade de tempo e enquadramento serial
//! - [`config`] – Configuração unificada via TOML
//! - [`monitor`] – Ciclo de polling e sinal de encerramento

pub mod alerts;
pub mod bcd;
pub mod clock;
pub mod config;
pub mod monitor;
pub mod observable;
pub mod overheat;
pub mod protocol;
pub mod rtc;
pub mod transport;
pub mod types;

// Re-exports convenientes
pub use clock::{ClockTime, TimeValue};
pub use config::AppConfig;
pub use monitor::{CycleHooks, CycleReport, Monitor, MonitorError, Peripherals, ShutdownSignal};
pub use observable::Observable;
pub use protocol::{TelemetryEvent, parse_line};
pub use types::SerialFraming;
