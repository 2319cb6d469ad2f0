//! Protocolo serial texto com o microcontrolador do sensor.
//!
//! Entrada (uma linha por ciclo, terminada em `\n`):
//!
//! ```text
//! ACTION:CBUT      incrementa a unidade selecionada
//! ACTION:RBUT      decrementa a unidade selecionada
//! ACTION:LBUT      cicla a unidade selecionada
//! TEMP:<float>     nova leitura do sensor principal
//! ```
//!
//! Saída (terminada em `$`, sem newline):
//!
//! ```text
//! T<int>$                          novo threshold de alerta
//! B<baud>,N<bits>,P<0|1|2>,S<stop>$   reconfiguração da UART remota
//! ```
//!
//! Os prefixos são testados em ordem e casam apenas o início da linha; o
//! resto da linha é ignorado.

use crate::types::SerialFraming;
use tracing::debug;

const INCREMENT_PREFIX: &str = "ACTION:CBUT";
const DECREMENT_PREFIX: &str = "ACTION:RBUT";
const CYCLE_PREFIX: &str = "ACTION:LBUT";
const TEMPERATURE_PREFIX: &str = "TEMP:";

/// Terminador dos pacotes de saída.
pub const PACKET_TERMINATOR: u8 = b'$';

/// Erros do protocolo de entrada. Nunca saem do parser: viram
/// [`TelemetryEvent::Unrecognized`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Leitura de temperatura malformada: {0:?}")]
    MalformedTemperature(String),
}

/// Botões físicos do painel remoto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Increment,
    Decrement,
    CycleSelection,
}

/// Evento decodificado de uma linha de telemetria.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryEvent {
    TemperatureReading(f64),
    Button(ButtonAction),
    Unrecognized,
}

/// Decodifica uma linha (pode ser vazia ou parcial).
pub fn parse_line(line: &str) -> TelemetryEvent {
    if line.starts_with(INCREMENT_PREFIX) {
        TelemetryEvent::Button(ButtonAction::Increment)
    } else if line.starts_with(DECREMENT_PREFIX) {
        TelemetryEvent::Button(ButtonAction::Decrement)
    } else if line.starts_with(CYCLE_PREFIX) {
        TelemetryEvent::Button(ButtonAction::CycleSelection)
    } else if let Some(payload) = line.strip_prefix(TEMPERATURE_PREFIX) {
        match parse_temperature(payload) {
            Ok(value) => TelemetryEvent::TemperatureReading(value),
            Err(e) => {
                debug!("{e}");
                TelemetryEvent::Unrecognized
            }
        }
    } else {
        TelemetryEvent::Unrecognized
    }
}

/// Extrai o numeral (`[0-9.]*`) do início do payload.
fn parse_temperature(payload: &str) -> Result<f64, ProtocolError> {
    let end = payload
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(payload.len());
    let numeral = &payload[..end];

    if !numeral.bytes().any(|b| b.is_ascii_digit()) {
        return Err(ProtocolError::MalformedTemperature(payload.to_string()));
    }
    numeral
        .parse::<f64>()
        .map_err(|_| ProtocolError::MalformedTemperature(payload.to_string()))
}

// ──────────────────────────────────────────────
// Pacotes de saída
// ──────────────────────────────────────────────

/// `T<value>$`
pub fn alert_threshold_packet(value: i32) -> Vec<u8> {
    format!("T{value}$").into_bytes()
}

/// `B<baud>,N<bits>,P<parity_code>,S<stop>$`
pub fn serial_reconfig_packet(framing: &SerialFraming) -> Vec<u8> {
    format!(
        "B{},N{},P{},S{}$",
        framing.baud_rate.bps(),
        framing.data_bits.count(),
        framing.parity.wire_code(),
        framing.stop_bits.count()
    )
    .into_bytes()
}

/// Envio do threshold por borda: só transmite quando o valor muda.
#[derive(Debug, Clone)]
pub struct ThresholdLink {
    last_sent: i32,
}

impl ThresholdLink {
    /// `initial` é o valor que o remoto já conhece (default da configuração).
    pub fn new(initial: i32) -> Self {
        Self { last_sent: initial }
    }

    /// Pacote a enviar, se o threshold mudou desde a última transmissão.
    pub fn pending(&self, threshold: i32) -> Option<Vec<u8>> {
        (threshold != self.last_sent).then(|| alert_threshold_packet(threshold))
    }

    /// Registra uma transmissão bem-sucedida.
    pub fn mark_sent(&mut self, threshold: i32) {
        self.last_sent = threshold;
    }

    pub fn last_sent(&self) -> i32 {
        self.last_sent
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
