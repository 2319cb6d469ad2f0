//! Sistema de alertas – nível de alerta e volume do aviso sonoro.

/// Fundo de escala do ADC de 10 bits (MCP3008).
pub const MAX_ADC: u16 = 1023;

/// Nível de alerta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertLevel {
    Normal,
    Overheat,
}

/// Retorna o [`AlertLevel`] para uma leitura.
///
/// Diferente do rastreador de episódios, o alerta (texto piscando e som)
/// dispara já na igualdade.
pub fn level_for_value(temperature: f64, threshold: i32) -> AlertLevel {
    if temperature >= f64::from(threshold) {
        AlertLevel::Overheat
    } else {
        AlertLevel::Normal
    }
}

/// Converte a leitura crua do potenciômetro em volume 0.0–1.0.
pub fn volume_from_adc(raw: u16) -> f32 {
    (raw.min(MAX_ADC) as f32) / MAX_ADC as f32
}

/// Converte o registrador de temperatura do RTC (°C) para °F.
pub fn rtc_celsius_to_fahrenheit(raw: i8) -> f64 {
    f64::from(raw) * 1.8 + 32.0
}

/// Falha de leitura do ADC.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Falha ao ler o ADC: {0}")]
pub struct AnalogError(pub String);

/// Entrada analógica de um canal (0–1023), lida uma vez por ciclo.
pub trait AnalogInput {
    fn read(&mut self) -> Result<u16, AnalogError>;
}

/// Colaborador de áudio que toca o aviso.
pub trait AlertSound {
    fn set_volume(&mut self, level: f32);
    fn play(&mut self);
}
