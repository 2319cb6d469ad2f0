//! Configuração unificada via TOML.
//!
//! Um único `config.toml` cobre o loop de monitoramento, a linha serial,
//! o RTC, o ADC do potenciômetro e o aviso sonoro.

use crate::rtc::DEFAULT_ADDRESS;
use crate::types::{BaudRate, DataBits, Parity, SerialFraming, StopBits};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Parâmetros do loop de monitoramento.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Threshold de alerta (mesma escala do sensor, °F)
    pub alert_threshold: i32,
    /// Timeout de leitura de uma linha serial (ms)
    pub read_timeout_ms: u64,
    /// Ciclos com erro seguidos antes de encerrar (0 = nunca)
    pub max_consecutive_failures: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            alert_threshold: 85,
            read_timeout_ms: 1000,
            max_consecutive_failures: 0,
        }
    }
}

impl MonitorConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Porta serial e enquadramento inicial.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Dispositivo (ex: "/dev/ttyAMA0")
    pub port: String,
    pub baud_rate: BaudRate,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    /// Espera após enviar um pacote de reconfiguração (ms)
    pub settle_delay_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        let framing = SerialFraming::default();
        Self {
            port: "/dev/ttyAMA0".into(),
            baud_rate: framing.baud_rate,
            data_bits: framing.data_bits,
            parity: framing.parity,
            stop_bits: framing.stop_bits,
            settle_delay_ms: 1000,
        }
    }
}

impl SerialConfig {
    pub fn framing(&self) -> SerialFraming {
        SerialFraming {
            baud_rate: self.baud_rate,
            data_bits: self.data_bits,
            parity: self.parity,
            stop_bits: self.stop_bits,
        }
    }

    pub fn set_framing(&mut self, framing: &SerialFraming) {
        self.baud_rate = framing.baud_rate;
        self.data_bits = framing.data_bits;
        self.parity = framing.parity;
        self.stop_bits = framing.stop_bits;
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// RTC no barramento I2C.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RtcConfig {
    pub i2c_bus: String,
    pub address: u8,
    /// Zera o relógio na inicialização
    pub reset_on_start: bool,
}

impl Default for RtcConfig {
    fn default() -> Self {
        Self {
            i2c_bus: "/dev/i2c-1".into(),
            address: DEFAULT_ADDRESS,
            reset_on_start: true,
        }
    }
}

/// ADC (MCP3008) ligado ao potenciômetro de volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdcConfig {
    pub enabled: bool,
    pub spi_device: String,
    pub channel: u8,
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spi_device: "/dev/spidev0.0".into(),
            channel: 0,
        }
    }
}

/// Aviso sonoro.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub sound_enabled: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
        }
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub monitor: MonitorConfig,
    pub serial: SerialConfig,
    pub rtc: RtcConfig,
    pub adc: AdcConfig,
    pub alert: AlertConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.monitor.read_timeout_ms == 0 || self.monitor.read_timeout_ms > 60_000 {
            errors.push(format!(
                "Timeout de leitura inválido: {} ms (1–60000)",
                self.monitor.read_timeout_ms
            ));
        }
        if self.serial.port.is_empty() {
            errors.push("Porta serial não pode ser vazia".into());
        }
        if self.rtc.i2c_bus.is_empty() {
            errors.push("Barramento I2C não pode ser vazio".into());
        }
        if self.rtc.address > 0x7F {
            errors.push(format!(
                "Endereço I2C inválido: 0x{:02X} (7 bits)",
                self.rtc.address
            ));
        }
        if self.adc.enabled && self.adc.channel > 7 {
            errors.push(format!("Canal do ADC inválido: {} (0–7)", self.adc.channel));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        let errors = config.validate();
        assert!(errors.is_empty(), "Erros: {:?}", errors);
        assert_eq!(config.monitor.alert_threshold, 85);
        assert_eq!(config.rtc.address, 0x68);
    }

    #[test]
    fn roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.serial.port, parsed.serial.port);
        assert_eq!(config.serial.framing(), parsed.serial.framing());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let partial = r#"
[serial]
baud_rate = 19200
parity = "EVEN"
"#;
        let config: AppConfig = toml::from_str(partial).unwrap();
        assert_eq!(config.serial.baud_rate, BaudRate::B19200);
        assert_eq!(config.serial.parity, Parity::Even);
        // Outros campos devem ter valor padrão
        assert_eq!(config.serial.data_bits, DataBits::Eight);
        assert_eq!(config.monitor.read_timeout_ms, 1000);
    }

    #[test]
    fn unsupported_framing_is_rejected() {
        assert!(toml::from_str::<AppConfig>("[serial]\nbaud_rate = 115200\n").is_err());
        assert!(toml::from_str::<AppConfig>("[serial]\nstop_bits = 3\n").is_err());
        assert!(toml::from_str::<AppConfig>("[serial]\nparity = \"MARK\"\n").is_err());
    }

    #[test]
    fn validate_reports_problems() {
        let mut config = AppConfig::default();
        config.monitor.read_timeout_ms = 0;
        config.adc.channel = 9;
        config.rtc.address = 0x90;
        assert_eq!(config.validate().len(), 3);
    }
}
