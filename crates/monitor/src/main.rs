//! # Thermowatch Monitor
//!
//! Lê o RTC (I2C) e o sensor de temperatura remoto (serial), dispara o
//! aviso sonoro acima do threshold e registra quanto tempo durou cada
//! superaquecimento.
//!
//! ## Uso
//! ```bash
//! thermowatch_monitor                 # usa config.toml ao lado do executável
//! thermowatch_monitor /etc/thermo.toml
//! ```
//!
//! Comandos no stdin: `threshold <n>`, `serial <baud> <bits> <paridade> <stop>`,
//! `status`, `quit`.

mod adc;
mod console;
mod control;
mod display;
#[cfg(target_os = "linux")]
mod hardware;
mod serial;
mod sound;

use std::error::Error;
use std::path::PathBuf;
use thermowatch_core::config::AppConfig;
use tracing::{error, warn};

fn main() -> Result<(), Box<dyn Error>> {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Carregar config ──
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("Config: {e}");
        }
        return Err(format!("configuração inválida ({} erros)", errors.len()).into());
    }

    run(config)
}

#[cfg(target_os = "linux")]
fn run(config: AppConfig) -> Result<(), Box<dyn Error>> {
    use control::ControlHooks;
    use serial::SerialPortLink;
    use sound::BellSound;
    use thermowatch_core::alerts::AnalogInput;
    use thermowatch_core::monitor::{Monitor, Peripherals, ShutdownSignal};
    use thermowatch_core::rtc;
    use thermowatch_core::transport::SerialLink;
    use tracing::info;

    // ── Periféricos ──
    let mut rtc_dev = hardware::open_rtc(&config.rtc)?;
    if config.rtc.reset_on_start {
        rtc::reset(&mut rtc_dev)?;
        info!("RTC zerado");
    }

    let mut adc = if config.adc.enabled {
        match hardware::open_adc(&config.adc) {
            Ok(adc) => Some(adc),
            Err(e) => {
                warn!("ADC indisponível, volume fixo: {e}");
                None
            }
        }
    } else {
        None
    };

    let mut serial = SerialPortLink::open(&config.serial, config.monitor.read_timeout())?;
    serial.clear_buffers()?;

    // ── Estado + exibição ──
    let mut monitor = Monitor::new(config.monitor.alert_threshold);
    display::attach(&mut monitor);

    let shutdown = ShutdownSignal::new();
    let commands = console::spawn_console_thread()?;
    let mut hooks = ControlHooks::new(
        commands,
        BellSound::new(config.alert.sound_enabled),
        config.serial.framing(),
        config.serial.settle_delay(),
        shutdown.clone(),
    );

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   🌡  THERMOWATCH MONITOR – ATIVO");
    println!("══════════════════════════════════════════════");
    println!("  Serial:    {} ({})", config.serial.port, config.serial.framing());
    println!("  RTC:       {} @ 0x{:02X}", config.rtc.i2c_bus, config.rtc.address);
    println!("  Threshold: {}℉", config.monitor.alert_threshold);
    println!("══════════════════════════════════════════════");
    println!();

    // ── Loop principal ──
    let mut io = Peripherals {
        serial: &mut serial,
        rtc: &mut rtc_dev,
        adc: adc.as_mut().map(|a| a as &mut dyn AnalogInput),
    };
    monitor.run(
        &mut io,
        &mut hooks,
        &shutdown,
        config.monitor.max_consecutive_failures,
        config.monitor.read_timeout(),
    )?;

    info!("Monitor encerrado");
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn run(_config: AppConfig) -> Result<(), Box<dyn Error>> {
    Err("RTC (I2C) e ADC (SPI) só estão disponíveis no Linux".into())
}
