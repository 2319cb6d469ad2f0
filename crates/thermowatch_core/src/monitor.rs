//! Ciclo de polling do monitor.
//!
//! Cada ciclo é estritamente sequencial: threshold → RTC → linha serial →
//! rastreador de superaquecimento → alerta. Os periféricos são passados
//! por referência a cada ciclo; o [`Monitor`] não guarda handles de
//! hardware.

use crate::alerts::{self, AlertLevel, AnalogInput};
use crate::clock::{ClockTime, TimeValue};
use crate::observable::{Observable, SubscriberError};
use crate::overheat::{OverheatTracker, OverheatTransition};
use crate::protocol::{self, ButtonAction, TelemetryEvent, ThresholdLink};
use crate::rtc::{self, RtcBus, RtcError};
use crate::transport::{SerialLink, TransportError};
use crate::types::TimeUnit;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Erros de um ciclo de polling.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("RTC: {0}")]
    Rtc(#[from] RtcError),

    #[error("Serial: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Subscriber(#[from] SubscriberError),
}

/// Sinal de encerramento verificado na fronteira de cada ciclo.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Periféricos emprestados ao monitor durante um ciclo.
pub struct Peripherals<'a> {
    pub serial: &'a mut dyn SerialLink,
    pub rtc: &'a mut dyn RtcBus,
    pub adc: Option<&'a mut dyn AnalogInput>,
}

/// Resultado de um ciclo completo.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub time: ClockTime,
    pub event: TelemetryEvent,
    pub transition: Option<OverheatTransition>,
    pub alert: AlertLevel,
    /// Volume do aviso (0.0–1.0), se o ADC estiver disponível
    pub volume: Option<f32>,
}

/// Ganchos do loop executados antes e depois de cada ciclo.
pub trait CycleHooks {
    /// Aplica mudanças externas (threshold, reconfiguração serial).
    fn before_cycle(
        &mut self,
        _monitor: &mut Monitor,
        _io: &mut Peripherals<'_>,
    ) -> Result<(), MonitorError> {
        Ok(())
    }

    fn after_cycle(&mut self, _report: &CycleReport) {}
}

/// Estado do monitor: valores observáveis e rastreador de episódios.
pub struct Monitor {
    /// Sensor principal (°F), atualizado por linhas `TEMP:`
    pub sensor_temperature: Observable<f64>,
    /// Sensor interno do RTC (°F)
    pub rtc_temperature: Observable<f64>,
    /// Horário atual do RTC
    pub clock: TimeValue,
    /// Unidade selecionada para ajuste
    pub selection: Observable<Option<TimeUnit>>,
    pub overheat: OverheatTracker,
    alert_threshold: i32,
    threshold_link: ThresholdLink,
}

impl Monitor {
    /// `alert_threshold` é o valor inicial, já conhecido pelo remoto.
    pub fn new(alert_threshold: i32) -> Self {
        Self {
            sensor_temperature: Observable::new(0.0),
            rtc_temperature: Observable::new(0.0),
            clock: TimeValue::default(),
            selection: Observable::new(None),
            overheat: OverheatTracker::new(),
            alert_threshold,
            threshold_link: ThresholdLink::new(alert_threshold),
        }
    }

    pub fn alert_threshold(&self) -> i32 {
        self.alert_threshold
    }

    /// Altera o threshold; o pacote `T<n>$` sai no próximo ciclo.
    pub fn set_alert_threshold(&mut self, value: i32) {
        if value != self.alert_threshold {
            info!("Threshold de alerta: {} → {value}", self.alert_threshold);
        }
        self.alert_threshold = value;
    }

    /// Executa um ciclo de polling.
    pub fn poll(&mut self, io: &mut Peripherals<'_>) -> Result<CycleReport, MonitorError> {
        // ── Threshold (borda) ──
        if let Some(packet) = self.threshold_link.pending(self.alert_threshold) {
            io.serial.write_packet(&packet)?;
            self.threshold_link.mark_sent(self.alert_threshold);
            debug!("Threshold {} enviado", self.alert_threshold);
        }

        // ── RTC ──
        let now = rtc::read_clock(&mut *io.rtc)?;
        self.clock.set_time(now)?;
        let rtc_raw = rtc::read_temperature(&mut *io.rtc)?;

        // ── Linha serial ──
        let event = match io.serial.read_line() {
            Ok(bytes) => {
                let line = String::from_utf8_lossy(&bytes);
                let event = protocol::parse_line(&line);
                if event == TelemetryEvent::Unrecognized && !line.trim().is_empty() {
                    debug!("Linha ignorada: {line:?}");
                }
                event
            }
            Err(TransportError::Timeout) => TelemetryEvent::Unrecognized,
            Err(e) => return Err(e.into()),
        };
        self.apply_event(event, &mut *io.rtc)?;

        self.rtc_temperature
            .set(alerts::rtc_celsius_to_fahrenheit(rtc_raw))?;

        // ── Superaquecimento ──
        let temperature = *self.sensor_temperature.get();
        let threshold = f64::from(self.alert_threshold);
        let transition = self.overheat.update(temperature, threshold, now)?;

        // ── Alerta ──
        let volume = match io.adc.as_mut() {
            Some(adc) => match adc.read() {
                Ok(raw) => Some(alerts::volume_from_adc(raw)),
                Err(e) => {
                    warn!("{e}");
                    None
                }
            },
            None => None,
        };
        let alert = alerts::level_for_value(temperature, self.alert_threshold);

        Ok(CycleReport {
            time: now,
            event,
            transition,
            alert,
            volume,
        })
    }

    fn apply_event(
        &mut self,
        event: TelemetryEvent,
        rtc_bus: &mut dyn RtcBus,
    ) -> Result<(), MonitorError> {
        match event {
            TelemetryEvent::TemperatureReading(value) => {
                self.sensor_temperature.set(value)?;
            }
            TelemetryEvent::Button(ButtonAction::CycleSelection) => {
                let next = TimeUnit::cycle(*self.selection.get());
                debug!("Selecionado: {}", next.label());
                self.selection.set(Some(next))?;
            }
            TelemetryEvent::Button(action) => {
                let delta = if action == ButtonAction::Increment { 1 } else { -1 };
                match *self.selection.get() {
                    Some(unit) => {
                        rtc::adjust(rtc_bus, unit, delta)?;
                    }
                    None => debug!("Ajuste ignorado: nenhuma unidade selecionada"),
                }
            }
            TelemetryEvent::Unrecognized => {}
        }
        Ok(())
    }

    /// Roda ciclos até o encerramento ser solicitado.
    ///
    /// Um ciclo com erro é registrado e o loop espera `retry_delay` antes
    /// de tentar de novo; com `max_consecutive_failures > 0`, o loop para ao
    /// atingir esse número de falhas seguidas e devolve o último erro.
    pub fn run<H: CycleHooks>(
        &mut self,
        io: &mut Peripherals<'_>,
        hooks: &mut H,
        shutdown: &ShutdownSignal,
        max_consecutive_failures: u32,
        retry_delay: Duration,
    ) -> Result<(), MonitorError> {
        let mut failures = 0u32;

        while !shutdown.is_requested() {
            let result = hooks
                .before_cycle(self, io)
                .and_then(|()| self.poll(io));

            match result {
                Ok(report) => {
                    failures = 0;
                    hooks.after_cycle(&report);
                }
                Err(e) => {
                    failures += 1;
                    error!("Ciclo falhou ({failures} seguidos): {e}");
                    if max_consecutive_failures > 0 && failures >= max_consecutive_failures {
                        return Err(e);
                    }
                    if !retry_delay.is_zero() {
                        std::thread::sleep(retry_delay);
                    }
                }
            }
        }

        info!("Encerramento solicitado, saindo do loop");
        Ok(())
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
