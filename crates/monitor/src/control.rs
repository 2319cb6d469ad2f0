//! Ganchos do loop: aplica comandos do console antes de cada ciclo e
//! encaminha o alerta para o colaborador de áudio depois dele.

use crate::console::Command;
use crossbeam_channel::Receiver;
use std::time::Duration;
use thermowatch_core::alerts::{AlertLevel, AlertSound};
use thermowatch_core::monitor::{CycleHooks, CycleReport, Monitor, MonitorError, Peripherals, ShutdownSignal};
use thermowatch_core::transport;
use thermowatch_core::types::SerialFraming;
use tracing::info;

pub struct ControlHooks<S> {
    commands: Receiver<Command>,
    sound: S,
    framing: SerialFraming,
    settle_delay: Duration,
    shutdown: ShutdownSignal,
    last_report: Option<CycleReport>,
}

impl<S: AlertSound> ControlHooks<S> {
    pub fn new(
        commands: Receiver<Command>,
        sound: S,
        framing: SerialFraming,
        settle_delay: Duration,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            commands,
            sound,
            framing,
            settle_delay,
            shutdown,
            last_report: None,
        }
    }

    fn log_status(&self, monitor: &Monitor) {
        info!(
            "Status | Relógio {} | Sensor {:.2}℉ | RTC {:.2}℉ | Threshold {} | Serial {} | {}",
            monitor.clock.get(),
            monitor.sensor_temperature.get(),
            monitor.rtc_temperature.get(),
            monitor.alert_threshold(),
            self.framing,
            if monitor.overheat.is_overheating() {
                "SUPERAQUECENDO"
            } else {
                "normal"
            }
        );
        if let Some(report) = &self.last_report {
            info!("Último ciclo: {:?}", report.event);
        }
    }
}

impl<S: AlertSound> CycleHooks for ControlHooks<S> {
    fn before_cycle(
        &mut self,
        monitor: &mut Monitor,
        io: &mut Peripherals<'_>,
    ) -> Result<(), MonitorError> {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                Command::Threshold(value) => monitor.set_alert_threshold(value),
                Command::Serial(framing) => {
                    transport::reconfigure(&mut *io.serial, &framing, self.settle_delay)?;
                    self.framing = framing;
                }
                Command::Status => self.log_status(monitor),
                Command::Quit => {
                    info!("Encerramento pedido pelo console");
                    self.shutdown.request();
                }
            }
        }
        Ok(())
    }

    fn after_cycle(&mut self, report: &CycleReport) {
        if let Some(volume) = report.volume {
            self.sound.set_volume(volume);
        }
        if report.alert == AlertLevel::Overheat {
            self.sound.play();
        }
        self.last_report = Some(report.clone());
    }
}
