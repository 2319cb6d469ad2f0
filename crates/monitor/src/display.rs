//! Exibição via logs: inscreve callbacks nos valores observáveis do
//! monitor e registra cada atualização.

use thermowatch_core::clock::ClockTime;
use thermowatch_core::monitor::Monitor;
use thermowatch_core::types::TimeUnit;
use tracing::{debug, info};

/// Liga os valores do monitor aos logs.
pub fn attach(monitor: &mut Monitor) {
    monitor.sensor_temperature.subscribe(|t: &f64| {
        debug!("Sensor: {:.2}℉", t);
        Ok(())
    });
    monitor.rtc_temperature.subscribe(|t: &f64| {
        debug!("RTC: {:.2}℉", t);
        Ok(())
    });
    monitor.clock.subscribe(|time: &ClockTime| {
        debug!("Relógio: {time}");
        Ok(())
    });
    monitor.selection.subscribe(|unit: &Option<TimeUnit>| {
        if let Some(unit) = unit {
            info!("Ajuste do relógio: {}", unit.label());
        }
        Ok(())
    });
    monitor.overheat.started.subscribe(|time: &ClockTime| {
        info!("Último superaquecimento: {time}");
        Ok(())
    });
    monitor.overheat.ended.subscribe(|time: &ClockTime| {
        info!("Última vez normal: {time}");
        Ok(())
    });
    monitor.overheat.duration.subscribe(|time: &ClockTime| {
        info!("Tempo superaquecido: {time}");
        Ok(())
    });
}
