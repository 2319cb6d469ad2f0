//! Aviso sonoro no terminal (BEL) com volume vindo do potenciômetro.

use std::io::{self, Write};
use thermowatch_core::alerts::AlertSound;
use tracing::warn;

pub struct BellSound {
    enabled: bool,
    volume: f32,
}

impl BellSound {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            volume: 1.0,
        }
    }
}

impl AlertSound for BellSound {
    fn set_volume(&mut self, level: f32) {
        self.volume = level.clamp(0.0, 1.0);
    }

    fn play(&mut self) {
        if !self.enabled || self.volume == 0.0 {
            return;
        }
        warn!("🔔 ALERTA de temperatura (volume {:.0}%)", self.volume * 100.0);
        if let Err(e) = ring(&mut std::io::stdout()) {
            warn!("Falha ao tocar o aviso sonoro: {e}");
        }
    }
}

fn ring(out: &mut impl Write) -> io::Result<()> {
    out.write_all(b"\x07")?;
    out.flush()
}
