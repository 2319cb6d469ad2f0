//! Rastreamento de episódios de superaquecimento.
//!
//! Máquina de estados `Idle ⇄ Overheating` avaliada uma vez por ciclo.
//! As comparações são estritas: uma leitura exatamente igual ao threshold
//! nunca provoca transição.

use crate::clock::{ClockTime, TimeValue};
use crate::observable::SubscriberError;
use tracing::{info, warn};

/// Estado do rastreador.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverheatState {
    #[default]
    Idle,
    Overheating,
}

/// Transição produzida por [`OverheatTracker::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverheatTransition {
    Started {
        at: ClockTime,
        temperature: f64,
    },
    Ended {
        at: ClockTime,
        temperature: f64,
        duration: ClockTime,
    },
}

/// Guarda apenas o episódio mais recente (início, fim, duração).
#[derive(Debug, Default)]
pub struct OverheatTracker {
    state: OverheatState,
    /// Horário em que o último episódio começou
    pub started: TimeValue,
    /// Horário em que a temperatura voltou ao normal
    pub ended: TimeValue,
    /// Duração do último episódio completo
    pub duration: TimeValue,
}

impl OverheatTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OverheatState {
        self.state
    }

    pub fn is_overheating(&self) -> bool {
        self.state == OverheatState::Overheating
    }

    /// Avalia a leitura atual contra o threshold.
    pub fn update(
        &mut self,
        temperature: f64,
        threshold: f64,
        now: ClockTime,
    ) -> Result<Option<OverheatTransition>, SubscriberError> {
        match self.state {
            OverheatState::Idle if temperature > threshold => {
                self.state = OverheatState::Overheating;
                warn!("Superaquecimento: {temperature:.1} > {threshold} às {now}");
                self.started.set_time(now)?;
                Ok(Some(OverheatTransition::Started {
                    at: now,
                    temperature,
                }))
            }
            OverheatState::Overheating if temperature < threshold => {
                self.state = OverheatState::Idle;
                let duration = now.difference(self.started.get());
                info!("Temperatura normalizada às {now} (duração {duration})");
                self.ended.set_time(now)?;
                self.duration.set_time(duration)?;
                Ok(Some(OverheatTransition::Ended {
                    at: now,
                    temperature,
                    duration,
                }))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn t(h: u8, m: u8, s: u8) -> ClockTime {
        ClockTime::new(h, m, s).unwrap()
    }

    #[test]
    fn one_episode_start_and_end() {
        let mut tracker = OverheatTracker::new();
        let (t0, t1, t2) = (t(10, 0, 0), t(10, 0, 5), t(10, 2, 0));

        assert_eq!(tracker.update(80.0, 85.0, t0).unwrap(), None);
        assert_eq!(
            tracker.update(90.0, 85.0, t1).unwrap(),
            Some(OverheatTransition::Started {
                at: t1,
                temperature: 90.0
            })
        );
        assert_eq!(
            tracker.update(80.0, 85.0, t2).unwrap(),
            Some(OverheatTransition::Ended {
                at: t2,
                temperature: 80.0,
                duration: t2.difference(&t1),
            })
        );
        assert_eq!(*tracker.started.get(), t1);
        assert_eq!(*tracker.ended.get(), t2);
        assert_eq!(tracker.duration.get().triple(), (55, 1, 0));
    }

    #[test]
    fn equal_reading_never_transitions() {
        let mut tracker = OverheatTracker::new();
        assert_eq!(tracker.update(85.0, 85.0, t(1, 0, 0)).unwrap(), None);
        assert_eq!(tracker.state(), OverheatState::Idle);

        tracker.update(86.0, 85.0, t(1, 0, 1)).unwrap();
        assert_eq!(tracker.update(85.0, 85.0, t(1, 0, 2)).unwrap(), None);
        assert!(tracker.is_overheating());
    }

    #[test]
    fn stays_overheating_without_repeating_start() {
        let mut tracker = OverheatTracker::new();
        let starts = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&starts);
        tracker.started.subscribe(move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        for s in 0..5 {
            tracker.update(95.0, 85.0, t(2, 0, s)).unwrap();
        }
        assert_eq!(*starts.borrow(), 1);
        assert_eq!(*tracker.started.get(), t(2, 0, 0));
    }

    #[test]
    fn only_latest_episode_is_kept() {
        let mut tracker = OverheatTracker::new();
        tracker.update(90.0, 85.0, t(3, 0, 0)).unwrap();
        tracker.update(70.0, 85.0, t(3, 0, 10)).unwrap();
        tracker.update(90.0, 85.0, t(4, 0, 0)).unwrap();
        tracker.update(70.0, 85.0, t(4, 1, 0)).unwrap();

        assert_eq!(*tracker.started.get(), t(4, 0, 0));
        assert_eq!(tracker.duration.get().triple(), (0, 1, 0));
    }

    #[test]
    fn episode_across_midnight_wraps() {
        let mut tracker = OverheatTracker::new();
        tracker.update(90.0, 85.0, t(23, 59, 50)).unwrap();
        tracker.update(80.0, 85.0, t(0, 0, 5)).unwrap();
        assert_eq!(tracker.duration.get().triple(), (15, 0, 0));
    }
}
