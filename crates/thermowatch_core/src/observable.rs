//! Valor observável – publish/subscribe síncrono.
//!
//! Os colaboradores de exibição se inscrevem com callbacks; cada `set`
//! armazena o valor e chama todos os inscritos, em ordem de inscrição,
//! antes de retornar. Um inscrito que falha interrompe a notificação e o
//! erro volta para quem chamou `set`.

use std::fmt;

/// Falha reportada por um inscrito.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Inscrito falhou: {0}")]
pub struct SubscriberError(pub String);

impl SubscriberError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

type Callback<T> = Box<dyn FnMut(&T) -> Result<(), SubscriberError>>;

/// Valor com lista ordenada de callbacks.
pub struct Observable<T> {
    value: T,
    subscribers: Vec<Callback<T>>,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
        }
    }

    /// Valor mais recente.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Adiciona um inscrito ao final da lista.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&T) -> Result<(), SubscriberError> + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    /// Armazena o valor e notifica todos os inscritos.
    pub fn set(&mut self, value: T) -> Result<(), SubscriberError> {
        self.value = value;
        for callback in &mut self.subscribers {
            callback(&self.value)?;
        }
        Ok(())
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
