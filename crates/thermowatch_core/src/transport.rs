//! Porta de comunicação serial com o microcontrolador do sensor.
//!
//! O core só conhece este trait; a implementação real (UART via
//! `serialport`) fica no binário e os testes usam um link roteirizado.

use crate::protocol::serial_reconfig_packet;
use crate::types::SerialFraming;
use std::time::Duration;
use tracing::info;

/// Erros de transporte.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Nenhuma linha completa dentro do timeout de leitura.
    #[error("Timeout de leitura")]
    Timeout,

    #[error("Falha de leitura: {0}")]
    Read(String),

    #[error("Falha de escrita: {0}")]
    Write(String),

    #[error("Falha ao configurar a porta: {0}")]
    Config(String),
}

/// Link serial orientado a linhas.
pub trait SerialLink {
    /// Lê uma linha (sem o terminador). Bloqueia no máximo o timeout
    /// configurado e retorna [`TransportError::Timeout`] se nada chegou.
    fn read_line(&mut self) -> Result<Vec<u8>, TransportError>;

    /// Escreve um pacote completo.
    fn write_packet(&mut self, packet: &[u8]) -> Result<(), TransportError>;

    /// Aplica novos parâmetros de enquadramento à porta local.
    fn apply_framing(&mut self, framing: &SerialFraming) -> Result<(), TransportError>;

    /// Descarta os buffers de entrada e saída.
    fn clear_buffers(&mut self) -> Result<(), TransportError>;
}

/// Reconfigura os dois lados da linha serial.
///
/// Envia o pacote de reconfiguração com o enquadramento atual, espera o
/// remoto assentar, aplica os novos parâmetros localmente e limpa os
/// buffers.
pub fn reconfigure<L: SerialLink + ?Sized>(
    link: &mut L,
    framing: &SerialFraming,
    settle: Duration,
) -> Result<(), TransportError> {
    let packet = serial_reconfig_packet(framing);
    info!(
        "Reconfigurando serial: {}",
        String::from_utf8_lossy(&packet)
    );
    link.write_packet(&packet)?;

    if !settle.is_zero() {
        std::thread::sleep(settle);
    }

    link.apply_framing(framing)?;
    link.clear_buffers()?;
    info!("Serial reconfigurada: {framing}");
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Link roteirizado: devolve as linhas enfileiradas e registra o resto.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedLink {
        pub incoming: VecDeque<Result<Vec<u8>, TransportError>>,
        pub written: Vec<Vec<u8>>,
        pub calls: Vec<&'static str>,
        pub framing: Option<SerialFraming>,
        pub fail_writes: bool,
    }

    impl ScriptedLink {
        pub fn with_lines(lines: &[&str]) -> Self {
            Self {
                incoming: lines.iter().map(|l| Ok(l.as_bytes().to_vec())).collect(),
                ..Default::default()
            }
        }
    }

    impl SerialLink for ScriptedLink {
        fn read_line(&mut self) -> Result<Vec<u8>, TransportError> {
            self.incoming.pop_front().unwrap_or(Err(TransportError::Timeout))
        }

        fn write_packet(&mut self, packet: &[u8]) -> Result<(), TransportError> {
            self.calls.push("write");
            if self.fail_writes {
                return Err(TransportError::Write("link down".into()));
            }
            self.written.push(packet.to_vec());
            Ok(())
        }

        fn apply_framing(&mut self, framing: &SerialFraming) -> Result<(), TransportError> {
            self.calls.push("apply");
            self.framing = Some(*framing);
            Ok(())
        }

        fn clear_buffers(&mut self) -> Result<(), TransportError> {
            self.calls.push("clear");
            Ok(())
        }
    }

    #[test]
    fn reconfigure_sends_then_applies_then_clears() {
        let mut link = ScriptedLink::default();
        let framing = SerialFraming::new(38400, 8, "ODD", 2).unwrap();

        reconfigure(&mut link, &framing, Duration::ZERO).unwrap();

        assert_eq!(link.calls, vec!["write", "apply", "clear"]);
        assert_eq!(link.written, vec![b"B38400,N8,P0,S2$".to_vec()]);
        assert_eq!(link.framing, Some(framing));
    }

    #[test]
    fn reconfigure_stops_on_write_failure() {
        let mut link = ScriptedLink {
            fail_writes: true,
            ..Default::default()
        };
        let err = reconfigure(&mut link, &SerialFraming::default(), Duration::ZERO).unwrap_err();
        assert!(matches!(err, TransportError::Write(_)));
        assert_eq!(link.calls, vec!["write"]);
        assert_eq!(link.framing, None);
    }
}
