//! Thread do console do operador: lê comandos do stdin e envia para o
//! loop de polling via channel.
//!
//! Comandos:
//! - `threshold <int>` – novo threshold de alerta (vazio = 0)
//! - `serial <baud> <bits> <paridade> <stop>` – reconfigura a UART
//! - `status` – imprime o estado atual
//! - `quit` – encerra o monitor

use crossbeam_channel::{Receiver, Sender, bounded};
use std::io::BufRead;
use thermowatch_core::types::SerialFraming;
use tracing::{info, warn};

/// Comando enviado do console para o loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Threshold(i32),
    Serial(SerialFraming),
    Status,
    Quit,
}

/// Interpreta uma linha digitada pelo operador.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(name) = parts.next() else {
        return Err("Comando vazio".into());
    };
    let args: Vec<&str> = parts.collect();

    match name.to_ascii_lowercase().as_str() {
        "threshold" | "t" => match args.as_slice() {
            [] => Ok(Command::Threshold(0)),
            [value] => value
                .parse()
                .map(Command::Threshold)
                .map_err(|_| format!("Threshold inválido: {value}")),
            _ => Err("Uso: threshold <int>".into()),
        },
        "serial" | "s" => match args.as_slice() {
            [baud, bits, parity, stop] => {
                let baud = baud.parse().map_err(|_| format!("Baud inválido: {baud}"))?;
                let bits = bits.parse().map_err(|_| format!("Bits inválido: {bits}"))?;
                let stop = stop.parse().map_err(|_| format!("Stop bits inválido: {stop}"))?;
                SerialFraming::new(baud, bits, parity, stop)
                    .map(Command::Serial)
                    .map_err(|e| e.to_string())
            }
            _ => Err("Uso: serial <baud> <bits> <NONE|EVEN|ODD> <stop>".into()),
        },
        "status" => Ok(Command::Status),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("Comando desconhecido: {other}")),
    }
}

/// Inicia a thread do console. Retorna o receiver do channel.
pub fn spawn_console_thread() -> std::io::Result<Receiver<Command>> {
    let (tx, rx) = bounded::<Command>(16);

    std::thread::Builder::new()
        .name("console".into())
        .spawn(move || console_loop(&tx))?;

    Ok(rx)
}

fn console_loop(tx: &Sender<Command>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Erro ao ler stdin: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(command) => {
                let quit = command == Command::Quit;
                if tx.send(command).is_err() {
                    // Loop principal já terminou
                    return;
                }
                if quit {
                    return;
                }
            }
            Err(e) => warn!("{e}"),
        }
    }
    info!("Console fechado (EOF)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use thermowatch_core::types::Parity;

    #[test]
    fn parses_threshold() {
        assert_eq!(parse_command("threshold 90"), Ok(Command::Threshold(90)));
        assert_eq!(parse_command("T -5"), Ok(Command::Threshold(-5)));
        assert_eq!(parse_command("threshold"), Ok(Command::Threshold(0)));
        assert!(parse_command("threshold hot").is_err());
    }

    #[test]
    fn parses_serial_framing() {
        let Ok(Command::Serial(framing)) = parse_command("serial 19200 7 even 2") else {
            panic!("esperado comando serial");
        };
        assert_eq!(framing.baud_rate.bps(), 19200);
        assert_eq!(framing.parity, Parity::Even);
        assert!(parse_command("serial 115200 8 NONE 1").is_err());
        assert!(parse_command("serial 9600 8").is_err());
    }

    #[test]
    fn parses_control_commands() {
        assert_eq!(parse_command("status"), Ok(Command::Status));
        assert_eq!(parse_command("QUIT"), Ok(Command::Quit));
        assert!(parse_command("reboot").is_err());
        assert!(parse_command("   ").is_err());
    }
}
