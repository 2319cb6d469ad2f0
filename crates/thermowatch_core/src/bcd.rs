//! Codec BCD (binary-coded decimal) dos registradores do RTC.
//!
//! Cada nibble de um byte BCD representa um dígito decimal (0–9):
//!
//! ```text
//! 0x59 → 5 (nibble alto) · 10 + 9 (nibble baixo) = 59
//! ```

/// Erros do codec BCD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BcdError {
    /// Um nibble fora de 0–9: leitura corrompida do registrador.
    #[error("Dígito BCD inválido em 0x{0:02X}")]
    InvalidBcdDigit(u8),

    /// Inteiro fora de 0–99 não cabe em um byte BCD.
    #[error("Valor fora do intervalo BCD: {0} (0–99)")]
    OutOfRange(i32),
}

/// Decodifica um byte BCD para inteiro.
pub fn decode(byte: u8) -> Result<u8, BcdError> {
    let high = byte >> 4;
    let low = byte & 0x0F;
    if high > 9 || low > 9 {
        return Err(BcdError::InvalidBcdDigit(byte));
    }
    Ok(high * 10 + low)
}

/// Codifica um inteiro 0–99 em BCD.
pub fn encode(value: i32) -> Result<u8, BcdError> {
    if !(0..=99).contains(&value) {
        return Err(BcdError::OutOfRange(value));
    }
    let value = value as u8;
    Ok(((value / 10) << 4) | (value % 10))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_registers() {
        assert_eq!(decode(0x00), Ok(0));
        assert_eq!(decode(0x22), Ok(22));
        assert_eq!(decode(0x59), Ok(59));
        assert_eq!(decode(0x99), Ok(99));
    }

    #[test]
    fn every_valid_byte_survives_encode() {
        for high in 0..=9u8 {
            for low in 0..=9u8 {
                let byte = (high << 4) | low;
                let value = decode(byte).unwrap();
                assert_eq!(encode(value as i32), Ok(byte));
            }
        }
    }

    #[test]
    fn rejects_nibbles_above_nine() {
        for byte in 0..=u8::MAX {
            if (byte >> 4) > 9 || (byte & 0x0F) > 9 {
                assert_eq!(decode(byte), Err(BcdError::InvalidBcdDigit(byte)));
            }
        }
    }

    #[test]
    fn encode_rejects_out_of_range() {
        assert_eq!(encode(-1), Err(BcdError::OutOfRange(-1)));
        assert_eq!(encode(100), Err(BcdError::OutOfRange(100)));
        assert_eq!(encode(34), Ok(0x34));
    }
}
