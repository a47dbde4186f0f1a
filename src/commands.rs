use thiserror::Error;

pub const HELP_TEXT: &str = "🤖 Comandos disponibles:\n\n\
    📸 Enviar foto: procesa un comprobante automáticamente.\n\n\
    💸 /pago [monto] [nombre]: registra un pago manual.\n\
    Ej: /pago 5000 Rodrigo\n\n\
    📉 /deuda [monto] [nombre]: crea una nueva deuda.\n\
    Ej: /deuda 20000 Monica";

pub const UNKNOWN_TEXT: &str =
    "No entiendo ese comando. Usa /help para ver las opciones o envíame una foto.";

pub const PHOTO_PROMPT: &str =
    "Por favor envía una imagen del comprobante o usa un comando de texto.";

/// User input errors. The message is shown to the user verbatim and no
/// record is created.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("⚠️ Uso incorrecto.\nEjemplo: {0}")]
    Usage(&'static str),
    #[error("⚠️ El monto debe ser un número válido.")]
    BadAmount,
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Pago { amount: f64, recipient: String },
    Deuda { amount: f64, name: String },
    Help,
    Unknown,
}

/// Dispatches on the first whitespace token, case-insensitively. The
/// router itself performs no side effects; it either yields a fully
/// validated command or a user-visible error.
pub fn parse(text: &str) -> Result<Command, CommandError> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    let Some(first) = parts.first() else {
        return Ok(Command::Unknown);
    };

    match first.to_lowercase().as_str() {
        "/pago" => {
            let (amount, rest) = amount_and_name(&parts, "/pago 5000 Rodrigo")?;
            Ok(Command::Pago {
                amount,
                recipient: rest,
            })
        }
        "/deuda" => {
            let (amount, rest) = amount_and_name(&parts, "/deuda 20000 Monica")?;
            Ok(Command::Deuda { amount, name: rest })
        }
        "/help" | "/ayuda" => Ok(Command::Help),
        _ => Ok(Command::Unknown),
    }
}

fn amount_and_name(parts: &[&str], example: &'static str) -> Result<(f64, String), CommandError> {
    if parts.len() < 3 {
        return Err(CommandError::Usage(example));
    }

    let amount: f64 = parts[1].parse().map_err(|_| CommandError::BadAmount)?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(CommandError::BadAmount);
    }

    Ok((amount, parts[2..].join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_manual_payment() {
        assert_eq!(
            parse("/pago 5000 Rodrigo"),
            Ok(Command::Pago {
                amount: 5000.0,
                recipient: "Rodrigo".to_string()
            })
        );
    }

    #[test]
    fn joins_multi_word_names() {
        assert_eq!(
            parse("/deuda 20000 Monica Lagos"),
            Ok(Command::Deuda {
                amount: 20000.0,
                name: "Monica Lagos".to_string()
            })
        );
    }

    #[test]
    fn commands_are_case_insensitive() {
        assert!(matches!(parse("/PAGO 100 Ana"), Ok(Command::Pago { .. })));
        assert_eq!(parse("/AYUDA"), Ok(Command::Help));
        assert_eq!(parse("/help"), Ok(Command::Help));
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        assert_eq!(parse("/pago abc Rodrigo"), Err(CommandError::BadAmount));
    }

    #[test]
    fn negative_amount_is_rejected() {
        assert_eq!(parse("/pago -50 Rodrigo"), Err(CommandError::BadAmount));
    }

    #[test]
    fn missing_arguments_show_usage() {
        assert_eq!(
            parse("/pago 5000"),
            Err(CommandError::Usage("/pago 5000 Rodrigo"))
        );
        assert_eq!(
            parse("/deuda"),
            Err(CommandError::Usage("/deuda 20000 Monica"))
        );
    }

    #[test]
    fn unrecognized_text_is_unknown() {
        assert_eq!(parse("hola"), Ok(Command::Unknown));
        assert_eq!(parse("/saldo"), Ok(Command::Unknown));
        assert_eq!(parse("   "), Ok(Command::Unknown));
    }
}
