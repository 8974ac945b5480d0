pub mod command;
pub mod error;

/// Splits off the first whitespace-delimited word of a command line,
/// returning the word and the trimmed remainder.
pub fn cut_first_word(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    }
}

/// Permissive float parsing with C `atof` semantics: the longest numeric
/// prefix is parsed and anything malformed yields 0.0. Motion commands rely
/// on this observable behavior, so a bad argument becomes a zero setpoint
/// rather than an error.
pub fn parse_float(text: &str) -> f32 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let mut seen_digit = false;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        seen_digit = true;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            seen_digit = true;
        }
    }
    if !seen_digit {
        return 0.0;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        // "1.5e" or "1.5e-" keeps the mantissa only.
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::command::AxisCommand;
    use super::error::ProtocolError;
    use super::*;
    use crate::axis::config::ConfigKey;

    #[test]
    fn test_cut_first_word() {
        assert_eq!(cut_first_word("move 50.0"), ("move", "50.0"));
        assert_eq!(cut_first_word("  stop  "), ("stop", ""));
        assert_eq!(cut_first_word("set maxPos 120"), ("set", "maxPos 120"));
        assert_eq!(cut_first_word(""), ("", ""));
    }

    #[test]
    fn test_parse_float_well_formed() {
        assert_eq!(parse_float("50.0"), 50.0);
        assert_eq!(parse_float("-10"), -10.0);
        assert_eq!(parse_float("  3.5  "), 3.5);
        assert_eq!(parse_float("1e2"), 100.0);
        assert_eq!(parse_float("2.5e-1"), 0.25);
    }

    #[test]
    fn test_parse_float_prefix_semantics() {
        assert_eq!(parse_float("12abc"), 12.0);
        assert_eq!(parse_float("3.5garbage"), 3.5);
        assert_eq!(parse_float("1.5e"), 1.5);
        assert_eq!(parse_float("1.5e-"), 1.5);
    }

    #[test]
    fn test_parse_float_malformed_yields_zero() {
        assert_eq!(parse_float(""), 0.0);
        assert_eq!(parse_float("abc"), 0.0);
        assert_eq!(parse_float("-"), 0.0);
        assert_eq!(parse_float("."), 0.0);
    }

    #[test]
    fn test_parse_move_command() {
        assert_eq!(AxisCommand::parse("move 50.0"), Ok(AxisCommand::Move(50.0)));
        assert_eq!(AxisCommand::parse("speed -2"), Ok(AxisCommand::Speed(-2.0)));
        assert_eq!(
            AxisCommand::parse("torque 0.4"),
            Ok(AxisCommand::Torque(0.4))
        );
    }

    #[test]
    fn test_parse_bare_verbs() {
        assert_eq!(AxisCommand::parse("home"), Ok(AxisCommand::Home));
        assert_eq!(AxisCommand::parse("stop"), Ok(AxisCommand::Stop));
        assert_eq!(AxisCommand::parse("get"), Ok(AxisCommand::Get));
        // Missing numeric argument degrades to a zero setpoint.
        assert_eq!(AxisCommand::parse("move"), Ok(AxisCommand::Move(0.0)));
    }

    #[test]
    fn test_parse_set_command() {
        assert_eq!(
            AxisCommand::parse("set maxPos 120.0"),
            Ok(AxisCommand::Set {
                key: ConfigKey::MaxPos,
                value: "120.0".to_string()
            })
        );
        assert_eq!(
            AxisCommand::parse("set output 1"),
            Ok(AxisCommand::Set {
                key: ConfigKey::Output,
                value: "1".to_string()
            })
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            AxisCommand::parse("bogus 1.0"),
            Err(ProtocolError::UnknownCommand("bogus".to_string()))
        );
    }

    #[test]
    fn test_parse_unknown_setting() {
        assert_eq!(
            AxisCommand::parse("set gain 2.0"),
            Err(ProtocolError::UnknownSetting("gain".to_string()))
        );
    }
}
