//! Hex text frames.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("Invalid hex digit '{digit}' in '{token}'")]
    InvalidDigit { token: String, digit: char },

    #[error("Odd number of hex digits in '{token}'")]
    OddLength { token: String },
}

/// Parse one line of a hex capture.
///
/// Blank lines and lines starting with `#` yield `Ok(None)`. Bytes may be
/// separated by whitespace, `:` or `,`, and each group may carry a `0x`
/// prefix.
pub fn parse_hex_line(line: &str) -> Result<Option<Vec<u8>>, HexError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut bytes = Vec::new();
    for token in line
        .split(|c: char| c.is_whitespace() || c == ':' || c == ',')
        .filter(|t| !t.is_empty())
    {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if digits.chars().count() % 2 != 0 {
            return Err(HexError::OddLength {
                token: token.to_string(),
            });
        }

        let mut chars = digits.chars();
        while let (Some(hi), Some(lo)) = (chars.next(), chars.next()) {
            bytes.push((hex_digit(hi, token)? << 4) | hex_digit(lo, token)?);
        }
    }

    Ok(Some(bytes))
}

fn hex_digit(digit: char, token: &str) -> Result<u8, HexError> {
    digit
        .to_digit(16)
        .map(|d| d as u8)
        .ok_or_else(|| HexError::InvalidDigit {
            token: token.to_string(),
            digit,
        })
}

/// Format bytes as space separated upper case hex.
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators_and_prefixes() {
        let expected = Some(vec![0x00, 0x05, 0x07, 0x00, 0x03]);
        assert_eq!(parse_hex_line("00 05 07 00 03").unwrap(), expected);
        assert_eq!(parse_hex_line("0005070003").unwrap(), expected);
        assert_eq!(parse_hex_line("00:05:07:00:03").unwrap(), expected);
        assert_eq!(parse_hex_line("0x00, 0x05, 0x07, 0x00, 0x03").unwrap(), expected);
        assert_eq!(
            parse_hex_line("  0X0005 0703\t00\r").unwrap(),
            Some(vec![0x00, 0x05, 0x07, 0x03, 0x00])
        );
        assert_eq!(parse_hex_line("80 06 00 c4").unwrap(), Some(vec![0x80, 0x06, 0x00, 0xC4]));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        assert_eq!(parse_hex_line("").unwrap(), None);
        assert_eq!(parse_hex_line("   ").unwrap(), None);
        assert_eq!(parse_hex_line("# boot event").unwrap(), None);
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(
            parse_hex_line("00 05 7").unwrap_err(),
            HexError::OddLength {
                token: "7".to_string()
            }
        );
        assert_eq!(
            parse_hex_line("00 zz").unwrap_err(),
            HexError::InvalidDigit {
                token: "zz".to_string(),
                digit: 'z',
            }
        );
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0x00, 0xAB, 0x07]), "00 AB 07");
        assert_eq!(format_hex(&[]), "");
    }
}
