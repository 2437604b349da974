use std::fmt;
use std::time::Duration;

/// Parse a chunk length such as `300`, `2.5`, `5m` or `1h 30m`.
///
/// # Grammar
///
/// ```text
/// duration   = [ "+" ] ( number | component { separators component } ) ;
/// component  = number separators? unit ;
/// number     = digits [ "." digits ] ;
/// unit       = "ms" | "s" | "m" | "h" | "d" ;
/// separators = { whitespace | "_" } ;
/// ```
///
/// A bare number is a count of seconds. Each unit may appear at most once.
/// Fractions are accepted as long as they resolve to whole nanoseconds.
/// Negative and zero durations are rejected.
pub fn parse_duration(value: &str) -> Result<Duration, DurationParseError> {
    let duration = parse_non_negative(value)?;
    if duration.is_zero() {
        return Err(DurationParseError::Zero);
    }
    Ok(duration)
}

/// Same grammar as [`parse_duration`], but zero is allowed (`--overlap 0`).
pub fn parse_non_negative(value: &str) -> Result<Duration, DurationParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if let Some((index, found)) = trimmed.char_indices().find(|(_, c)| !c.is_ascii()) {
        return Err(DurationParseError::UnexpectedChar { index, found });
    }

    let mut cursor = Cursor::new(trimmed);
    match cursor.peek() {
        Some(b'-') => return Err(DurationParseError::Negative),
        Some(b'+') => cursor.bump(1),
        _ => {}
    }
    cursor.skip_separators();

    let first = cursor.number()?;
    cursor.skip_separators();
    if cursor.is_done() {
        return to_duration(first.scaled(Unit::Second.nanos(), Unit::Second)?);
    }

    let mut seen = [false; Unit::COUNT];
    let mut total_nanos: u128 = 0;
    let mut number = first;
    loop {
        let unit = cursor.unit()?;
        if std::mem::replace(&mut seen[unit as usize], true) {
            return Err(DurationParseError::DuplicateUnit { unit });
        }
        total_nanos = total_nanos
            .checked_add(number.scaled(unit.nanos(), unit)?)
            .ok_or(DurationParseError::TooLarge)?;

        cursor.skip_separators();
        if cursor.is_done() {
            break;
        }
        number = cursor.number()?;
        cursor.skip_separators();
        if cursor.is_done() {
            return Err(DurationParseError::ExpectedUnit {
                index: cursor.pos,
                found: None,
            });
        }
    }

    to_duration(total_nanos)
}

fn to_duration(total_nanos: u128) -> Result<Duration, DurationParseError> {
    let secs = u64::try_from(total_nanos / 1_000_000_000)
        .map_err(|_| DurationParseError::TooLarge)?;
    let nanos = (total_nanos % 1_000_000_000) as u32;
    Ok(Duration::new(secs, nanos))
}

/// A decimal number as `mantissa / 10^scale`.
#[derive(Clone, Copy, Debug)]
struct Decimal {
    mantissa: u128,
    scale: u32,
}

impl Decimal {
    fn scaled(self, unit_nanos: u128, unit: Unit) -> Result<u128, DurationParseError> {
        let divisor = 10u128
            .checked_pow(self.scale)
            .ok_or(DurationParseError::TooPrecise { unit })?;
        let product = self
            .mantissa
            .checked_mul(unit_nanos)
            .ok_or(DurationParseError::TooLarge)?;
        if product % divisor != 0 {
            return Err(DurationParseError::TooPrecise { unit });
        }
        Ok(product / divisor)
    }
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self, by: usize) {
        self.pos += by;
    }

    fn is_done(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_separators(&mut self) {
        while let Some(byte) = self.peek() {
            if byte == b'_' || byte.is_ascii_whitespace() {
                self.bump(1);
            } else {
                break;
            }
        }
    }

    fn number(&mut self) -> Result<Decimal, DurationParseError> {
        match self.peek() {
            Some(byte) if byte.is_ascii_digit() => {}
            Some(b'-') => return Err(DurationParseError::Negative),
            found => {
                return Err(DurationParseError::ExpectedNumber {
                    index: self.pos,
                    found: found.map(char::from),
                })
            }
        }

        let mut mantissa: u128 = 0;
        let mut scale: u32 = 0;
        let mut dot = None;
        while let Some(byte) = self.peek() {
            match byte {
                b'0'..=b'9' => {
                    mantissa = mantissa
                        .checked_mul(10)
                        .and_then(|m| m.checked_add(u128::from(byte - b'0')))
                        .ok_or(DurationParseError::TooLarge)?;
                    if dot.is_some() {
                        scale += 1;
                    }
                }
                b'.' if dot.is_none() => dot = Some(self.pos),
                b'.' => {
                    return Err(DurationParseError::UnexpectedChar {
                        index: self.pos,
                        found: '.',
                    })
                }
                _ => break,
            }
            self.bump(1);
        }

        if let (Some(index), 0) = (dot, scale) {
            return Err(DurationParseError::MissingFractionDigits { index });
        }
        Ok(Decimal { mantissa, scale })
    }

    fn unit(&mut self) -> Result<Unit, DurationParseError> {
        let rest = self.rest();
        let word_len = rest
            .bytes()
            .take_while(|byte| byte.is_ascii_alphabetic())
            .count();
        if word_len == 0 {
            return Err(DurationParseError::ExpectedUnit {
                index: self.pos,
                found: rest.chars().next(),
            });
        }

        let word = &rest[..word_len];
        let unit = Unit::from_symbol(word).ok_or_else(|| DurationParseError::UnknownUnit {
            index: self.pos,
            found: word.to_owned(),
        })?;
        self.bump(word_len);
        Ok(unit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    Empty,
    Negative,
    Zero,
    TooLarge,
    ExpectedNumber { index: usize, found: Option<char> },
    ExpectedUnit { index: usize, found: Option<char> },
    UnknownUnit { index: usize, found: String },
    DuplicateUnit { unit: Unit },
    MissingFractionDigits { index: usize },
    TooPrecise { unit: Unit },
    UnexpectedChar { index: usize, found: char },
}

impl std::error::Error for DurationParseError {}

impl fmt::Display for DurationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationParseError::Empty => write!(f, "duration cannot be empty"),
            DurationParseError::Negative => write!(f, "duration cannot be negative"),
            DurationParseError::Zero => write!(f, "duration must be greater than zero"),
            DurationParseError::TooLarge => write!(f, "duration is too large"),
            DurationParseError::ExpectedNumber { index, found } => match found {
                Some(ch) => write!(f, "expected a number at position {} but found '{ch}'", index + 1),
                None => write!(f, "expected a number at position {}", index + 1),
            },
            DurationParseError::ExpectedUnit { index, found } => match found {
                Some(ch) => write!(f, "expected a unit at position {} but found '{ch}'", index + 1),
                None => write!(f, "expected a unit at position {}", index + 1),
            },
            DurationParseError::UnknownUnit { index, found } => write!(
                f,
                "unknown unit '{found}' at position {} (use ms, s, m, h or d)",
                index + 1
            ),
            DurationParseError::DuplicateUnit { unit } => {
                write!(f, "unit '{}' appears more than once", unit.symbol())
            }
            DurationParseError::MissingFractionDigits { index } => write!(
                f,
                "expected digits after the decimal point at position {}",
                index + 1
            ),
            DurationParseError::TooPrecise { unit } => write!(
                f,
                "fraction of '{}' is finer than one nanosecond",
                unit.symbol()
            ),
            DurationParseError::UnexpectedChar { index, found } => {
                write!(f, "unexpected character '{found}' at position {}", index + 1)
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Unit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
}

impl Unit {
    const COUNT: usize = 5;

    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "ms" => Some(Unit::Millisecond),
            "s" => Some(Unit::Second),
            "m" => Some(Unit::Minute),
            "h" => Some(Unit::Hour),
            "d" => Some(Unit::Day),
            _ => None,
        }
    }

    fn nanos(self) -> u128 {
        match self {
            Unit::Millisecond => 1_000_000,
            Unit::Second => 1_000_000_000,
            Unit::Minute => 60 * 1_000_000_000,
            Unit::Hour => 3_600 * 1_000_000_000,
            Unit::Day => 86_400 * 1_000_000_000,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Unit::Millisecond => "ms",
            Unit::Second => "s",
            Unit::Minute => "m",
            Unit::Hour => "h",
            Unit::Day => "d",
        }
    }
}
