//! Minimal TOML parser for `machine.toml`
//!
//! Handles only the subset the machine description uses. It does NOT
//! support the full TOML grammar.
//!
//! Supported:
//! - Root `name = "..."`
//! - `[axis.x]`, `[axis.y]`, `[axis.z]` sections
//! - Keys `pin`, `frequency`, `speed`, `label` inside axis sections
//! - Quoted strings and plain numbers as values
//! - Comments (# ...), including after a header or value, and blank lines
//!
//! Keys that are not present keep their [`MachineConfig::default`] value.

use super::types::{Axis, Label, MachineConfig, MAX_LABEL_LEN};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Unknown key for the current section, or a line without `=`
    InvalidKey,
    /// Value could not be parsed for its key
    InvalidValue,
    /// Label or name longer than [`MAX_LABEL_LEN`]
    LabelTooLong,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            ConfigError::InvalidSection => "invalid section header",
            ConfigError::InvalidKey => "invalid key",
            ConfigError::InvalidValue => "invalid value",
            ConfigError::LabelTooLong => "label too long",
        };
        f.write_str(msg)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Axis(Axis),
}

/// Parse a `machine.toml` document
pub fn parse_machine_config(input: &str) -> Result<MachineConfig, ConfigError> {
    let mut config = MachineConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ConfigError::InvalidKey)?;
        apply_value(section, key, value, &mut config)?;
    }

    Ok(config)
}

/// Drop a `#` comment that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse "axis.x"
fn parse_section_header(header: &str) -> Result<Section, ConfigError> {
    let (kind, name) = header
        .trim()
        .split_once('.')
        .ok_or(ConfigError::InvalidSection)?;
    let (kind, name) = (kind.trim(), name.trim());

    if kind != "axis" {
        return Err(ConfigError::InvalidSection);
    }

    let axis = Axis::ALL
        .into_iter()
        .find(|a| a.as_str() == name)
        .ok_or(ConfigError::InvalidSection)?;
    Ok(Section::Axis(axis))
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut MachineConfig,
) -> Result<(), ConfigError> {
    match section {
        Section::Root => match key {
            "name" => config.name = parse_label(value)?,
            _ => return Err(ConfigError::InvalidKey),
        },
        Section::Axis(axis) => {
            let servo = config.axis_mut(axis);
            match key {
                "pin" => servo.channel_id = parse_number(value)?,
                "frequency" => servo.pwm_frequency_hz = parse_number(value)?,
                "speed" => servo.angular_speed_deg_per_sec = parse_number(value)?,
                "label" => servo.label = parse_label(value)?,
                _ => return Err(ConfigError::InvalidKey),
            }
        }
    }
    Ok(())
}

/// Parse a quoted string value
fn parse_string(value: &str) -> Result<&str, ConfigError> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ConfigError::InvalidValue)
}

fn parse_label(value: &str) -> Result<Label, ConfigError> {
    let s = parse_string(value)?;
    if s.len() > MAX_LABEL_LEN {
        return Err(ConfigError::LabelTooLong);
    }
    Label::try_from(s).map_err(|_| ConfigError::LabelTooLong)
}

fn parse_number<T: core::str::FromStr>(value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue)
}
