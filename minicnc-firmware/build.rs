//! Build script for minicnc-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates machine.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// GPIOs bound to a PWM slice in `src/board.rs`
const WIRED_PINS: [i64; 5] = [26, 13, 17, 4, 6];

/// Longest label the firmware stores
const MAX_LABEL_LEN: usize = 16;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate machine.toml configuration at compile time
///
/// The firmware falls back to the reference wiring when the embedded file
/// does not parse, so anything that would trigger that is a build error.
fn validate_config() {
    println!("cargo:rerun-if-changed=machine.toml");

    let config_path = Path::new("machine.toml");
    if !config_path.exists() {
        fail(
            "machine.toml not found!",
            &[
                "The firmware embeds machine.toml from the minicnc-firmware".to_string(),
                "directory. Create one with [axis.x], [axis.y] and [axis.z].".to_string(),
            ],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read machine.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in machine.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    validate_root(&config, &mut errors);
    validate_axes(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid machine configuration", &errors);
    }

    println!("cargo:warning=machine.toml validated successfully");
}

/// Validate top-level keys
fn validate_root(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (key, value) in root {
        match key.as_str() {
            "name" => check_label("name", value, errors),
            "axis" => {}
            _ => errors.push(format!("unknown key '{}'", key)),
        }
    }
}

/// Validate the [axis.*] sections
fn validate_axes(config: &toml::Value, errors: &mut Vec<String>) {
    let axes = match config.get("axis") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("'axis' must be a table".to_string());
            return;
        }
        None => return,
    };

    let mut slices: Vec<(i64, &str)> = Vec::new();

    for (name, axis) in axes {
        if !["x", "y", "z"].contains(&name.as_str()) {
            errors.push(format!("[axis.{}] unknown axis, expected x, y or z", name));
            continue;
        }
        let axis = match axis {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[axis.{}] must be a table", name));
                continue;
            }
        };

        for (key, value) in axis {
            match (key.as_str(), value) {
                ("pin", toml::Value::Integer(pin)) => {
                    if !WIRED_PINS.contains(pin) {
                        errors.push(format!(
                            "[axis.{}] pin {} has no servo output, use one of {:?}",
                            name, pin, WIRED_PINS
                        ));
                    }
                    let slice = pwm_slice(*pin);
                    if let Some((_, other)) = slices.iter().find(|(s, _)| *s == slice) {
                        errors.push(format!(
                            "[axis.{}] pin {} shares PWM slice {} with axis {}",
                            name, pin, slice, other
                        ));
                    }
                    slices.push((slice, name.as_str()));
                }
                ("frequency", toml::Value::Integer(hz)) => {
                    if !(8..=1_000).contains(hz) {
                        errors.push(format!("[axis.{}] frequency must be 8-1000 Hz", name));
                    }
                }
                ("speed", toml::Value::Float(speed)) => {
                    if !speed.is_finite() || *speed <= 0.0 {
                        errors.push(format!("[axis.{}] speed must be positive", name));
                    }
                }
                ("speed", toml::Value::Integer(speed)) => {
                    if *speed <= 0 {
                        errors.push(format!("[axis.{}] speed must be positive", name));
                    }
                }
                ("label", value) => check_label(&format!("[axis.{}] label", name), value, errors),
                ("pin" | "frequency", _) => {
                    errors.push(format!("[axis.{}] {} must be an integer", name, key));
                }
                ("speed", _) => errors.push(format!("[axis.{}] speed must be a number", name)),
                _ => errors.push(format!("[axis.{}] unknown key '{}'", name, key)),
            }
        }
    }
}

fn check_label(what: &str, value: &toml::Value, errors: &mut Vec<String>) {
    match value {
        toml::Value::String(s) if s.len() > MAX_LABEL_LEN => errors.push(format!(
            "{} is longer than {} bytes",
            what, MAX_LABEL_LEN
        )),
        toml::Value::String(_) => {}
        _ => errors.push(format!("{} must be a string", what)),
    }
}

/// RP2040 PWM slice driving a GPIO
fn pwm_slice(gpio: i64) -> i64 {
    (gpio >> 1) & 7
}

/// Abort the build with a boxed error listing
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| {
                let truncated = if line.chars().count() > 62 {
                    format!("{}...", line.chars().take(59).collect::<String>())
                } else {
                    line.to_string()
                };
                format!("║  • {:<62} ║", truncated)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}
