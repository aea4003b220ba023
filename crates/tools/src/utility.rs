//! Math, unit conversion, hashing and id generation.

use crate::{envelope, fields, Args, ToolError, ToolResult};
use rand::Rng;
use serde_json::{json, Value};
use sha2::{Digest, Sha256, Sha512};

const MAX_UUIDS: i64 = 100;

/// One binary operation: `a <operator> b`. Not an expression evaluator.
pub fn calculate(args: &Value) -> Value {
    envelope(calculate_impl(args))
}

fn calculate_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let a = args.f64("a")?;
    let b = args.f64("b")?;
    let operator = args.str("operator")?.trim();

    let result = match operator {
        "+" => a + b,
        "-" => a - b,
        "*" | "x" | "×" => a * b,
        "/" | "÷" => {
            if b == 0.0 {
                return Err(ToolError::Failed("division by zero".to_string()));
            }
            a / b
        }
        "%" => {
            if b == 0.0 {
                return Err(ToolError::Failed("modulo by zero".to_string()));
            }
            a % b
        }
        "^" | "**" => a.powf(b),
        _ => {
            return Err(ToolError::InvalidField {
                field: "operator",
                expected: "must be one of + - * / % ^",
            })
        }
    };
    if !result.is_finite() {
        return Err(ToolError::Failed("result is not a finite number".to_string()));
    }

    Ok(fields(json!({
        "result": result,
        "expression": format!("{} {} {}", a, operator, b),
    })))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Length,
    Mass,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scale {
    Celsius,
    Fahrenheit,
    Kelvin,
}

#[derive(Debug, Clone, Copy)]
enum Unit {
    /// Dimension and factor to its base unit (m, kg, byte).
    Linear(Dimension, f64),
    Temperature(Scale),
}

fn unit(name: &str) -> Option<Unit> {
    use Dimension::*;
    let linear = |dim, factor| Some(Unit::Linear(dim, factor));
    match name.trim().to_ascii_lowercase().as_str() {
        "mm" | "millimeter" | "millimeters" => linear(Length, 0.001),
        "cm" | "centimeter" | "centimeters" => linear(Length, 0.01),
        "m" | "meter" | "meters" => linear(Length, 1.0),
        "km" | "kilometer" | "kilometers" => linear(Length, 1000.0),
        "in" | "inch" | "inches" => linear(Length, 0.0254),
        "ft" | "foot" | "feet" => linear(Length, 0.3048),
        "yd" | "yard" | "yards" => linear(Length, 0.9144),
        "mi" | "mile" | "miles" => linear(Length, 1609.344),
        "mg" | "milligram" | "milligrams" => linear(Mass, 0.000_001),
        "g" | "gram" | "grams" => linear(Mass, 0.001),
        "kg" | "kilogram" | "kilograms" => linear(Mass, 1.0),
        "t" | "tonne" | "tonnes" => linear(Mass, 1000.0),
        "oz" | "ounce" | "ounces" => linear(Mass, 0.028_349_523_125),
        "lb" | "lbs" | "pound" | "pounds" => linear(Mass, 0.453_592_37),
        "b" | "byte" | "bytes" => linear(Data, 1.0),
        "kb" | "kilobyte" | "kilobytes" => linear(Data, 1024.0),
        "mb" | "megabyte" | "megabytes" => linear(Data, 1024.0 * 1024.0),
        "gb" | "gigabyte" | "gigabytes" => linear(Data, 1024.0 * 1024.0 * 1024.0),
        "tb" | "terabyte" | "terabytes" => linear(Data, 1024.0 * 1024.0 * 1024.0 * 1024.0),
        "c" | "celsius" => Some(Unit::Temperature(Scale::Celsius)),
        "f" | "fahrenheit" => Some(Unit::Temperature(Scale::Fahrenheit)),
        "k" | "kelvin" => Some(Unit::Temperature(Scale::Kelvin)),
        _ => None,
    }
}

fn to_celsius(value: f64, scale: Scale) -> f64 {
    match scale {
        Scale::Celsius => value,
        Scale::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        Scale::Kelvin => value - 273.15,
    }
}

fn from_celsius(value: f64, scale: Scale) -> f64 {
    match scale {
        Scale::Celsius => value,
        Scale::Fahrenheit => value * 9.0 / 5.0 + 32.0,
        Scale::Kelvin => value + 273.15,
    }
}

/// Convert between length, mass, data-size or temperature units.
pub fn convert_units(args: &Value) -> Value {
    envelope(convert_units_impl(args))
}

fn convert_units_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let value = args.f64("value")?;
    let from = args.str("from")?;
    let to = args.str("to")?;

    let from_unit =
        unit(from).ok_or_else(|| ToolError::Failed(format!("unknown unit '{}'", from)))?;
    let to_unit = unit(to).ok_or_else(|| ToolError::Failed(format!("unknown unit '{}'", to)))?;

    let result = match (from_unit, to_unit) {
        (Unit::Linear(a, from_factor), Unit::Linear(b, to_factor)) if a == b => {
            value * from_factor / to_factor
        }
        (Unit::Temperature(a), Unit::Temperature(b)) => from_celsius(to_celsius(value, a), b),
        _ => return Err(ToolError::Failed(format!("cannot convert {} to {}", from, to))),
    };

    Ok(fields(json!({
        "result": result,
        "from": from,
        "to": to,
    })))
}

/// Lowercase hex digest of `text` (sha256 by default, or sha512).
pub fn hash_text(args: &Value) -> Value {
    envelope(hash_text_impl(args))
}

fn hash_text_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let text = args.str("text")?;
    let algorithm = args.opt_str("algorithm")?.unwrap_or("sha256");

    let hash = match algorithm.to_ascii_lowercase().as_str() {
        "sha256" => format!("{:x}", Sha256::digest(text.as_bytes())),
        "sha512" => format!("{:x}", Sha512::digest(text.as_bytes())),
        _ => {
            return Err(ToolError::InvalidField {
                field: "algorithm",
                expected: "must be sha256 or sha512",
            })
        }
    };

    Ok(fields(json!({ "hash": hash, "algorithm": algorithm })))
}

/// One or more random v4 UUIDs.
pub fn generate_uuid(args: &Value) -> Value {
    envelope(generate_uuid_impl(args))
}

fn generate_uuid_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let count = args.opt_i64("count")?.unwrap_or(1);
    if !(1..=MAX_UUIDS).contains(&count) {
        return Err(ToolError::InvalidField {
            field: "count",
            expected: "must be between 1 and 100",
        });
    }

    let uuids: Vec<String> = (0..count).map(|_| uuid::Uuid::new_v4().to_string()).collect();
    Ok(fields(json!({ "uuid": uuids[0], "uuids": uuids })))
}

/// Random integer in `min..=max`.
pub fn random_number(args: &Value) -> Value {
    envelope(random_number_impl(args))
}

fn random_number_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let min = args.i64("min")?;
    let max = args.i64("max")?;
    if min > max {
        return Err(ToolError::Failed("min must not exceed max".to_string()));
    }

    let value = rand::thread_rng().gen_range(min..=max);
    Ok(fields(json!({ "value": value })))
}
