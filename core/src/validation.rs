//! Built-in validators.
//!
//! ```
//! use std::path::Path;
//! use cmdtree_core::*;
//!
//! let validators = vec![validation::integer(), validation::range(10.0, 20.0)];
//! let ctx = CastingContext::new("bar", "21", &validators, false, Path::new("."), &[]);
//! let err = cast("21", &ValueType::Number, &ctx).unwrap_err();
//! assert_eq!(err.message, "Value (21) of \"bar\" is not within the range of [10, 20)");
//! ```

use std::net::IpAddr;

use crate::cast::{CastError, Validator};

/// Accepts numbers in the half-open range `[from, to)`.
pub fn range(from: f64, to: f64) -> Validator {
    Validator::custom(move |value, field| match value.as_f64() {
        Some(n) if n >= from && n < to => Ok(()),
        _ => Err(CastError::new(format!(
            "Value ({}) of \"{}\" is not within the range of [{from}, {to})",
            field.source, field.name
        ))),
    })
}

/// Accepts whole numbers.
pub fn integer() -> Validator {
    Validator::custom(|value, field| match value.as_f64() {
        Some(n) if n.fract() == 0.0 => Ok(()),
        _ => Err(CastError::new(format!(
            "Value ({}) of \"{}\" is not an integer",
            field.source, field.name
        ))),
    })
}

/// Accepts IPv4 or IPv6 addresses.
pub fn ip() -> Validator {
    ip_matching("IP", |_| true)
}

pub fn ipv4() -> Validator {
    ip_matching("IPv4", |addr| addr.is_ipv4())
}

pub fn ipv6() -> Validator {
    ip_matching("IPv6", |addr| addr.is_ipv6())
}

fn ip_matching(label: &'static str, accept: fn(&IpAddr) -> bool) -> Validator {
    Validator::custom(move |value, field| {
        let text = value.as_str().unwrap_or(field.source);
        match text.parse::<IpAddr>() {
            Ok(addr) if accept(&addr) => Ok(()),
            _ => Err(CastError::new(format!(
                "Value ({text}) of \"{}\" is not a valid {label} address",
                field.name
            ))),
        }
    })
}
