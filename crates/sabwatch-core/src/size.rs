//! Human-readable size strings ("12.50 GB", "512 MB") normalized to GB.
//!
//! The control API reports job sizes as display strings. Anything we cannot
//! read becomes `0.0`, which under-estimates a job rather than failing a poll.

const KIB: f64 = 1024.0;

/// Parse a magnitude with an optional unit suffix into gigabytes.
///
/// Units are case-insensitive and may be separated from the number by
/// whitespace. No suffix means the value is already in GB. Unknown units,
/// malformed numbers, negative or non-finite values all yield `0.0`.
pub fn parse_size_gb(input: &str) -> f64 {
    let s = input.trim();
    let split = s
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);

    let Ok(value) = number.trim().parse::<f64>() else {
        return 0.0;
    };
    if !value.is_finite() || value < 0.0 {
        return 0.0;
    }

    match unit_factor(unit.trim()) {
        Some(scale) => value * scale,
        None => 0.0,
    }
}

/// Multiplier that converts one `unit` into GB.
fn unit_factor(unit: &str) -> Option<f64> {
    let factor = match unit.to_ascii_uppercase().as_str() {
        "" | "G" | "GB" => 1.0,
        "T" | "TB" => KIB,
        "M" | "MB" => 1.0 / KIB,
        "K" | "KB" => 1.0 / (KIB * KIB),
        "B" => 1.0 / (KIB * KIB * KIB),
        _ => return None,
    };
    Some(factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn gigabytes_pass_through() {
        assert!(approx(parse_size_gb("12.50 GB"), 12.5));
        assert!(approx(parse_size_gb("3"), 3.0));
    }

    #[test]
    fn megabytes_and_kilobytes_scale_down() {
        assert!(approx(parse_size_gb("512 MB"), 0.5));
        assert!(approx(parse_size_gb("1048576 KB"), 1.0));
        assert!(approx(parse_size_gb("256M"), 0.25));
    }

    #[test]
    fn short_forms_and_bytes() {
        assert!(approx(parse_size_gb("1073741824 B"), 1.0));
        assert!(approx(parse_size_gb("2G"), 2.0));
        assert!(approx(parse_size_gb("1048576K"), 1.0));
        assert!(approx(parse_size_gb("1T"), 1024.0));
    }

    #[test]
    fn units_are_case_insensitive_and_spacing_is_optional() {
        assert!(approx(parse_size_gb("  2gb "), 2.0));
        assert!(approx(parse_size_gb("1 tb"), 1024.0));
    }

    #[test]
    fn garbage_falls_back_to_zero() {
        assert_eq!(parse_size_gb("garbage"), 0.0);
        assert_eq!(parse_size_gb(""), 0.0);
        assert_eq!(parse_size_gb("12 PB"), 0.0);
        assert_eq!(parse_size_gb("1.2.3 GB"), 0.0);
        assert_eq!(parse_size_gb("-4 GB"), 0.0);
        assert_eq!(parse_size_gb("NaN"), 0.0);
    }
}
