//! Number formatting for dashboard output.

/// Group the integer digits of `n` with commas, keeping at most
/// `max_digits` fraction digits and dropping trailing zeros.
pub fn group_thousands(n: f64, max_digits: usize) -> String {
    if !n.is_finite() {
        return "–".to_string();
    }

    let fixed = format!("{:.*}", max_digits, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = n < 0.0 && (int_part != "0" || !frac_part.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

/// `$1.5B`, `$250M`, or `$750,000`.
pub fn format_fdv(n: f64) -> String {
    if !n.is_finite() {
        return "–".to_string();
    }
    if n >= 1_000_000_000.0 {
        format!("${}B", trim_cents(n / 1_000_000_000.0))
    } else if n >= 1_000_000.0 {
        format!("${}M", trim_cents(n / 1_000_000.0))
    } else {
        format!("${}", group_thousands(n, 0))
    }
}

pub fn format_qty(n: f64, max_digits: usize) -> String {
    group_thousands(n, max_digits)
}

pub fn format_price(n: f64) -> String {
    format!("${}", group_thousands(n, 6))
}

pub fn format_money(n: f64) -> String {
    format!("${}", group_thousands(n, 2))
}

// Two decimals with a bare `.00` removed: 1.50 stays, 2.00 becomes 2.
fn trim_cents(n: f64) -> String {
    let s = format!("{:.2}", n);
    s.strip_suffix(".00").map(str::to_string).unwrap_or(s)
}
