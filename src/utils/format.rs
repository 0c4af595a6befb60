use rust_decimal::Decimal;

/// Month abbreviations shown on the month range slider.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

pub fn month_label(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_LABELS[(month - 1) as usize],
        _ => "-",
    }
}

/// Brazilian currency text: `R$ 1.234,56`.
pub fn fmt_brl(value: Decimal) -> String {
    let fixed = format!("{:.2}", value.round_dp(2).abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value.is_sign_negative() && !value.round_dp(2).is_zero() {
        "-"
    } else {
        ""
    };
    format!("R$ {sign}{grouped},{frac_part}")
}

pub fn fmt_percent(value: Decimal) -> String {
    format!("{:.1}%", value)
}
