//! Reply text helpers.

const RULE: &str = "◈━━━━━━━━━━━━━━━━◈";

/// Framed banner: bot name, then each line behind a bullet.
pub fn framed<I, S>(bot_name: &str, lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = format!("{}\n\n{}", bot_name, RULE);
    for line in lines {
        out.push_str("\n│❒ ");
        out.push_str(line.as_ref());
    }
    out.push('\n');
    out.push_str(RULE);
    out
}

/// Short mention form of an identity.
pub fn mention(identity: &str) -> String {
    format!("@{}", identity.split('@').next().unwrap_or(identity))
}

/// Group digits in thousands: 12345 -> "12,345".
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// English ordinal suffix for a day of month.
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
