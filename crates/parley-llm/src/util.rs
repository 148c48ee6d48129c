//! Formatting helpers shared by the summaries and usage reports

/// Group digits in thousands with commas
///
/// # Examples
/// ```
/// use parley_llm::util::group_digits;
/// assert_eq!(group_digits(1234567), "1,234,567");
/// assert_eq!(group_digits(999), "999");
/// ```
#[must_use]
pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

/// Singular or plural noun for a count
#[must_use]
pub fn pluralize(count: u64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", group_digits(count), plural)
    }
}
