// Amount handling shared by the engine and any front-end that has to read
// receipt amounts typed by users or produced by OCR.

pub mod amount_format {
    //! Parsing of monetary strings whose locale is unknown.
    //!
    //! Receipts come in both US style (`1,234.56`) and Vietnamese style
    //! (`1.234,56`). When both separators appear, the rightmost one is the
    //! decimal point. A lone `,` is a decimal comma. A lone `.` is left alone,
    //! and if several dots survive only the last one is kept as decimal point.

    /// Parses a monetary string into a signed value, or `None` when the input
    /// does not describe a number.
    pub fn parse_amount(raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
            return None;
        }

        let stripped = strip_noise(trimmed);
        if stripped.is_empty() {
            return None;
        }

        let compact: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();
        let normalized = normalize_separators(&compact);
        let cleaned: String = normalized
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();
        let collapsed = collapse_dots(&cleaned);
        let canonical = apply_sign(&collapsed)?;

        let value = canonical.parse::<f64>().ok()?;
        value.is_finite().then_some(value)
    }

    /// Same as [`parse_amount`] for a value that may be missing altogether,
    /// which is how the OCR service reports an amount it could not read.
    pub fn parse_optional_amount(raw: Option<&str>) -> Option<f64> {
        raw.and_then(parse_amount)
    }

    /// Removes letters and currency glyphs, then surrounding whitespace.
    pub fn strip_noise(s: &str) -> String {
        s.chars()
            .filter(|c| !c.is_alphabetic() && !is_currency_symbol(*c))
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Rewrites the decimal separator to `.` and drops grouping separators.
    ///
    /// Expects input with no whitespace. Characters other than `.` and `,`
    /// pass through untouched.
    pub fn normalize_separators(s: &str) -> String {
        match (s.rfind('.'), s.rfind(',')) {
            (Some(dot), Some(comma)) => {
                let (decimal, grouping) = if dot > comma { ('.', ',') } else { (',', '.') };
                s.chars()
                    .filter(|&c| c != grouping)
                    .map(|c| if c == decimal { '.' } else { c })
                    .collect()
            }
            (None, Some(_)) => s.replace(',', "."),
            _ => s.to_string(),
        }
    }

    // Every dot but the last is taken as a thousands separator.
    fn collapse_dots(s: &str) -> String {
        if s.matches('.').count() <= 1 {
            return s.to_string();
        }
        let last = s.rfind('.');
        s.char_indices()
            .filter(|&(i, c)| c != '.' || Some(i) == last)
            .map(|(_, c)| c)
            .collect()
    }

    fn apply_sign(s: &str) -> Option<String> {
        let (sign, body) = match s.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", s),
        };
        if body.is_empty() || body.contains('-') {
            return None;
        }
        Some(format!("{}{}", sign, body))
    }

    fn is_currency_symbol(c: char) -> bool {
        matches!(
            c,
            '$' | '¢' | '£' | '¤' | '¥'
                | '\u{058F}'
                | '\u{060B}'
                | '\u{09F2}'
                | '\u{09F3}'
                | '\u{0E3F}'
                | '\u{17DB}'
                | '\u{20A0}'..='\u{20CF}' // includes € and ₫
                | '\u{FDFC}'
                | '\u{FE69}'
                | '\u{FF04}'
                | '\u{FFE0}'
                | '\u{FFE1}'
                | '\u{FFE5}'
                | '\u{FFE6}'
        )
    }

    /// Renders a parsed amount back to text. Integral values carry no decimal
    /// point and fractional values carry no padding zeros.
    pub fn format_amount(value: f64) -> String {
        if value == 0.0 {
            // avoids "-0"
            return "0".to_string();
        }
        format!("{}", value)
    }

    /// Display form used by the history list, in vi-VN convention: `.` groups
    /// thousands, `,` marks the decimals, at most three fraction digits are
    /// kept and trailing zeros are dropped.
    pub fn format_vnd(value: f64) -> String {
        let fixed = format!("{:.3}", value.abs());
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
        let frac_part = frac_part.trim_end_matches('0');

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        if !frac_part.is_empty() {
            grouped.push(',');
            grouped.push_str(frac_part);
        }

        let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
        let sign = if value < 0.0 && !is_zero { "-" } else { "" };
        format!("{}{} VND", sign, grouped)
    }

}
