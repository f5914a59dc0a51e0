//! Repair of Thai month abbreviations mangled by OCR.
//!
//! Each [`MonthRule`] pairs a fuzzy token pattern with the canonical
//! abbreviation. Rules run in order; the confusable `ก.พ.` rule comes first.
//! A token is only rewritten when it stands on its own: it must start the
//! string or follow a non-word character, and may be followed by a 2–4 digit
//! year fragment before the next non-word character or the end.

use std::sync::OnceLock;

use regex::Regex;
use slipread_core::is_thai_letter_or_digit;

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_month_word_glued, r"เดือน([\u{0E01}-\u{0E59}])");
re!(re_comma_spacing, r"\s*,\s*");
re!(re_dot_space_year, r"\.\s+([0-9]{4})");
re!(re_multi_space, r"\s{2,}");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRule {
    pub token: &'static str,
    pub canonical: &'static str,
}

/// Read as `ท.พ.`, `N.พ.`, `N.W.` and similar look-alikes.
pub const CONFUSABLE_FEBRUARY: MonthRule = MonthRule {
    token: r"[กทฑตดNnHhMmWw]\s*\.?\s*[พPwW]\s*\.?",
    canonical: "ก.พ.",
};

pub const STRICT_MONTHS: [MonthRule; 11] = [
    MonthRule { token: r"ม\s*\.?\s*ค\s*\.?", canonical: "ม.ค." },
    MonthRule { token: r"มี\s*\.?\s*ค\s*\.?", canonical: "มี.ค." },
    MonthRule { token: r"เม\s*\.?\s*ย\s*\.?", canonical: "เม.ย." },
    MonthRule { token: r"พ\s*\.?\s*ย\s*\.?", canonical: "พ.ย." },
    MonthRule { token: r"พ\s*\.?\s*ค\s*\.?", canonical: "พ.ค." },
    MonthRule { token: r"มิ\s*\.?\s*ย\s*\.?", canonical: "มิ.ย." },
    MonthRule { token: r"ก\s*\.?\s*ค\s*\.?", canonical: "ก.ค." },
    MonthRule { token: r"ส\s*\.?\s*ค\s*\.?", canonical: "ส.ค." },
    MonthRule { token: r"ก\s*\.?\s*ย\s*\.?", canonical: "ก.ย." },
    MonthRule { token: r"ต\s*\.?\s*ค\s*\.?", canonical: "ต.ค." },
    MonthRule { token: r"ธ\s*\.?\s*ค\s*\.?", canonical: "ธ.ค." },
];

struct CompiledMonthRule {
    canonical: &'static str,
    /// Longest token match anchored at the slice start.
    leading: Regex,
    /// Token spanning the whole slice.
    exact: Regex,
}

impl CompiledMonthRule {
    fn compile(rule: MonthRule) -> Self {
        Self {
            canonical: rule.canonical,
            leading: Regex::new(&format!("^(?:{})", rule.token)).expect("invalid month token"),
            exact: Regex::new(&format!("^(?:{})$", rule.token)).expect("invalid month token"),
        }
    }

    /// Byte length of the token starting at `s[0]`, if one fits the year/boundary
    /// constraint. Longer matches are tried first, then shorter ones.
    fn token_len(&self, s: &str) -> Option<usize> {
        let greedy = self.leading.find(s)?.end();
        s[..greedy]
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .rev()
            .find(|&end| self.exact.is_match(&s[..end]) && year_tail_ok(&s[end..]))
    }

    fn apply(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        let mut copied = 0;
        let mut prev: Option<(usize, char)> = None;
        let mut pos = 0;

        while pos < value.len() {
            let standalone = match prev {
                None => true,
                Some((start, c)) => start >= copied && !is_word_char(c),
            };
            if standalone {
                if let Some(len) = self.token_len(&value[pos..]) {
                    out.push_str(&value[copied..pos]);
                    out.push_str(self.canonical);
                    copied = pos + len;
                    pos = copied;
                    prev = value[..pos].chars().next_back().map(|c| (pos - c.len_utf8(), c));
                    continue;
                }
            }
            let Some(c) = value[pos..].chars().next() else { break };
            prev = Some((pos, c));
            pos += c.len_utf8();
        }

        out.push_str(&value[copied..]);
        out
    }
}

fn is_word_char(c: char) -> bool {
    is_thai_letter_or_digit(c) || c.is_ascii_alphanumeric()
}

/// Optional 2–4 digit fragment, then a non-word character or the end.
fn year_tail_ok(rest: &str) -> bool {
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 1 || digits > 4 {
        return false;
    }
    rest[digits..].chars().next().map_or(true, |c| !is_word_char(c))
}

fn compiled_rules() -> &'static [CompiledMonthRule] {
    static RULES: OnceLock<Vec<CompiledMonthRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        std::iter::once(CONFUSABLE_FEBRUARY)
            .chain(STRICT_MONTHS)
            .map(CompiledMonthRule::compile)
            .collect()
    })
}

fn replace_until_stable(value: String, re: &Regex, rep: &str) -> String {
    let mut current = value;
    loop {
        let next = re.replace_all(&current, rep).into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Apply one rule in isolation.
pub fn apply_month_rule(value: &str, rule: MonthRule) -> String {
    CompiledMonthRule::compile(rule).apply(value)
}

/// Clean up date text inside a memo candidate and canonicalize month tokens.
pub fn correct_calendar_tokens(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let out = replace_until_stable(value.to_string(), re_month_word_glued(), "เดือน $1");
    let out = re_comma_spacing().replace_all(&out, ", ");
    let mut out = re_dot_space_year().replace_all(&out, ".$1").into_owned();

    for rule in compiled_rules() {
        out = rule.apply(&out);
    }

    re_multi_space().replace_all(&out, " ").trim().to_string()
}
