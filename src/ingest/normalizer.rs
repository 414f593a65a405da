//! Raw message normalization.
//!
//! Turns a raw message blob into one canonical [`AnalysisInput`]. Inbound
//! mail is untrusted and heterogeneous, so parsing never fails: malformed
//! headers and unparsable dates degrade to best-effort defaults with the
//! degradation recorded as warnings the caller can observe.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::domain::{AnalysisInput, Direction};

/// Outcome of best-effort parsing: either clean or degraded with the
/// warnings that were tolerated along the way. Degraded is NOT an error.
#[derive(Debug, Clone)]
pub enum RawParse {
    Clean(AnalysisInput),
    Degraded(AnalysisInput, Vec<String>),
}

impl RawParse {
    pub fn into_parts(self) -> (AnalysisInput, Vec<String>) {
        match self {
            Self::Clean(input) => (input, Vec::new()),
            Self::Degraded(input, warnings) => (input, warnings),
        }
    }

    fn from_parts(input: AnalysisInput, warnings: Vec<String>) -> Self {
        if warnings.is_empty() {
            Self::Clean(input)
        } else {
            Self::Degraded(input, warnings)
        }
    }
}

static SCRIPT_STYLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").unwrap()
});
static BREAK_TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(?:br\s*/?|/p|/div|/tr)>").unwrap());
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static BLANK_RUN_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Parse a raw message blob: split the header block from the body at the
/// first blank line, pull Subject/From/To/Cc/Date by line-prefix matching,
/// and strip markup from the body.
pub fn parse_raw_message(blob: &str, direction: Direction) -> RawParse {
    let mut warnings = Vec::new();
    let blob = blob.replace("\r\n", "\n");

    let (header_block, body_raw) = match blob.split_once("\n\n") {
        Some((headers, body)) => (headers, body),
        None => {
            warnings.push("no header block found; treating entire message as body".to_string());
            ("", blob.as_str())
        }
    };

    let mut subject = String::new();
    let mut sender_raw = String::new();
    let mut recipients = Vec::new();
    let mut cc = Vec::new();
    let mut date = None;

    for line in unfold_headers(header_block) {
        if let Some(value) = header_value(&line, "subject:") {
            subject = value;
        } else if let Some(value) = header_value(&line, "from:") {
            sender_raw = value;
        } else if let Some(value) = header_value(&line, "to:") {
            recipients = split_address_list(&value);
        } else if let Some(value) = header_value(&line, "cc:") {
            cc = split_address_list(&value);
        } else if let Some(value) = header_value(&line, "date:") {
            match parse_message_date(&value) {
                Some(parsed) => date = Some(parsed),
                None => warnings.push(format!("unparsable date '{value}'; using current time")),
            }
        }
    }

    if sender_raw.is_empty() {
        warnings.push("no From header found".to_string());
    }

    let input = AnalysisInput {
        subject,
        body: strip_markup(body_raw),
        sender_raw,
        recipients,
        cc,
        direction,
        date: date.unwrap_or_else(Utc::now),
    };
    RawParse::from_parts(input, warnings)
}

/// Strip markup from a body: drop script/style blocks, turn break tags
/// into newlines, remove remaining tags, decode entities.
pub fn strip_markup(body: &str) -> String {
    if !body.contains('<') {
        return body.trim().to_string();
    }
    let text = SCRIPT_STYLE_PATTERN.replace_all(body, "");
    let text = BREAK_TAG_PATTERN.replace_all(&text, "\n");
    let text = TAG_PATTERN.replace_all(&text, "");
    let text = html_escape::decode_html_entities(&text).to_string();
    BLANK_RUN_PATTERN
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}

/// Fold continuation lines (leading whitespace) into their header line.
fn unfold_headers(block: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for line in block.lines() {
        match lines.last_mut() {
            Some(last) if line.starts_with(' ') || line.starts_with('\t') => {
                last.push(' ');
                last.push_str(line.trim());
            }
            _ => lines.push(line.to_string()),
        }
    }
    lines
}

fn header_value(line: &str, prefix: &str) -> Option<String> {
    let lower = line.to_lowercase();
    lower
        .starts_with(prefix)
        .then(|| line[prefix.len()..].trim().to_string())
}

fn split_address_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Try the common date shapes seen in the wild; None means degradation.
fn parse_message_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc());
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return parsed.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "From: Jane Doe <jane@smith-law.com>\n\
        To: intake@ourfirm.com, partner@ourfirm.com\n\
        Cc: paralegal@ourfirm.com\n\
        Subject: Filing deadline for Case No. 2024-DC-004521\n\
        Date: Tue, 15 Oct 2024 10:30:00 +0000\n\
        \n\
        The filing deadline is 10/20/2024. Please confirm receipt.\n";

    #[test]
    fn clean_message_parses_all_headers() {
        let parsed = parse_raw_message(RAW, Direction::Inbound);
        let RawParse::Clean(input) = parsed else {
            panic!("expected clean parse");
        };
        assert_eq!(input.subject, "Filing deadline for Case No. 2024-DC-004521");
        assert_eq!(input.sender_raw, "Jane Doe <jane@smith-law.com>");
        assert_eq!(input.recipients.len(), 2);
        assert_eq!(input.cc, vec!["paralegal@ourfirm.com"]);
        assert!(input.body.starts_with("The filing deadline"));
        assert_eq!(input.date.to_rfc3339(), "2024-10-15T10:30:00+00:00");
    }

    #[test]
    fn bad_date_degrades_with_warning() {
        let raw = RAW.replace("Tue, 15 Oct 2024 10:30:00 +0000", "sometime next week");
        let (input, warnings) = parse_raw_message(&raw, Direction::Inbound).into_parts();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("unparsable date"));
        // Date fell back to "now"; subject survived.
        assert!(!input.subject.is_empty());
    }

    #[test]
    fn missing_header_block_degrades_to_body_only() {
        let (input, warnings) =
            parse_raw_message("just a bare line of text", Direction::Inbound).into_parts();
        assert_eq!(input.body, "just a bare line of text");
        assert!(warnings.iter().any(|w| w.contains("no header block")));
        assert!(warnings.iter().any(|w| w.contains("no From header")));
    }

    #[test]
    fn continuation_lines_fold() {
        let raw = "Subject: first part\n\tsecond part\nFrom: a@b.com\n\nbody";
        let (input, _) = parse_raw_message(raw, Direction::Inbound).into_parts();
        assert_eq!(input.subject, "first part second part");
    }

    #[test]
    fn markup_is_stripped_and_entities_decoded() {
        let body = "<html><style>p{color:red}</style><p>Settlement &amp; release</p>\
                    <script>alert(1)</script><p>due 10/01/2025</p></html>";
        let text = strip_markup(body);
        assert_eq!(text, "Settlement & release\ndue 10/01/2025");
    }
}
