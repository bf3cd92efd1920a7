//! Prometheus exposition-format parsing
//!
//! Converts the text document returned by a load-test metrics endpoint
//! into structured [`MetricRecord`]s. Parsing is a pure function of the
//! input: malformed lines are skipped, never escalated to a document
//! error.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Type hint attached to a metric by a `# TYPE` comment line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
    Summary,
    #[default]
    Unknown,
}

impl MetricType {
    /// Parse the type token of a `# TYPE` line; anything unrecognized
    /// maps to `Unknown`
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token {
            "counter" => Self::Counter,
            "gauge" => Self::Gauge,
            "histogram" => Self::Histogram,
            "summary" => Self::Summary,
            _ => Self::Unknown,
        }
    }

    /// Get the exposition-format token for this type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
            Self::Histogram => "histogram",
            Self::Summary => "summary",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed metric sample
///
/// Immutable once parsed; produced by [`parse_document`] and consumed by
/// the filter engine and the statistics aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub help_text: String,
    #[serde(default)]
    pub metric_type: MetricType,
}

impl MetricRecord {
    /// Convenience constructor for a record without labels or help text
    #[must_use]
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            labels: BTreeMap::new(),
            help_text: String::new(),
            metric_type: MetricType::Unknown,
        }
    }
}

/// Parse a whole exposition-format document into ordered metric records
///
/// `# HELP <name> <text>` and `# TYPE <name> <type>` lines set the
/// pending help text and type hint for subsequent samples of that name.
/// Blank lines and other comments are skipped. Sample lines whose value
/// does not parse as an `f64` are dropped; the rest of the document is
/// still parsed.
#[must_use]
pub fn parse_document(text: &str) -> Vec<MetricRecord> {
    let mut help_texts: HashMap<&str, &str> = HashMap::new();
    let mut type_hints: HashMap<&str, MetricType> = HashMap::new();
    let mut records = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            let comment = comment.trim_start();
            if let Some(rest) = comment.strip_prefix("HELP") {
                if let Some((name, help)) = split_token(rest.trim_start()) {
                    help_texts.insert(name, help);
                }
            } else if let Some(rest) = comment.strip_prefix("TYPE") {
                if let Some((name, type_token)) = split_token(rest.trim_start()) {
                    type_hints.insert(name, MetricType::parse(type_token));
                }
            }
            continue;
        }

        if let Some(mut record) = parse_sample_line(line) {
            if let Some(help) = help_texts.get(record.name.as_str()) {
                record.help_text = (*help).to_string();
            }
            if let Some(hint) = type_hints.get(record.name.as_str()) {
                record.metric_type = *hint;
            }
            records.push(record);
        }
    }

    records
}

/// Split `<name> <rest>` at the first whitespace run
fn split_token(text: &str) -> Option<(&str, &str)> {
    let name_end = text.find(char::is_whitespace)?;
    let (name, rest) = text.split_at(name_end);
    Some((name, rest.trim_start()))
}

/// Parse one sample line: `name[{label="value",...}] value`
fn parse_sample_line(line: &str) -> Option<MetricRecord> {
    let (name, labels, value_text) = match line.find('{') {
        Some(open) => {
            let close = line.rfind('}')?;
            if close < open {
                return None;
            }
            let name = &line[..open];
            let labels = parse_labels(&line[open + 1..close]);
            (name, labels, line[close + 1..].trim())
        }
        None => {
            let (name, rest) = split_token(line)?;
            (name, BTreeMap::new(), rest)
        }
    };

    if name.is_empty() || !is_valid_name(name) {
        return None;
    }

    let value: f64 = value_text.parse().ok()?;

    Some(MetricRecord {
        name: name.to_string(),
        value,
        labels,
        help_text: String::new(),
        metric_type: MetricType::Unknown,
    })
}

/// Parse a comma-separated `key="value"` label block, stripping quotes
fn parse_labels(block: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    for pair in block.split(',') {
        if let Some((key, value)) = pair.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            let value = value.trim().trim_matches('"');
            labels.insert(key.to_string(), value.to_string());
        }
    }
    labels
}

/// Metric names follow `[a-zA-Z_:][a-zA-Z0-9_:]*`
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DOC: &str = "\
# HELP connect_succ connect_succ
# TYPE connect_succ counter
connect_succ 42
# HELP publish_latency publish latency in ms
# TYPE publish_latency histogram
publish_latency{le=\"100\"} 17.5
";

    #[test]
    fn test_parse_plain_sample() {
        let records = parse_document("connect_succ 42");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "connect_succ");
        assert_eq!(records[0].value, 42.0);
        assert!(records[0].labels.is_empty());
    }

    #[test]
    fn test_parse_help_and_type_attach_to_samples() {
        let records = parse_document(SAMPLE_DOC);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].help_text, "connect_succ");
        assert_eq!(records[0].metric_type, MetricType::Counter);

        assert_eq!(records[1].help_text, "publish latency in ms");
        assert_eq!(records[1].metric_type, MetricType::Histogram);
        assert_eq!(records[1].labels.get("le").map(String::as_str), Some("100"));
    }

    #[test]
    fn test_parse_labels_quotes_stripped() {
        let records = parse_document("recv{topic=\"t/1\",qos=\"1\"} 7");
        assert_eq!(records.len(), 1);
        let labels = &records[0].labels;
        assert_eq!(labels.get("topic").map(String::as_str), Some("t/1"));
        assert_eq!(labels.get("qos").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_malformed_value_drops_only_that_line() {
        let doc = "good_one 1\nbad_one not_a_number\ngood_two 2\n";
        let records = parse_document(doc);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "good_one");
        assert_eq!(records[1].name, "good_two");
    }

    #[test]
    fn test_invalid_names_are_dropped() {
        let records = parse_document("9starts_with_digit 1\nvalid_name 2");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "valid_name");
    }

    #[test]
    fn test_blank_lines_and_other_comments_skipped() {
        let doc = "\n# just a comment\n\nconnect_succ 3\n";
        let records = parse_document(doc);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let first = parse_document(SAMPLE_DOC);
        let second = parse_document(SAMPLE_DOC);
        assert_eq!(first, second);
    }

    #[test]
    fn test_scientific_notation_and_negative_values() {
        let records = parse_document("a_gauge -1.5\nb_gauge 2.5e3");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value, -1.5);
        assert_eq!(records[1].value, 2500.0);
    }

    #[test]
    fn test_unclosed_label_block_dropped() {
        let records = parse_document("broken{le=\"1\" 5\nok 6");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "ok");
    }

    #[test]
    fn test_metric_type_parse_unknown_token() {
        assert_eq!(MetricType::parse("counter"), MetricType::Counter);
        assert_eq!(MetricType::parse("untyped"), MetricType::Unknown);
    }
}
