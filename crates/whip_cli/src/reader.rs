//! JSON-lines input reader.
//!
//! Every non-blank line is one JSON object. Two of its fields hold the first
//! and last address of the range as dotted-quad strings; the whole object,
//! those fields included, becomes the record.

use std::io::BufRead;
use std::net::Ipv4Addr;
use whip_core::{CoreError, CoreResult, Range, Record};

/// Field names holding the range bounds.
#[derive(Debug, Clone)]
pub struct RangeFields {
    /// Field with the first address.
    pub begin: String,
    /// Field with the last address.
    pub end: String,
}

impl Default for RangeFields {
    fn default() -> Self {
        Self {
            begin: "begin".to_string(),
            end: "end".to_string(),
        }
    }
}

/// Reads `(range, record)` pairs from a JSON-lines stream.
///
/// The input must already be sorted by range with no overlaps; this reader
/// does not check that.
pub fn iter_json<R: BufRead>(
    reader: R,
    fields: RangeFields,
) -> impl Iterator<Item = CoreResult<(Range, Record)>> {
    reader
        .lines()
        .enumerate()
        .filter_map(move |(index, line)| {
            let line_no = index + 1;
            match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(parse_line(&line, &fields).map_err(|e| {
                    CoreError::invalid_input(format!("line {line_no}: {e}"))
                })),
                Err(e) => Some(Err(e.into())),
            }
        })
}

fn parse_line(line: &str, fields: &RangeFields) -> Result<(Range, Record), String> {
    let value: serde_json::Value = serde_json::from_str(line).map_err(|e| e.to_string())?;
    let serde_json::Value::Object(doc) = value else {
        return Err("expected a JSON object".to_string());
    };

    let begin = address_field(&doc, &fields.begin)?;
    let end = address_field(&doc, &fields.end)?;
    let range = Range::new(begin, end).map_err(|e| e.to_string())?;

    Ok((range, Record::from(doc)))
}

fn address_field(doc: &serde_json::Map<String, serde_json::Value>, field: &str) -> Result<u32, String> {
    let text = doc
        .get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| format!("missing or non-string field '{field}'"))?;
    let address: Ipv4Addr = text
        .parse()
        .map_err(|_| format!("field '{field}' is not an IPv4 address: {text}"))?;
    Ok(u32::from(address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn read(input: &str) -> Vec<CoreResult<(Range, Record)>> {
        iter_json(Cursor::new(input.to_string()), RangeFields::default()).collect()
    }

    #[test]
    fn parses_ranges_and_keeps_the_whole_document() {
        let items = read(concat!(
            r#"{"begin": "1.0.0.0", "end": "1.0.0.255", "cc": "AU"}"#,
            "\n\n",
            r#"{"begin": "1.0.1.0", "end": "1.0.1.0", "cc": "CN"}"#,
            "\n",
        ));

        assert_eq!(items.len(), 2);
        let (range, record) = items[0].as_ref().unwrap();
        assert_eq!(range.begin(), 0x0100_0000);
        assert_eq!(range.end(), 0x0100_00ff);
        assert_eq!(record.get("cc"), Some(&json!("AU")));
        assert_eq!(record.get("begin"), Some(&json!("1.0.0.0")));

        let (range, _) = items[1].as_ref().unwrap();
        assert_eq!(*range, Range::single(0x0100_0100));
    }

    #[test]
    fn errors_carry_the_line_number() {
        let items = read(concat!(
            r#"{"begin": "1.0.0.0", "end": "1.0.0.1"}"#,
            "\n",
            r#"{"begin": "1.0.0.300", "end": "1.0.0.1"}"#,
            "\n",
        ));

        assert!(items[0].is_ok());
        match &items[1] {
            Err(CoreError::InvalidInput { message }) => assert!(message.starts_with("line 2:")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_reversed_ranges_and_non_objects() {
        let items = read(concat!(
            r#"{"begin": "1.0.0.9", "end": "1.0.0.1"}"#,
            "\n",
            "[1, 2]\n",
            r#"{"end": "1.0.0.1"}"#,
            "\n",
        ));
        assert!(items
            .iter()
            .all(|i| matches!(i, Err(CoreError::InvalidInput { .. }))));
    }

    #[test]
    fn custom_field_names() {
        let fields = RangeFields {
            begin: "start_ip".to_string(),
            end: "end_ip".to_string(),
        };
        let items: Vec<_> = iter_json(
            Cursor::new(r#"{"start_ip": "0.0.0.0", "end_ip": "255.255.255.255"}"#),
            fields,
        )
        .collect();

        let (range, _) = items[0].as_ref().unwrap();
        assert_eq!((range.begin(), range.end()), (0, u32::MAX));
    }
}
