use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::repository::SessionRow;
use super::DatabaseError;

pub const CSV_HEADER: [&str; 5] = [
    "session_id",
    "patient_id",
    "input_text",
    "result_json",
    "created_at",
];

/// Write session rows as CSV (RFC 4180 quoting, CRLF line endings).
pub fn write_sessions_csv<W: Write>(out: &mut W, rows: &[SessionRow]) -> Result<(), DatabaseError> {
    write_record(out, &CSV_HEADER)?;
    for row in rows {
        write_record(
            out,
            &[
                row.session_id.as_str(),
                row.patient_id.as_str(),
                row.input_text.as_str(),
                row.result_json.as_str(),
                row.created_at.as_str(),
            ],
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Export rows to a file at `destination`, creating parent directories.
pub fn export_sessions_csv(destination: &Path, rows: &[SessionRow]) -> Result<(), DatabaseError> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(destination)?);
    write_sessions_csv(&mut writer, rows)
}

fn write_record<W: Write>(out: &mut W, fields: &[&str]) -> Result<(), DatabaseError> {
    let line = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    out.write_all(line.as_bytes())?;
    out.write_all(b"\r\n")?;
    Ok(())
}

/// Quote a field when it contains a delimiter, quote, or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(input_text: &str, result_json: &str) -> SessionRow {
        SessionRow {
            session_id: "3f8a".into(),
            patient_id: "patient_1".into(),
            input_text: input_text.into(),
            result_json: result_json.into(),
            created_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    fn render(rows: &[SessionRow]) -> String {
        let mut buf = Vec::new();
        write_sessions_csv(&mut buf, rows).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_only_when_empty() {
        assert_eq!(render(&[]), "session_id,patient_id,input_text,result_json,created_at\r\n");
    }

    #[test]
    fn plain_fields_are_unquoted() {
        let out = render(&[row("fever", "{}")]);
        assert!(out.ends_with("3f8a,patient_1,fever,{},2026-01-01T00:00:00Z\r\n"));
    }

    #[test]
    fn json_with_quotes_and_commas_is_escaped() {
        let out = render(&[row("fever, cough", r#"{"a":1,"b":"x"}"#)]);
        assert!(out.contains(r#""fever, cough""#));
        assert!(out.contains(r#""{""a"":1,""b"":""x""}""#));
    }

    #[test]
    fn newline_in_field_is_quoted() {
        assert_eq!(escape_field("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("sessions.csv");
        export_sessions_csv(&path, &[row("fever", "{}")]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
