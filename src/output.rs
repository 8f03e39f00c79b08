//! The result channel.
//!
//! Exactly one JSON line per invocation. Diagnostics go to stderr through
//! tracing and the progress observers, never through here.

use crate::pipeline::TranscriptionResult;
use std::io::{self, Write};

/// Serialize `result` as a single JSON line and flush.
pub fn emit_result<W: Write>(mut writer: W, result: &TranscriptionResult) -> io::Result<()> {
    serde_json::to_writer(&mut writer, result)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScriptifyError;
    use crate::pipeline::Segment;

    fn emitted(result: &TranscriptionResult) -> String {
        let mut out = Vec::new();
        emit_result(&mut out, result).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_missing_file_document() {
        let error = ScriptifyError::AudioNotFound {
            path: "/nonexistent.wav".to_string(),
        };
        let result = TranscriptionResult::failure(error.to_string(), "auto".to_string());

        assert_eq!(
            emitted(&result),
            "{\"error\":\"Audio file not found: /nonexistent.wav\",\"text\":\"\",\"confidence\":0.0,\"language\":\"auto\",\"segments\":[]}\n"
        );
    }

    #[test]
    fn test_exactly_one_line() {
        let result = TranscriptionResult::success(
            "line one\nline two".to_string(),
            "en".to_string(),
            vec![Segment::new(0.0, 2.0, "line one"), Segment::new(2.0, 4.0, "line two")],
        );
        let out = emitted(&result);

        assert_eq!(out.matches('\n').count(), 1);
        assert!(out.ends_with('\n'));

        let parsed: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(parsed["text"], "line one\nline two");
        assert_eq!(parsed["confidence"], 0.9);
        assert_eq!(parsed["segments"][1]["start"], 2.0);
        assert!(parsed.get("error").is_none());
    }

    #[test]
    fn test_non_ascii_text_is_preserved() {
        let result = TranscriptionResult::success("héllo wörld".to_string(), "de".to_string(), vec![]);
        let parsed: serde_json::Value = serde_json::from_str(emitted(&result).trim_end()).unwrap();
        assert_eq!(parsed["text"], "héllo wörld");
    }
}
