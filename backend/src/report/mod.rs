mod metrics;
mod pdf;

use chrono::Local;
use shared::{Label, MEDIA_TYPE};

pub use pdf::render;
#[cfg(test)]
pub(crate) use pdf::shown_text;

pub const REPORT_TITLE: &str = "Fake Image Detection Report";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("{field} contains {ch:?}, which cannot be encoded as Latin-1")]
    Encoding { field: &'static str, ch: char },
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("PDF write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything printed on a report, captured at the moment the user asks for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRecord {
    pub user_name: String,
    pub media_type: String,
    pub label: Label,
    pub score: f32,
    pub timestamp: String,
    pub source_filename: String,
}

impl ReportRecord {
    pub fn new(
        user_name: impl Into<String>,
        label: Label,
        score: f32,
        timestamp: impl Into<String>,
        source_filename: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            media_type: MEDIA_TYPE.to_string(),
            label,
            score,
            timestamp: timestamp.into(),
            source_filename: source_filename.into(),
        }
    }

    /// Stamps the record with the current local time.
    pub fn now(
        user_name: impl Into<String>,
        label: Label,
        score: f32,
        source_filename: impl Into<String>,
    ) -> Self {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        Self::new(user_name, label, score, timestamp, source_filename)
    }

    /// Report body, one entry per printed line. The empty entry is the spacer after the title.
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", REPORT_TITLE.to_string()),
            ("spacer", String::new()),
            ("user_name", format!("User Name: {}", self.user_name)),
            ("media_type", format!("Media Type: {}", self.media_type)),
            ("label", format!("Prediction: {}", self.label)),
            ("score", format!("Prediction Accuracy: {:.4}", self.score)),
            ("timestamp", format!("Date and Time: {}", self.timestamp)),
            (
                "source_filename",
                format!("Image File Name: {}", self.source_filename),
            ),
        ]
    }
}

/// Encodes `text` one byte per character, failing on anything past U+00FF.
///
/// The C1 controls (U+0080..=U+009F) are rejected too: WinAnsiEncoding maps those bytes to
/// unrelated glyphs such as the euro sign.
pub fn encode_latin1(field: &'static str, text: &str) -> Result<Vec<u8>, ReportError> {
    text.chars()
        .map(|ch| match u8::try_from(u32::from(ch)) {
            Ok(byte) if !(0x80..=0x9F).contains(&byte) => Ok(byte),
            _ => Err(ReportError::Encoding { field, ch }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_follow_fixed_order() {
        let record = ReportRecord::new("Ada", Label::Fake, 0.73, "2024-01-01 00:00:00", "x.png");
        let lines: Vec<String> = record.lines().into_iter().map(|(_, line)| line).collect();

        assert_eq!(
            lines,
            vec![
                "Fake Image Detection Report",
                "",
                "User Name: Ada",
                "Media Type: Image",
                "Prediction: Fake",
                "Prediction Accuracy: 0.7300",
                "Date and Time: 2024-01-01 00:00:00",
                "Image File Name: x.png",
            ]
        );
    }

    #[test]
    fn timestamp_uses_report_format() {
        let record = ReportRecord::now("Ada", Label::Real, 0.1, "x.png");
        assert!(chrono::NaiveDateTime::parse_from_str(&record.timestamp, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(record.media_type, "Image");
    }

    #[test]
    fn latin1_accepts_accented_names() {
        assert_eq!(
            encode_latin1("user_name", "José Ñúñez").unwrap(),
            vec![b'J', b'o', b's', 0xE9, b' ', 0xD1, 0xFA, 0xF1, b'e', b'z']
        );
    }

    #[test]
    fn latin1_rejects_c1_controls() {
        let err = encode_latin1("source_filename", "scan\u{80}.png").unwrap_err();
        assert!(matches!(
            err,
            ReportError::Encoding {
                field: "source_filename",
                ch: '\u{80}'
            }
        ));
        assert!(encode_latin1("user_name", "a\u{9F}").is_err());
        assert!(encode_latin1("user_name", "\u{A0}\u{7F}").is_ok());
    }

    #[test]
    fn latin1_rejects_cjk() {
        let err = encode_latin1("user_name", "名前").unwrap_err();
        assert!(matches!(
            err,
            ReportError::Encoding {
                field: "user_name",
                ch: '名'
            }
        ));
    }
}
