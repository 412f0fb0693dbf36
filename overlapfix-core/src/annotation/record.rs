use serde::Serialize;
use tracing::*;

use crate::{
    analysis::{
        bbox::{Bbox, CenterBox},
        category::ClassId,
    },
    consts::{COORD_PRECISION, RECORD_FIELDS},
};

/// One annotation record: `class_id x_center y_center width height`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Annotation {
    pub class_id: ClassId,
    pub bbox: CenterBox,
    /// The line this record was read from, including its terminator.
    ///
    /// Records kept unchanged are written back from this text so the line is
    /// byte-identical to the input.
    #[serde(skip)]
    pub source: Option<String>,
}

impl Annotation {
    pub fn new(class_id: ClassId, bbox: CenterBox) -> Self {
        Self {
            class_id,
            bbox,
            source: None,
        }
    }

    /// Parses one line, returning `None` for lines that are not exactly five
    /// tokens or whose tokens are not numeric.
    pub fn parse(line: &str) -> Option<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != RECORD_FIELDS {
            return None;
        }

        let class_id = tokens[0].parse::<ClassId>().ok()?;
        let mut fields = [0.0f64; 4];
        for (field, token) in fields.iter_mut().zip(&tokens[1..]) {
            *field = match token.parse::<f64>() {
                Ok(value) => value,
                Err(_) => {
                    trace!("non-numeric field `{}` in `{}`", token, line.trim_end());
                    return None;
                }
            };
        }

        let [x_center, y_center, width, height] = fields;
        Some(Self {
            class_id,
            bbox: CenterBox::new(x_center, y_center, width, height),
            source: Some(line.to_string()),
        })
    }

    /// Corner-form geometry in normalized space.
    pub fn corner(&self) -> Bbox {
        self.bbox.to_corner()
    }

    /// Formats the record with fixed-point fields and a trailing newline.
    pub fn format_record(&self) -> String {
        let CenterBox { center, size } = self.bbox;
        format!(
            "{} {:.p$} {:.p$} {:.p$} {:.p$}\n",
            self.class_id,
            center.x,
            center.y,
            size.x,
            size.y,
            p = COORD_PRECISION
        )
    }

    /// Appends this record as one newline-terminated line, verbatim when it
    /// was read from text.
    pub fn write_line(&self, out: &mut String) {
        match &self.source {
            Some(line) => {
                out.push_str(line);
                if !line.ends_with('\n') {
                    out.push('\n');
                }
            }
            None => out.push_str(&self.format_record()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record() {
        let record = Annotation::parse("29 0.500000 0.250000 0.100000 0.200000\n").unwrap();
        assert_eq!(record.class_id, 29);
        assert_eq!(record.bbox, CenterBox::new(0.5, 0.25, 0.1, 0.2));
        assert_eq!(
            record.source.as_deref(),
            Some("29 0.500000 0.250000 0.100000 0.200000\n")
        );
    }

    #[test]
    fn test_parse_tolerates_extra_whitespace() {
        let record = Annotation::parse("  3\t0.5   0.5 0.25 0.25  \r\n").unwrap();
        assert_eq!(record.class_id, 3);
        assert_eq!(record.bbox, CenterBox::new(0.5, 0.5, 0.25, 0.25));
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert!(Annotation::parse("").is_none());
        assert!(Annotation::parse("\n").is_none());
        assert!(Annotation::parse("29 0.5 0.5 0.1").is_none());
        assert!(Annotation::parse("29 0.5 0.5 0.1 0.1 0.9").is_none());
        assert!(Annotation::parse("valve 0.5 0.5 0.1 0.1").is_none());
        assert!(Annotation::parse("29.0 0.5 0.5 0.1 0.1").is_none());
        assert!(Annotation::parse("29 0.5 half 0.1 0.1").is_none());
    }

    #[test]
    fn test_format_record() {
        let record = Annotation::new(31, CenterBox::new(0.25, 0.5, 0.125, 1.0));
        assert_eq!(
            record.format_record(),
            "31 0.250000 0.500000 0.125000 1.000000\n"
        );

        let rounded = Annotation::new(0, CenterBox::new(0.1234564, 0.9999996, 0.5, 0.5));
        assert_eq!(
            rounded.format_record(),
            "0 0.123456 1.000000 0.500000 0.500000\n"
        );
    }

    #[test]
    fn test_write_line_is_verbatim() {
        let original = "29   0.5 0.5 0.1 0.1\r\n";
        let record = Annotation::parse(original).unwrap();
        let mut out = String::new();
        record.write_line(&mut out);
        assert_eq!(out, original);

        // A final line without terminator gains one
        let last = Annotation::parse("1 0.5 0.5 0.1 0.1").unwrap();
        let mut out = String::new();
        last.write_line(&mut out);
        assert_eq!(out, "1 0.5 0.5 0.1 0.1\n");
    }
}
