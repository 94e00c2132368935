//! Reading annotated correspondences from disk.
//!
//! Two formats are understood, chosen by file extension:
//!
//! * JSON (`.json`): `{"reference": [[label, x, y], ...], "source": [[label, x, y], ...]}`
//! * CSV (anything else): one `label,ref_x,ref_y,src_x,src_y` row per pair. Blank
//!   lines, `#` comments and a non-numeric header row are skipped.
//!
//! Labels only need to agree between the two images; they are paired by
//! [`CorrespondenceSet::from_labeled`](homography::CorrespondenceSet::from_labeled).

use homography::LabeledPoint;
use serde::Deserialize;
use std::{fs, io, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PointsError {
    #[error("failed to read correspondence file: {0}")]
    Io(#[from] io::Error),
    #[error("malformed correspondence JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed correspondence CSV on line {line}: {message}")]
    Csv { line: usize, message: String },
}

/// Annotations of both images, not yet paired.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotations {
    pub reference: Vec<LabeledPoint>,
    pub source: Vec<LabeledPoint>,
}

#[derive(Deserialize)]
struct JsonAnnotations {
    reference: Vec<(u32, f64, f64)>,
    source: Vec<(u32, f64, f64)>,
}

impl From<JsonAnnotations> for Annotations {
    fn from(json: JsonAnnotations) -> Self {
        let labeled = |points: Vec<(u32, f64, f64)>| {
            points
                .into_iter()
                .map(|(label, x, y)| LabeledPoint::new(label, x, y))
                .collect()
        };
        Self {
            reference: labeled(json.reference),
            source: labeled(json.source),
        }
    }
}

pub fn load(path: impl AsRef<Path>) -> Result<Annotations, PointsError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        parse_json(&text)
    } else {
        parse_csv(&text)
    }
}

pub fn parse_json(text: &str) -> Result<Annotations, PointsError> {
    Ok(serde_json::from_str::<JsonAnnotations>(text)?.into())
}

pub fn parse_csv(text: &str) -> Result<Annotations, PointsError> {
    let mut annotations = Annotations {
        reference: vec![],
        source: vec![],
    };
    for (ix, line) in text.lines().enumerate() {
        let line_number = ix + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let Ok(label) = fields[0].parse::<u32>() else {
            if annotations.reference.is_empty() {
                // Header row.
                continue;
            }
            return Err(PointsError::Csv {
                line: line_number,
                message: format!("invalid label {:?}", fields[0]),
            });
        };
        if fields.len() != 5 {
            return Err(PointsError::Csv {
                line: line_number,
                message: format!("expected 5 fields, found {}", fields.len()),
            });
        }
        let mut coordinates = [0.0; 4];
        for (value, field) in coordinates.iter_mut().zip(&fields[1..]) {
            *value = field.parse().map_err(|_| PointsError::Csv {
                line: line_number,
                message: format!("invalid coordinate {:?}", field),
            })?;
        }
        let [rx, ry, sx, sy] = coordinates;
        annotations
            .reference
            .push(LabeledPoint::new(label, rx, ry));
        annotations.source.push(LabeledPoint::new(label, sx, sy));
    }
    Ok(annotations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_sides_may_differ_in_order() {
        let annotations = parse_json(
            r#"{"reference": [[2, 10.0, 20.0], [1, 1.5, 2.5]],
                "source": [[1, 3.0, 4.0], [2, 30.0, 40.0]]}"#,
        )
        .unwrap();
        assert_eq!(annotations.reference[1], LabeledPoint::new(1, 1.5, 2.5));
        assert_eq!(annotations.source[0], LabeledPoint::new(1, 3.0, 4.0));
    }

    #[test]
    fn json_requires_both_sides() {
        assert!(matches!(
            parse_json(r#"{"reference": []}"#),
            Err(PointsError::Json(_))
        ));
    }

    #[test]
    fn csv_with_header_and_comments() {
        let annotations = parse_csv(
            "label,ref_x,ref_y,src_x,src_y\n\
             # corners\n\
             1, 0, 0, 10, 10\n\
             \n\
             2, 100, 0, 90, 5\n",
        )
        .unwrap();
        assert_eq!(
            annotations.reference,
            vec![LabeledPoint::new(1, 0.0, 0.0), LabeledPoint::new(2, 100.0, 0.0)]
        );
        assert_eq!(
            annotations.source,
            vec![LabeledPoint::new(1, 10.0, 10.0), LabeledPoint::new(2, 90.0, 5.0)]
        );
    }

    #[test]
    fn csv_reports_the_offending_line() {
        let err = parse_csv("1,0,0,1,1\n2,0,zero,1,1\n").unwrap_err();
        assert!(matches!(err, PointsError::Csv { line: 2, .. }), "{}", err);
        let err = parse_csv("1,0,0,1\n").unwrap_err();
        assert!(matches!(err, PointsError::Csv { line: 1, .. }), "{}", err);
        let err = parse_csv("1,0,0,1,1\nx,0,0,1,1\n").unwrap_err();
        assert!(matches!(err, PointsError::Csv { line: 2, .. }), "{}", err);
    }
}
