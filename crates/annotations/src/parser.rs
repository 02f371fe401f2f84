use crate::error::AnnotationError;
use core_types::{Configuration, Step};
use serde::Serialize;

/// Field separator of annotation files. Chosen so comments may contain commas.
pub const FIELD_SEPARATOR: char = '^';

const CONFIGURATION_MARKER: char = '$';
const STEP_MARKER: char = '*';

/// Where an annotation applies. `None` means "all".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Scope {
    pub configuration: Option<Configuration>,
    pub step: Option<Step>,
}

impl Scope {
    pub fn matches(&self, step: Step, configuration: Configuration) -> bool {
        self.configuration.is_none_or(|c| c == configuration) && self.step.is_none_or(|s| s == step)
    }

    /// Number of dimensions this scope pins down (0 to 2).
    pub fn specificity(&self) -> u8 {
        u8::from(self.configuration.is_some()) + u8::from(self.step.is_some())
    }
}

/// One annotation line: a key, its scope, and one value per declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub key: String,
    pub scope: Scope,
    pub values: Vec<String>,
    pub line: usize,
}

/// Parses the header line into column names.
pub(crate) fn parse_header(line: &str) -> Vec<String> {
    line.split(FIELD_SEPARATOR)
        .map(|c| c.trim().to_string())
        .collect()
}

/// Parses `key[$config][*step]^value1^value2...` against `columns` values.
pub(crate) fn parse_line(
    origin: &str,
    line_no: usize,
    line: &str,
    columns: usize,
) -> Result<Annotation, AnnotationError> {
    let mut tokens = line.split(FIELD_SEPARATOR);
    let key_token = tokens.next().unwrap_or_default();
    let (key, scope) = parse_key(origin, line_no, key_token)?;

    let values: Vec<String> = tokens.map(clean_value).collect();
    if values.len() < columns {
        return Err(AnnotationError::MalformedLine {
            origin: origin.to_string(),
            line: line_no,
            key,
            expected: columns,
            found: values.len(),
        });
    }
    if values.len() > columns {
        tracing::warn!(
            origin,
            line = line_no,
            key = %key,
            extra = values.len() - columns,
            "Annotation line has more values than declared columns; ignoring the extras."
        );
    }

    Ok(Annotation {
        key,
        scope,
        values: values.into_iter().take(columns).collect(),
        line: line_no,
    })
}

/// Splits a key token into the bare key and its scope.
///
/// Scope markers may appear in either order: `GROUP$x8*CFIN` and
/// `GROUP*CFIN$x8` are the same scope.
fn parse_key(origin: &str, line_no: usize, token: &str) -> Result<(String, Scope), AnnotationError> {
    let markers = [CONFIGURATION_MARKER, STEP_MARKER];
    let token = token.trim().trim_matches(',');
    let split_at = token.find(markers).unwrap_or(token.len());
    let (key, mut rest) = token.split_at(split_at);

    let key = key.trim();
    if key.is_empty() {
        return Err(AnnotationError::EmptyKey {
            origin: origin.to_string(),
            line: line_no,
        });
    }

    let invalid = |token: &str, reason: String| AnnotationError::InvalidScope {
        origin: origin.to_string(),
        line: line_no,
        token: token.to_string(),
        reason,
    };

    let mut scope = Scope::default();
    while let Some(marker) = rest.chars().next() {
        let body = &rest[marker.len_utf8()..];
        let end = body.find(markers).unwrap_or(body.len());
        let value = body[..end].trim();

        if marker == CONFIGURATION_MARKER {
            if scope.configuration.is_some() {
                return Err(invalid(value, "configuration given twice".to_string()));
            }
            let configuration = value.parse::<Configuration>().map_err(|e| invalid(value, e.to_string()))?;
            scope.configuration = Some(configuration);
        } else {
            if scope.step.is_some() {
                return Err(invalid(value, "step given twice".to_string()));
            }
            let step = value.parse::<Step>().map_err(|e| invalid(value, e.to_string()))?;
            scope.step = Some(step);
        }

        rest = &body[end..];
    }

    Ok((key.to_string(), scope))
}

fn clean_value(value: &str) -> String {
    value.trim().trim_matches(',').trim().to_string()
}
