//! Build-matrix decoding and job-name expansion
//!
//! A job with a `strategy.matrix` is fanned out by GitHub into one concrete
//! job per matrix combination, and the branch-protection audit needs the
//! exact display names of those jobs. Three expansion modes exist:
//!
//! - the job name contains `${{ matrix.<key> }}` placeholders: cartesian
//!   product over all dimensions, substituting each value into the template;
//! - no placeholder and a single all-scalar dimension: GitHub appends the
//!   value in parentheses, `"<name> (<value>)"`;
//! - every other unnamed shape is ambiguous and rejected, because guessing
//!   would produce an incomplete required-checks list.
//!
//! Dimension values that are dynamic expressions (for example the output of
//! another job) cannot be expanded statically; they are detected and
//! rejected with a non-fatal error so callers can skip the file.

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;
use serde_yaml::Value;

use super::error::{ValidationError, WorkflowError};

/// A single scalar cell of a build matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::String(text) => f.write_str(text),
            ScalarValue::Integer(number) => write!(f, "{number}"),
            // Exactly one fractional digit. The generated names must match
            // the job names GitHub itself derives, which use this coarse
            // form, so higher precision would break the lookup.
            ScalarValue::Float(number) => write!(f, "{number:.1}"),
            ScalarValue::Bool(flag) => write!(f, "{flag}"),
        }
    }
}

impl ScalarValue {
    fn from_yaml(value: &Value) -> Option<Self> {
        match value {
            // A scalar containing a placeholder is a dynamic expression,
            // not a literal value.
            Value::String(text) if !text.contains("${{") => Some(Self::String(text.clone())),
            Value::Bool(flag) => Some(Self::Bool(*flag)),
            Value::Number(number) => {
                if let Some(integer) = number.as_i64() {
                    Some(Self::Integer(integer))
                } else {
                    number.as_f64().map(Self::Float)
                }
            }
            _ => None,
        }
    }
}

/// One cell of a matrix dimension: either a scalar or a complete row of
/// field values (the shape used by `include:`/`config:` style dimensions).
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixValue {
    Scalar(ScalarValue),
    Object(Vec<(String, ScalarValue)>),
}

/// A decoded build matrix: dimension name to its list of values, sorted by
/// dimension name so the recursion below is deterministic.
#[derive(Debug, Clone)]
struct Matrix {
    dimensions: Vec<(String, Vec<MatrixValue>)>,
}

impl Matrix {
    fn decode(job: &str, raw: &Value) -> Result<Self, WorkflowError> {
        let map = raw.as_mapping().ok_or_else(|| {
            WorkflowError::unsupported_matrix(
                job,
                "the matrix is not a mapping of dimensions; dynamic expressions cannot be expanded",
            )
        })?;
        let mut dimensions = Vec::with_capacity(map.len());
        for (key, value) in map {
            let Some(name) = key.as_str() else {
                return Err(WorkflowError::unsupported_matrix(
                    job,
                    "a matrix dimension name is not a string",
                ));
            };
            dimensions.push((name.to_string(), decode_dimension(job, name, value)?));
        }
        dimensions.sort_by(|left, right| left.0.cmp(&right.0));
        Ok(Self { dimensions })
    }

    fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Cartesian expansion of a templated job name: index-based recursion
    /// over the sorted dimension list, substituting one dimension per level.
    fn substitute_template(&self, template: &str) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.fill_dimension(template.to_string(), 0, &mut names);
        names
    }

    fn fill_dimension(&self, name: String, dimension: usize, out: &mut BTreeSet<String>) {
        let Some((key, values)) = self.dimensions.get(dimension) else {
            out.insert(name);
            return;
        };
        let pattern = placeholder_pattern(key);
        for value in values {
            let filled = match value {
                MatrixValue::Scalar(scalar) => replace_placeholder(&name, &pattern, scalar),
                // A row substitutes all of its fields at once; the row is a
                // single combination, never a cross-product of its fields.
                MatrixValue::Object(fields) => {
                    let mut filled = name.clone();
                    for (field, scalar) in fields {
                        filled = replace_placeholder(&filled, &placeholder_pattern(field), scalar);
                    }
                    filled
                }
            };
            self.fill_dimension(filled, dimension + 1, out);
        }
    }
}

fn decode_dimension(job: &str, name: &str, value: &Value) -> Result<Vec<MatrixValue>, WorkflowError> {
    let cells = value.as_sequence().ok_or_else(|| {
        WorkflowError::unsupported_matrix(
            job,
            format!("dimension '{name}' is not a list of values; dynamic expressions cannot be expanded"),
        )
    })?;
    cells
        .iter()
        .map(|cell| decode_cell(job, name, cell))
        .collect()
}

fn decode_cell(job: &str, dimension: &str, cell: &Value) -> Result<MatrixValue, WorkflowError> {
    if let Some(scalar) = ScalarValue::from_yaml(cell) {
        return Ok(MatrixValue::Scalar(scalar));
    }
    if let Some(map) = cell.as_mapping() {
        let mut fields = Vec::with_capacity(map.len());
        for (key, value) in map {
            match (key.as_str(), ScalarValue::from_yaml(value)) {
                (Some(field), Some(scalar)) => fields.push((field.to_string(), scalar)),
                _ => {
                    return Err(WorkflowError::unsupported_matrix(
                        job,
                        format!("dimension '{dimension}' holds an object with non-scalar fields"),
                    ))
                }
            }
        }
        return Ok(MatrixValue::Object(fields));
    }
    Err(WorkflowError::unsupported_matrix(
        job,
        format!("dimension '{dimension}' holds a value that is neither a scalar nor a flat object"),
    ))
}

/// Expand one job into its concrete display names.
///
/// `matrix` is the raw `strategy.matrix` value; it is decoded here, not at
/// document-parse time, so that workflows with unsupported matrices still
/// parse and classify their triggers.
pub(crate) fn expand_job_names(
    job_key: &str,
    explicit_name: Option<&str>,
    matrix: Option<&Value>,
) -> Result<BTreeSet<String>, WorkflowError> {
    let base = explicit_name.unwrap_or(job_key);
    let Some(raw) = matrix else {
        return Ok(BTreeSet::from([base.to_string()]));
    };
    let matrix = Matrix::decode(job_key, raw)?;
    if matrix.is_empty() {
        return Ok(BTreeSet::from([base.to_string()]));
    }
    if base.contains("${{") {
        return Ok(matrix.substitute_template(base));
    }
    match matrix.dimensions.as_slice() {
        [(_, values)] => {
            let mut names = BTreeSet::new();
            for value in values {
                match value {
                    MatrixValue::Scalar(scalar) => {
                        names.insert(format!("{base} ({scalar})"));
                    }
                    MatrixValue::Object(_) => {
                        return Err(ValidationError::ObjectParametersWithoutName.into())
                    }
                }
            }
            Ok(names)
        }
        _ => Err(ValidationError::MultiDimensionalMatrixWithoutName.into()),
    }
}

/// `${{ matrix.<key> }}`, whitespace-tolerant, key taken literally.
fn placeholder_pattern(key: &str) -> Regex {
    let pattern = format!(r"\$\{{\{{\s*matrix\.{}\s*\}}\}}", regex::escape(key));
    Regex::new(&pattern).expect("escaped placeholder pattern is valid")
}

fn replace_placeholder(name: &str, pattern: &Regex, scalar: &ScalarValue) -> String {
    pattern
        .replace_all(name, regex::NoExpand(&scalar.to_string()))
        .into_owned()
}
