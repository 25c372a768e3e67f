use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Column-named numeric table handed to feature-based models.
///
/// Rows are stored row-major; every row has exactly `columns.len()` values.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row. Short rows are padded with 0 and long rows truncated so
    /// the table stays rectangular.
    pub fn push_row(&mut self, mut values: Vec<f64>) {
        values.resize(self.columns.len(), 0.0);
        self.rows.push(values);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Returns a table with exactly `columns`, in that order. Columns this
    /// table does not have are filled with `fill`; columns not listed are
    /// dropped.
    pub fn select_with_fill(&self, columns: &[String], fill: f64) -> FeatureTable {
        let sources: Vec<Option<usize>> = columns
            .iter()
            .map(|column| self.column_index(column))
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                sources
                    .iter()
                    .map(|source| source.map_or(fill, |idx| row[idx]))
                    .collect()
            })
            .collect();

        FeatureTable {
            columns: columns.to_vec(),
            rows,
        }
    }
}

/// Ordered column list a model was trained against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ExpectedFeatureSchema(Vec<String>);

impl ExpectedFeatureSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self(columns)
    }

    pub fn columns(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|column| column == name)
    }
}

impl From<Vec<&str>> for ExpectedFeatureSchema {
    fn from(columns: Vec<&str>) -> Self {
        Self(columns.into_iter().map(str::to_string).collect())
    }
}
