/// Dense hour × generator grid of energy values (MWh).
///
/// Rows are hours, columns are fleet indices. The engine writes each row
/// exactly once during a run; afterwards callers only get shared access.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyMatrix {
    hours: usize,
    columns: usize,
    data: Vec<f64>,
}

impl HourlyMatrix {
    /// Creates a zero-filled matrix.
    pub fn zeros(hours: usize, columns: usize) -> Self {
        Self {
            hours,
            columns,
            data: vec![0.0; hours * columns],
        }
    }

    pub fn hours(&self) -> usize {
        self.hours
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, hour: usize, column: usize) -> f64 {
        self.data[hour * self.columns + column]
    }

    pub fn row(&self, hour: usize) -> &[f64] {
        &self.data[hour * self.columns..(hour + 1) * self.columns]
    }

    /// Overwrites one hour.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not have one entry per column.
    pub(crate) fn set_row(&mut self, hour: usize, values: &[f64]) {
        let start = hour * self.columns;
        self.data[start..start + self.columns].copy_from_slice(values);
    }

    /// Values of one column across all hours.
    pub fn column(&self, column: usize) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().skip(column).step_by(self.columns.max(1)).copied()
    }

    pub fn row_sum(&self, hour: usize) -> f64 {
        self.row(hour).iter().sum()
    }

    pub fn column_total(&self, column: usize) -> f64 {
        self.column(column).sum()
    }

    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }
}
