use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::{
    analysis::bbox::Bbox,
    consts::{CLASS_ID_COLUMN, XMAX_COLUMN, XMIN_COLUMN, YMAX_COLUMN, YMIN_COLUMN},
    error::{ColumnOutOfRangeSnafu, InvalidLayoutSnafu, Result},
};

/// Which column of a label table holds which box field.
///
/// Upstream stages do not agree on a column order, so the layout is
/// configuration rather than something inferred from the data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub class_id: usize,
    pub xmin: usize,
    pub ymin: usize,
    pub xmax: usize,
    pub ymax: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            class_id: CLASS_ID_COLUMN,
            xmin: XMIN_COLUMN,
            ymin: YMIN_COLUMN,
            xmax: XMAX_COLUMN,
            ymax: YMAX_COLUMN,
        }
    }
}

impl ColumnLayout {
    fn columns(&self) -> [(&'static str, usize); 5] {
        [
            ("class_id", self.class_id),
            ("xmin", self.xmin),
            ("ymin", self.ymin),
            ("xmax", self.xmax),
            ("ymax", self.ymax),
        ]
    }

    /// Checks that no two fields share a column.
    pub fn validate(&self) -> Result<()> {
        let columns = self.columns();
        for (i, (name, column)) in columns.iter().enumerate() {
            if let Some((other, _)) = columns[i + 1..].iter().find(|(_, c)| c == column) {
                return InvalidLayoutSnafu {
                    message: format!("`{name}` and `{other}` both map to column {column}"),
                }
                .fail();
            }
        }

        Ok(())
    }

    fn max_column(&self) -> usize {
        self.columns()
            .iter()
            .map(|(_, column)| *column)
            .max()
            .unwrap_or_default()
    }

    /// Number of columns a label table needs for this layout to be addressable.
    ///
    /// Saturates at `usize::MAX`, which no table can reach.
    pub fn min_columns(&self) -> usize {
        self.max_column().saturating_add(1)
    }

    /// Fails when a table with `columns` columns is too narrow for this layout.
    pub fn check_width(&self, columns: usize) -> Result<()> {
        let column = self.max_column();
        ensure!(
            column < columns,
            ColumnOutOfRangeSnafu { column, columns }
        );

        Ok(())
    }

    /// Reads the box corners out of one label row.
    ///
    /// The row must be at least [`ColumnLayout::min_columns`] wide.
    pub fn bbox(&self, row: ArrayView1<f32>) -> Bbox {
        Bbox::from_corners(row[self.xmin], row[self.ymin], row[self.xmax], row[self.ymax])
    }

    /// Reads the class id out of one label row.
    pub fn class_id(&self, row: ArrayView1<f32>) -> f32 {
        row[self.class_id]
    }
}
