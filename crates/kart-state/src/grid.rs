//! Retained spot grid built once from a parsed layout.

use kart_protocol::{CellDescriptor, Layout, Orientation};

/// A rendered spot: its orientation marker and current label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotElement {
    orientation: Orientation,
    label: String,
}

impl SpotElement {
    fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            label: String::new(),
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn set_label(&mut self, label: &str) {
        self.label.clear();
        self.label.push_str(label);
    }
}

/// One positioned cell. Spots point into the ordered spot sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCell {
    Blank,
    Spot(usize),
}

/// The grid container with every cell appended in layout order.
///
/// Only [`RenderedGrid::render`] builds one, so cells are never appended
/// twice to the same grid.
#[derive(Debug, Clone)]
pub struct RenderedGrid {
    columns: usize,
    cells: Vec<GridCell>,
    spots: Vec<SpotElement>,
}

impl RenderedGrid {
    /// Materialize the layout. Performs no validation: a column count that
    /// disagrees with the real row widths only changes how rows wrap.
    pub fn render(layout: &Layout) -> Self {
        let mut cells = Vec::with_capacity(layout.cells().len());
        let mut spots = Vec::with_capacity(layout.spot_count());

        for descriptor in layout.cells() {
            match descriptor {
                CellDescriptor::Blank => cells.push(GridCell::Blank),
                CellDescriptor::Spot(orientation) => {
                    cells.push(GridCell::Spot(spots.len()));
                    spots.push(SpotElement::new(*orientation));
                }
            }
        }

        tracing::debug!(
            columns = layout.columns(),
            cells = cells.len(),
            spots = spots.len(),
            "Rendered layout grid"
        );

        Self {
            columns: layout.columns(),
            cells,
            spots,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Spots in addressing order.
    pub fn spots(&self) -> &[SpotElement] {
        &self.spots
    }

    pub(crate) fn spots_mut(&mut self) -> &mut [SpotElement] {
        &mut self.spots
    }

    pub fn spot(&self, index: usize) -> Option<&SpotElement> {
        self.spots.get(index)
    }

    pub fn spot_count(&self) -> usize {
        self.spots.len()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.spots.iter().map(SpotElement::label).collect()
    }

    /// Cells wrapped into visual rows of `columns` tracks. A zero column
    /// count wraps after every cell.
    pub fn rows(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(self.columns.max(1))
    }

    /// Plain-text picture of the grid, one string per visual row. Every
    /// track is as wide as the widest `arrow label` pair.
    pub fn render_text(&self) -> Vec<String> {
        let width = self
            .spots
            .iter()
            .map(|s| s.label.chars().count() + 2)
            .max()
            .unwrap_or(1);

        self.rows()
            .map(|row| {
                let mut line = String::new();
                for (i, cell) in row.iter().enumerate() {
                    if i > 0 {
                        line.push(' ');
                    }
                    let text = match cell {
                        GridCell::Blank => String::new(),
                        GridCell::Spot(index) => {
                            let spot = &self.spots[*index];
                            format!("{} {}", spot.orientation.arrow(), spot.label)
                        }
                    };
                    line.push_str(&format!("{text:<width$}"));
                }
                line.trim_end().to_string()
            })
            .collect()
    }
}
