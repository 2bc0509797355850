//! Name list state and the paint step that copies names onto spots.

use kart_protocol::NameList;

use crate::cache::NameCache;
use crate::error::StateError;
use crate::grid::RenderedGrid;

/// Where the current name list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    Cache,
    Default,
    Server,
}

/// Copy `names[i]` onto spot `i`.
///
/// Names are paired with spots positionally; surplus names are dropped and
/// reported as [`StateError::RenderMismatch`] after every in-range label has
/// been set. Spots beyond the end of a short list keep their labels.
pub fn paint(names: &NameList, grid: &mut RenderedGrid) -> Result<(), StateError> {
    let spots = grid.spots_mut();
    let spot_count = spots.len();

    for (spot, name) in spots.iter_mut().zip(names.iter()) {
        spot.set_label(name);
    }

    if names.len() > spot_count {
        return Err(StateError::RenderMismatch {
            names: names.len(),
            spots: spot_count,
        });
    }
    Ok(())
}

/// The current name list. Always replaced as a whole.
#[derive(Debug, Clone)]
pub struct NameState {
    names: NameList,
    source: NameSource,
}

impl NameState {
    /// Seed from the cached value under `key` when it is present and
    /// non-empty, otherwise `0..default_count`.
    pub fn initial(cache: &dyn NameCache, key: &str, default_count: usize) -> Self {
        match cache.get(key).filter(|raw| !raw.is_empty()) {
            Some(raw) => {
                let names = NameList::parse(&raw);
                tracing::info!(count = names.len(), "Loaded names from cache");
                Self {
                    names,
                    source: NameSource::Cache,
                }
            }
            None => Self {
                names: NameList::defaults(default_count),
                source: NameSource::Default,
            },
        }
    }

    pub fn names(&self) -> &NameList {
        &self.names
    }

    pub fn source(&self) -> NameSource {
        self.source
    }

    pub fn paint(&self, grid: &mut RenderedGrid) -> Result<(), StateError> {
        paint(&self.names, grid)
    }

    /// Swap in a server-provided list, then paint it once.
    pub fn replace(&mut self, names: NameList, grid: &mut RenderedGrid) -> Result<(), StateError> {
        self.names = names;
        self.source = NameSource::Server;
        self.paint(grid)
    }
}
