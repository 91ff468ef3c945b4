use crate::chart::ChartError;

use std::collections::BTreeMap;

/// The drawable elements a dashboard page lays out, by element id.
///
/// A surface hosts at most one chart. Claiming hands out a [`Surface`] token
/// which goes back to the page when its chart is destroyed.
#[derive(Debug, Default)]
pub struct Page {
    // id -> claimed?
    surfaces: BTreeMap<String, bool>,
}

/// Exclusive claim on one surface of a [`Page`].
#[derive(Debug, PartialEq, Eq)]
pub struct Surface {
    id: String,
}

impl Surface {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surfaces<I, S>(ids: I) -> Result<Self, ChartError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut page = Self::new();
        for id in ids {
            page.declare(id)?;
        }
        Ok(page)
    }

    /// Adds a drawable element. Ids follow HTML rules: non-empty, no spaces.
    pub fn declare(&mut self, id: impl Into<String>) -> Result<(), ChartError> {
        let id = id.into();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(ChartError::InvalidSurfaceId(id));
        }

        self.surfaces.entry(id).or_insert(false);
        Ok(())
    }

    pub fn claim(&mut self, id: &str) -> Result<Surface, ChartError> {
        match self.surfaces.get_mut(id) {
            None => Err(ChartError::SurfaceNotFound(id.to_owned())),
            Some(true) => Err(ChartError::SurfaceInUse(id.to_owned())),
            Some(claimed) => {
                *claimed = true;
                Ok(Surface { id: id.to_owned() })
            }
        }
    }

    pub fn release(&mut self, surface: Surface) {
        if let Some(claimed) = self.surfaces.get_mut(&surface.id) {
            *claimed = false;
        }
    }

    pub fn is_claimed(&self, id: &str) -> bool {
        self.surfaces.get(id).copied().unwrap_or(false)
    }
}
