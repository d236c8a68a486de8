//! Boundary to the interactive map the markers are drawn on.

use crate::error::Result;
use crate::marker::optimizer::Marker;
use geo::Point;
use vacancy_types::Viewport;

/// Operations the engine needs from a map widget.
///
/// Every method may fail with [`VacancyError::MapUnavailable`] while the
/// widget is still loading; callers treat that as "do nothing this time".
///
/// [`VacancyError::MapUnavailable`]: crate::VacancyError::MapUnavailable
pub trait MapWidget {
    /// Visible bounds and integer zoom.
    fn viewport(&self) -> Result<Viewport>;

    fn set_zoom(&mut self, zoom: u8) -> Result<()>;

    fn set_center(&mut self, center: Point) -> Result<()>;

    /// Detach every marker added since the last clear.
    fn clear_markers(&mut self) -> Result<()>;

    fn add_marker(&mut self, marker: &Marker) -> Result<()>;

    /// Replace the markers on the map with `markers`.
    fn show_markers(&mut self, markers: &[Marker]) -> Result<()> {
        self.clear_markers()?;
        for marker in markers {
            self.add_marker(marker)?;
        }
        Ok(())
    }
}

impl<M: MapWidget + ?Sized> MapWidget for Box<M> {
    fn viewport(&self) -> Result<Viewport> {
        (**self).viewport()
    }

    fn set_zoom(&mut self, zoom: u8) -> Result<()> {
        (**self).set_zoom(zoom)
    }

    fn set_center(&mut self, center: Point) -> Result<()> {
        (**self).set_center(center)
    }

    fn clear_markers(&mut self) -> Result<()> {
        (**self).clear_markers()
    }

    fn add_marker(&mut self, marker: &Marker) -> Result<()> {
        (**self).add_marker(marker)
    }

    fn show_markers(&mut self, markers: &[Marker]) -> Result<()> {
        (**self).show_markers(markers)
    }
}
