use geo::{coord, Rect};

use crate::grid::LatLng;

/// Trait to grow axis-aligned boxes in longitude (`x`) and latitude (`y`)
///
/// # Examples
///
/// ```rust
/// use geo::{coord, Rect};
/// use hexpath_core::{grid::LatLng, util::extend_rect::ExtendRect};
///
/// let mut bb = Rect::from_latlng(LatLng { lat: 2.0, lng: 1.0 });
/// assert_eq!(bb.min(), coord! { x: 1.0, y: 2.0 });
/// assert_eq!(bb.max(), coord! { x: 1.0, y: 2.0 });
///
/// bb.extend_latlng(LatLng { lat: 6.0, lng: 5.0 });
/// bb.extend_latlng(LatLng { lat: -6.0, lng: -7.0 });
/// assert_eq!(bb.min(), coord! { x: -7.0, y: -6.0 });
/// assert_eq!(bb.max(), coord! { x: 5.0, y: 6.0 });
/// ```
///
/// ```rust
/// use geo::{coord, Rect};
/// use hexpath_core::util::extend_rect::ExtendRect;
///
/// let mut bb1 = Rect::new(coord! { x: 1.0, y: 2.0 }, coord! { x: 4.0, y: 5.0 });
/// let bb2 = Rect::new(coord! { x: 40.0, y: 50.0 }, coord! { x: 70.0, y: 80.0 });
///
/// bb1.extend_rect(&bb2);
/// assert_eq!(bb1.min(), coord! { x: 1.0, y: 2.0 });
/// assert_eq!(bb1.max(), coord! { x: 70.0, y: 80.0 });
/// ```
pub trait ExtendRect {
    /// Creates a degenerate box covering exactly one position
    fn from_latlng(ll: LatLng) -> Self;

    /// Extends the box so it covers the given position
    fn extend_latlng(&mut self, ll: LatLng);

    /// Extends the box so it covers the given other box
    fn extend_rect(&mut self, other: &Rect);
}

impl ExtendRect for Rect {
    fn from_latlng(ll: LatLng) -> Self {
        let c = coord! { x: ll.lng, y: ll.lat };
        Rect::new(c, c)
    }

    fn extend_latlng(&mut self, ll: LatLng) {
        let min = self.min();
        self.set_min((min.x.min(ll.lng), min.y.min(ll.lat)));
        let max = self.max();
        self.set_max((max.x.max(ll.lng), max.y.max(ll.lat)));
    }

    fn extend_rect(&mut self, other: &Rect) {
        let min = self.min();
        let other_min = other.min();
        self.set_min((min.x.min(other_min.x), min.y.min(other_min.y)));
        let max = self.max();
        let other_max = other.max();
        self.set_max((max.x.max(other_max.x), max.y.max(other_max.y)));
    }
}
