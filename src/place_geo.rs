use geo::BoundingRect;
use geo_types::{MultiPoint, Point, Rect};
use num_traits::Float;

use crate::types::{dto::place::Place, model::place::PlaceRecord};

pub fn is_valid_coord<N: Float>(value: N) -> bool {
    value.is_finite()
}

/// Both halves present and finite.
pub fn locate(lat: Option<f64>, lng: Option<f64>) -> Option<Point<f64>> {
    match (lat, lng) {
        (Some(lat), Some(lng)) if is_valid_coord(lat) && is_valid_coord(lng) => {
            Some(Point::new(lng, lat))
        }
        _ => None,
    }
}

/// Anything that may sit on the map. Points are (x = lng, y = lat).
pub trait Locate {
    fn location(&self) -> Option<Point<f64>>;

    fn is_locatable(&self) -> bool {
        self.location().is_some()
    }
}

impl Locate for PlaceRecord {
    fn location(&self) -> Option<Point<f64>> {
        locate(self.lat, self.long)
    }
}

impl Locate for Place {
    fn location(&self) -> Option<Point<f64>> {
        locate(self.lat, self.lng)
    }
}

impl Locate for Point<f64> {
    fn location(&self) -> Option<Point<f64>> {
        locate(Some(self.y()), Some(self.x()))
    }
}

impl<T: Locate> Locate for &T {
    fn location(&self) -> Option<Point<f64>> {
        (*self).location()
    }
}

//Get the bounding box for everything locatable, None when nothing is
pub trait BoundingBox {
    fn bounding_box(&self) -> Option<Rect<f64>>;
}

impl<T: Locate> BoundingBox for [T] {
    fn bounding_box(&self) -> Option<Rect<f64>> {
        let points: MultiPoint<f64> = self.iter().filter_map(Locate::location).collect();
        points.bounding_rect()
    }
}

pub fn center(rect: &Rect<f64>) -> Point<f64> {
    rect.center().into()
}

/// Overview zoom for a box: the wider the spread in degrees, the further out.
pub fn overview_zoom(rect: &Rect<f64>, default_zoom: f64) -> f64 {
    let spread = rect.width().max(rect.height());
    if spread > 0.2 {
        9.0
    } else if spread > 0.1 {
        10.0
    } else if spread < 0.02 {
        13.0
    } else if spread < 0.05 {
        12.0
    } else {
        default_zoom
    }
}
