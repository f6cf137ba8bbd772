//! Great-circle distance and proximity queries over fixed point sets

/// Mean Earth radius
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default search radius around a property
pub const DEFAULT_RADIUS_KM: f64 = 1.0;

/// Anything with a position
pub trait Located {
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
}

/// Haversine distance between two coordinates in kilometers
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (lat1, lng1, lat2, lng2) = (
        lat1.to_radians(),
        lng1.to_radians(),
        lat2.to_radians(),
        lng2.to_radians(),
    );

    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// A point from the set together with its distance from the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearby<'a, T> {
    pub point: &'a T,
    pub distance_km: f64,
}

/// Immutable set of points with coordinates held column-wise in radians, so
/// a query is one pass over contiguous arrays.
#[derive(Debug, Clone)]
pub struct PointSet<T> {
    points: Vec<T>,
    lat_rad: Vec<f64>,
    lng_rad: Vec<f64>,
    cos_lat: Vec<f64>,
}

impl<T> Default for PointSet<T> {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            lat_rad: Vec::new(),
            lng_rad: Vec::new(),
            cos_lat: Vec::new(),
        }
    }
}

impl<T: Located> PointSet<T> {
    pub fn new(points: Vec<T>) -> Self {
        let lat_rad: Vec<f64> = points.iter().map(|p| p.latitude().to_radians()).collect();
        let lng_rad = points.iter().map(|p| p.longitude().to_radians()).collect();
        let cos_lat = lat_rad.iter().map(|lat| lat.cos()).collect();

        Self {
            points,
            lat_rad,
            lng_rad,
            cos_lat,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.points.iter()
    }

    /// Distance from the query to every point, in point order
    pub fn distances_km(&self, lat: f64, lng: f64) -> Vec<f64> {
        let lat = lat.to_radians();
        let lng = lng.to_radians();
        let cos_query = lat.cos();

        self.lat_rad
            .iter()
            .zip(&self.lng_rad)
            .zip(&self.cos_lat)
            .map(|((p_lat, p_lng), cos_p)| {
                let half_dlat = ((p_lat - lat) / 2.0).sin();
                let half_dlng = ((p_lng - lng) / 2.0).sin();
                let a = half_dlat * half_dlat + cos_query * cos_p * half_dlng * half_dlng;
                2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
            })
            .collect()
    }

    /// Points within `radius_km` of the query, nearest first. Points with
    /// unusable (NaN) coordinates never match.
    pub fn near(&self, lat: f64, lng: f64, radius_km: f64) -> Vec<Nearby<'_, T>> {
        let mut nearby: Vec<Nearby<'_, T>> = self
            .distances_km(lat, lng)
            .into_iter()
            .zip(&self.points)
            .filter(|(distance_km, _)| *distance_km <= radius_km)
            .map(|(distance_km, point)| Nearby { point, distance_km })
            .collect();

        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        nearby
    }

    /// Placeholder score: how many points are within the radius.
    // TODO: weight bus stops by route count and schools by type once the
    // datasets carry those columns.
    pub fn score(&self, lat: f64, lng: f64, radius_km: f64) -> usize {
        self.distances_km(lat, lng)
            .into_iter()
            .filter(|distance_km| *distance_km <= radius_km)
            .count()
    }
}

impl<T: Located> FromIterator<T> for PointSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        PointSet::new(iter.into_iter().collect())
    }
}

/// Free-function form of [`PointSet::near`]
pub fn near<T: Located>(lat: f64, lng: f64, points: &PointSet<T>, radius_km: f64) -> Vec<Nearby<'_, T>> {
    points.near(lat, lng, radius_km)
}

/// Free-function form of [`PointSet::score`]
pub fn score<T: Located>(lat: f64, lng: f64, points: &PointSet<T>, radius_km: f64) -> usize {
    points.score(lat, lng, radius_km)
}
