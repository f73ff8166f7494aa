use crate::card::TrainColor;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Stable index of a city in its [`crate::map::Map`].
///
/// # JSON
/// Serialized as a plain integer.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct CityId(pub usize);

/// Stable index of a track in its [`crate::map::Map`].
///
/// # JSON
/// Serialized as a plain integer.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct TrackId(pub usize);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "city #{}", self.0)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track #{}", self.0)
    }
}

/// Top-level representation of a connection between two cities.
pub type CityToCity = (CityId, CityId);

/// Most cities have no more than 8 incident tracks.
pub type IncidentTracks = SmallVec<[TrackId; 8]>;

/// A city on the map, along with the tracks leaving it.
#[derive(Clone, Debug, PartialEq)]
pub struct City {
    pub(crate) name: String,
    pub(crate) tracks: IncidentTracks,
}

impl City {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            tracks: SmallVec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tracks with this city as one of their endpoints, in insertion order.
    #[inline]
    pub fn tracks(&self) -> &[TrackId] {
        &self.tracks
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Points granted for claiming a track of the given length.
///
/// Only lengths 1, 2, 3, 4, 6 and 8 exist; any other length yields `None`.
///
/// # Example
/// ```
/// use conductor::city::points_for_length;
///
/// assert_eq!(points_for_length(3), Some(4));
/// assert_eq!(points_for_length(8), Some(21));
/// assert_eq!(points_for_length(5), None);
/// ```
pub fn points_for_length(length: u32) -> Option<u32> {
    match length {
        1 => Some(1),
        2 => Some(2),
        3 => Some(4),
        4 => Some(7),
        6 => Some(15),
        8 => Some(21),
        _ => None,
    }
}

/// A single track between two cities.
/// There can be multiple "parallel" tracks between the same two cities; each is its own `Track`.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub(crate) id: TrackId,
    pub(crate) endpoints: CityToCity,
    /// The distance between the two cities. This is analogous to the number of train cards needed to claim it.
    pub(crate) length: u32,
    /// The `Wild` color means that any color matches.
    pub(crate) color: TrainColor,
    pub(crate) tunnel: bool,
    /// How many of the cards paid must be wild cards, whatever the color used.
    pub(crate) ferries: u32,
    pub(crate) points: u32,
}

impl Track {
    #[inline]
    pub fn id(&self) -> TrackId {
        self.id
    }

    #[inline]
    pub fn endpoints(&self) -> CityToCity {
        self.endpoints
    }

    #[inline]
    pub fn length(&self) -> u32 {
        self.length
    }

    #[inline]
    pub fn color(&self) -> TrainColor {
        self.color
    }

    #[inline]
    pub fn tunnel(&self) -> bool {
        self.tunnel
    }

    #[inline]
    pub fn ferries(&self) -> u32 {
        self.ferries
    }

    /// Points granted when claiming this track.
    #[inline]
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Whether the track accepts cards of any color.
    #[inline]
    pub fn is_gray(&self) -> bool {
        self.color.is_wild()
    }

    /// Whether this track connects the two given cities, in either direction.
    pub fn connects(&self, a: CityId, b: CityId) -> bool {
        self.endpoints == (a, b) || self.endpoints == (b, a)
    }

    /// Given one endpoint, returns the other one.
    /// Returns `None` if `city` is not an endpoint of this track.
    pub fn other_end(&self, city: CityId) -> Option<CityId> {
        match self.endpoints {
            (a, b) if a == city => Some(b),
            (a, b) if b == city => Some(a),
            _ => None,
        }
    }
}
