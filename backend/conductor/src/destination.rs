use crate::city::{CityId, CityToCity};
use crate::error::{Error, Result};
use crate::map::Map;

use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Destination generation gives up after this many rejected samples.
pub const MAX_GENERATION_ATTEMPTS: usize = 1000;

/// Constraints on the shortest route of a generated destination. A missing bound is no constraint.
///
/// Hops are the number of tracks on the route.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DestinationBounds {
    pub length_min: Option<u32>,
    pub length_max: Option<u32>,
    pub hops_min: Option<usize>,
    pub hops_max: Option<usize>,
}

impl DestinationBounds {
    /// Whether a route of this length and hop count is within every bound.
    pub fn accepts(&self, length: u32, hops: usize) -> bool {
        self.length_min.map_or(true, |min| length >= min)
            && self.length_max.map_or(true, |max| length <= max)
            && self.hops_min.map_or(true, |min| hops >= min)
            && self.hops_max.map_or(true, |max| hops <= max)
    }
}

/// Two cities a player must connect with their own tracks.
///
/// Fulfilling it is worth its `length` in points; failing to, costs as much.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Destination {
    pub cities: CityToCity,
    /// Length of the shortest route between both cities on the whole map, regardless of ownership.
    pub length: u32,
}

impl Destination {
    /// Creates the destination between two cities, measuring it on the whole map.
    ///
    /// Returns `None` if the cities are the same, or not connected at all.
    pub fn new(map: &Map, start: CityId, end: CityId) -> Option<Self> {
        if start == end {
            return None;
        }

        map.shortest_unrestricted_route(start, end)
            .map(|route| Self {
                cities: (start, end),
                length: route.length,
            })
    }

    /// Points granted (or lost) for this destination.
    #[inline]
    pub fn points(&self) -> i32 {
        self.length as i32
    }

    /// Human-readable description, e.g. `Paris - Wien (8)`.
    pub fn describe(&self, map: &Map) -> String {
        let (start, end) = self.cities;
        format!("{} - {} ({})", map.city(start), map.city(end), self.length)
    }
}

impl Map {
    /// Samples a random destination within `bounds`.
    ///
    /// Candidates are two distinct cities, picked uniformly, that are not directly connected. A candidate is
    /// accepted once the shortest route between them, on the whole map, fits `bounds`.
    ///
    /// Returns [`Error::UnsatisfiableDestination`] after [`MAX_GENERATION_ATTEMPTS`] rejected candidates.
    ///
    /// # Example
    /// ```
    /// use conductor::destination::DestinationBounds;
    /// use conductor::map::{Map, RouteRecord};
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let record = |a: &str, b: &str| RouteRecord {
    ///     endpoints: [a.to_owned(), b.to_owned()],
    ///     length: 2,
    ///     color: String::from("any"),
    ///     tunnel: false,
    ///     ferries: 0,
    /// };
    /// let map = Map::from_records(vec![record("A", "B"), record("B", "C"), record("C", "D")]).unwrap();
    /// let mut rng = ChaCha8Rng::seed_from_u64(3);
    ///
    /// let bounds = DestinationBounds { length_min: Some(6), ..Default::default() };
    /// let destination = map.generate_destination(&bounds, &mut rng).unwrap();
    /// assert_eq!(destination.length, 6);
    ///
    /// let bounds = DestinationBounds { length_min: Some(7), ..Default::default() };
    /// assert!(map.generate_destination(&bounds, &mut rng).is_err());
    /// ```
    pub fn generate_destination<R: Rng + ?Sized>(
        &self,
        bounds: &DestinationBounds,
        rng: &mut R,
    ) -> Result<Destination> {
        let num_cities = self.cities().len();
        if num_cities < 2 {
            return Err(Error::UnsatisfiableDestination(0));
        }

        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let start = rng.gen_range(0..num_cities);
            let mut end = rng.gen_range(0..num_cities - 1);
            if end >= start {
                end += 1;
            }
            let (start, end) = (CityId(start), CityId(end));

            if self.is_adjacent(start, end) {
                continue;
            }

            let route = match self.shortest_unrestricted_route(start, end) {
                Some(route) => route,
                None => continue,
            };

            if bounds.accepts(route.length, route.hops()) {
                let destination = Destination {
                    cities: (start, end),
                    length: route.length,
                };
                trace!("generated destination {}", destination.describe(self));
                return Ok(destination);
            }
        }

        Err(Error::UnsatisfiableDestination(MAX_GENERATION_ATTEMPTS))
    }
}
