use crate::card::TrainColor;
use crate::city::{points_for_length, City, CityId, CityToCity, Track, TrackId};
use crate::error::{Error, Result};
use crate::player::PlayerId;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};

/// All tracks connecting two adjacent cities.
/// There are rarely more than two "parallel" tracks between two cities.
pub type ParallelTracks = SmallVec<[TrackId; 2]>;

/// One track, as described in a map file.
///
/// # JSON
/// ```json
/// {"endpoints": ["Paris", "Frankfurt"], "length": 3, "color": "white", "tunnel": false, "ferries": 0}
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RouteRecord {
    pub endpoints: [String; 2],
    pub length: u32,
    pub color: String,
    #[serde(default)]
    pub tunnel: bool,
    #[serde(default)]
    pub ferries: u32,
}

/// Which tracks a route search may go through, based on who owns them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RouteFilter {
    /// Ownership is ignored.
    All,
    /// Only tracks nobody owns.
    Unowned,
    /// Tracks nobody owns, or owned by the given player.
    Available(PlayerId),
    /// Only tracks owned by the given player, or by anyone if `None`.
    OwnedBy(Option<PlayerId>),
}

impl RouteFilter {
    /// Whether a track with the given owner can be traversed.
    pub fn allows(&self, owner: Option<PlayerId>) -> bool {
        match (self, owner) {
            (RouteFilter::All, _) => true,
            (RouteFilter::Unowned, owner) => owner.is_none(),
            (RouteFilter::Available(_), None) => true,
            (RouteFilter::Available(player), Some(owner)) => *player == owner,
            (RouteFilter::OwnedBy(None), owner) => owner.is_some(),
            (RouteFilter::OwnedBy(Some(player)), owner) => owner == Some(*player),
        }
    }
}

/// A path through the map, as returned by [`Map::shortest_route`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Route {
    /// Cities visited, from the start to the end, both included.
    pub cities: Vec<CityId>,
    /// Tracks travelled, in order. Always one less than `cities`.
    pub tracks: Vec<TrackId>,
    /// Sum of the lengths of `tracks`.
    pub length: u32,
}

impl Route {
    /// Number of tracks travelled.
    #[inline]
    pub fn hops(&self) -> usize {
        self.tracks.len()
    }
}

/// The Ownership Index: who owns each track of a map, if anyone.
///
/// Once a track is owned, it stays owned by the same player for the rest of the game.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Ownership {
    owners: Vec<Option<PlayerId>>,
}

impl Ownership {
    /// Creates an index where every track of the map is unowned.
    pub fn new(map: &Map) -> Self {
        Self {
            owners: vec![None; map.tracks.len()],
        }
    }

    /// Number of tracks covered by the index.
    #[inline]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// The player owning this track, if any.
    ///
    /// # Panics
    /// If the track is not part of the map the index was created for.
    #[inline]
    pub fn owner(&self, track: TrackId) -> Option<PlayerId> {
        self.owners[track.0]
    }

    /// Marks `track` as owned by `player`.
    ///
    /// Returns an `Err` if the track already has an owner: ownership is never reassigned.
    pub fn claim(&mut self, track: TrackId, player: PlayerId) -> Result<()> {
        match self.owners[track.0] {
            Some(_) => Err(Error::TrackAlreadyOwned(track)),
            None => {
                self.owners[track.0] = Some(player);
                Ok(())
            }
        }
    }

    /// All tracks nobody owns yet, in map order.
    pub fn unowned_tracks(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.owners
            .iter()
            .enumerate()
            .filter(|(_, owner)| owner.is_none())
            .map(|(index, _)| TrackId(index))
    }

    /// All tracks owned by `player`, in map order.
    pub fn tracks_owned_by(&self, player: PlayerId) -> impl Iterator<Item = TrackId> + '_ {
        self.owners
            .iter()
            .enumerate()
            .filter(move |(_, owner)| **owner == Some(player))
            .map(|(index, _)| TrackId(index))
    }

    pub fn has_unowned_tracks(&self) -> bool {
        self.owners.iter().any(Option::is_none)
    }
}

/// The board: cities and the tracks connecting them.
///
/// Cities and tracks live in two arenas, and refer to each other through [`CityId`] and [`TrackId`].
/// The map itself is immutable once built; who owns what is kept in a separate [`Ownership`].
#[derive(Clone, Debug)]
pub struct Map {
    cities: Vec<City>,
    tracks: Vec<Track>,
    city_ids: HashMap<String, CityId>,
}

impl Map {
    /// Builds a map out of track records. Cities are deduplicated by name.
    ///
    /// Returns an `Err` if either:
    ///   * There are no records.
    ///   * A track connects a city to itself.
    ///   * A track's length has no point value (see [`points_for_length`]).
    ///   * A track needs more ferries than its length.
    ///   * A color is unknown.
    ///
    /// # Example
    /// ```
    /// use conductor::map::{Map, RouteRecord};
    ///
    /// let record = |a: &str, b: &str, length| RouteRecord {
    ///     endpoints: [a.to_owned(), b.to_owned()],
    ///     length,
    ///     color: String::from("red"),
    ///     tunnel: false,
    ///     ferries: 0,
    /// };
    ///
    /// let map = Map::from_records(vec![record("A", "B", 2), record("B", "C", 3)]).unwrap();
    /// assert_eq!(map.cities().len(), 3);
    ///
    /// assert!(Map::from_records(vec![record("A", "B", 5)]).is_err());
    /// ```
    pub fn from_records(records: Vec<RouteRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::InvalidRules(String::from(
                "a map needs at least one track",
            )));
        }

        let mut map = Self {
            cities: Vec::new(),
            tracks: Vec::with_capacity(records.len()),
            city_ids: HashMap::new(),
        };

        for record in records {
            map.add_track(record)?;
        }

        Ok(map)
    }

    /// Parses a JSON array of [`RouteRecord`]s, and builds the map.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<RouteRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    fn add_track(&mut self, record: RouteRecord) -> Result<()> {
        let [start, end] = record.endpoints;
        if start == end {
            return Err(Error::InvalidTrack(
                start,
                end,
                String::from("both endpoints are the same city"),
            ));
        }

        let points = match points_for_length(record.length) {
            Some(points) => points,
            None => return Err(Error::InvalidTrackLength(start, end, record.length)),
        };

        if record.ferries > record.length {
            return Err(Error::InvalidTrack(
                start,
                end,
                format!(
                    "{} ferries do not fit in a length of {}",
                    record.ferries, record.length
                ),
            ));
        }

        let color = TrainColor::from_name(&record.color)?;
        let id = TrackId(self.tracks.len());
        let start = self.get_or_insert_city(start);
        let end = self.get_or_insert_city(end);

        self.cities[start.0].tracks.push(id);
        self.cities[end.0].tracks.push(id);
        self.tracks.push(Track {
            id,
            endpoints: (start, end),
            length: record.length,
            color,
            tunnel: record.tunnel,
            ferries: record.ferries,
            points,
        });

        Ok(())
    }

    fn get_or_insert_city(&mut self, name: String) -> CityId {
        if let Some(id) = self.city_ids.get(&name) {
            return *id;
        }

        let id = CityId(self.cities.len());
        self.city_ids.insert(name.clone(), id);
        self.cities.push(City::new(name));
        id
    }

    #[inline]
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    #[inline]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// # Panics
    /// If `id` does not belong to this map.
    #[inline]
    pub fn city(&self, id: CityId) -> &City {
        &self.cities[id.0]
    }

    /// # Panics
    /// If `id` does not belong to this map.
    #[inline]
    pub fn track(&self, id: TrackId) -> &Track {
        &self.tracks[id.0]
    }

    /// Looks a city up by name.
    pub fn city_id(&self, name: &str) -> Option<CityId> {
        self.city_ids.get(name).copied()
    }

    /// Same as [`Map::city_id`], but unknown names are an error.
    pub fn expect_city(&self, name: &str) -> Result<CityId> {
        self.city_id(name)
            .ok_or_else(|| Error::UnknownCity(name.to_owned()))
    }

    /// All tracks directly connecting `a` and `b`. May be empty.
    pub fn tracks_between(&self, a: CityId, b: CityId) -> ParallelTracks {
        self.city(a)
            .tracks
            .iter()
            .copied()
            .filter(|track| self.track(*track).connects(a, b))
            .collect()
    }

    /// Whether at least one track directly connects `a` and `b`.
    pub fn is_adjacent(&self, a: CityId, b: CityId) -> bool {
        self.city(a)
            .tracks
            .iter()
            .any(|track| self.track(*track).connects(a, b))
    }

    /// Human-readable description of a track, e.g. `Paris - Frankfurt (3, white)`.
    pub fn describe_track(&self, id: TrackId) -> String {
        let track = self.track(id);
        let (start, end) = track.endpoints;
        format!(
            "{} - {} ({}, {})",
            self.city(start),
            self.city(end),
            track.length,
            if track.is_gray() {
                String::from("any color")
            } else {
                track.color.to_string()
            }
        )
    }

    /// Shortest route between two cities, only going through tracks allowed by `filter`.
    ///
    /// A track rejected by the filter is never traversed. Amongst parallel tracks, the shortest one
    /// that passes the filter is used. Returns `None` if no such route exists, which is a normal
    /// outcome mid-game when tracks get claimed.
    ///
    /// # Panics
    /// If either city does not belong to this map.
    pub fn shortest_route(
        &self,
        from: CityId,
        to: CityId,
        filter: RouteFilter,
        ownership: &Ownership,
    ) -> Option<Route> {
        self.shortest_route_where(from, to, |track| filter.allows(ownership.owner(track)))
    }

    /// Shortest route between two cities over the whole map, ignoring ownership.
    pub fn shortest_unrestricted_route(&self, from: CityId, to: CityId) -> Option<Route> {
        self.shortest_route_where(from, to, |_| true)
    }

    fn shortest_route_where(
        &self,
        from: CityId,
        to: CityId,
        allowed: impl Fn(TrackId) -> bool,
    ) -> Option<Route> {
        // Validates both ids upfront.
        let _ = (self.city(from), self.city(to));

        let mut distances: Vec<Option<u32>> = vec![None; self.cities.len()];
        let mut previous: Vec<Option<(CityId, TrackId)>> = vec![None; self.cities.len()];
        let mut queue = BinaryHeap::new();

        distances[from.0] = Some(0);
        queue.push(Reverse((0, from)));

        while let Some(Reverse((distance, city))) = queue.pop() {
            if city == to {
                break;
            }

            // Stale queue entry.
            if distances[city.0].map_or(false, |best| distance > best) {
                continue;
            }

            for track_id in &self.cities[city.0].tracks {
                if !allowed(*track_id) {
                    continue;
                }

                let track = self.track(*track_id);
                let neighbor = match track.other_end(city) {
                    Some(neighbor) => neighbor,
                    None => continue,
                };

                let candidate = distance + track.length;
                if distances[neighbor.0].map_or(true, |best| candidate < best) {
                    distances[neighbor.0] = Some(candidate);
                    previous[neighbor.0] = Some((city, *track_id));
                    queue.push(Reverse((candidate, neighbor)));
                }
            }
        }

        let length = distances[to.0]?;

        let mut cities = vec![to];
        let mut tracks = Vec::new();
        let mut current = to;
        while let Some((city, track)) = previous[current.0] {
            cities.push(city);
            tracks.push(track);
            current = city;
        }
        cities.reverse();
        tracks.reverse();

        Some(Route {
            cities,
            tracks,
            length,
        })
    }

    /// Predicate that assesses whether a given player has connected two cities on the map, based on their owned tracks.
    ///
    /// Any connecting path counts, not only the shortest one.
    ///
    /// # Panics
    /// If either city does not belong to this map.
    pub fn has_player_fulfilled_destination(
        &self,
        ownership: &Ownership,
        (destination_start, destination_end): CityToCity,
        player: PlayerId,
    ) -> bool {
        if destination_start == destination_end {
            return true;
        }

        let mut cities_visited = vec![false; self.cities.len()];
        let mut cities_to_visit = VecDeque::with_capacity(self.cities.len());

        cities_visited[destination_start.0] = true;
        cities_to_visit.push_back(destination_start);

        while let Some(city) = cities_to_visit.pop_front() {
            for track_id in &self.cities[city.0].tracks {
                if ownership.owner(*track_id) != Some(player) {
                    continue;
                }

                let neighbor = match self.track(*track_id).other_end(city) {
                    Some(neighbor) => neighbor,
                    None => continue,
                };

                if neighbor == destination_end {
                    return true;
                }

                if !cities_visited[neighbor.0] {
                    cities_visited[neighbor.0] = true;
                    cities_to_visit.push_back(neighbor);
                }
            }
        }

        false
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    pub(crate) const EUROPE: &str = include_str!("../../../data/europe.json");

    pub(crate) fn record(a: &str, b: &str, length: u32, color: &str) -> RouteRecord {
        RouteRecord {
            endpoints: [a.to_owned(), b.to_owned()],
            length,
            color: color.to_owned(),
            tunnel: false,
            ferries: 0,
        }
    }

    /// A - B - C - D in a line, with a shortcut A - D, and two parallel tracks B - C.
    fn diamond() -> Map {
        Map::from_records(vec![
            record("A", "B", 1, "red"),
            record("B", "C", 3, "blue"),
            record("B", "C", 2, "any"),
            record("C", "D", 1, "green"),
            record("A", "D", 8, "black"),
        ])
        .unwrap()
    }

    fn ids(map: &Map, names: &[&str]) -> Vec<CityId> {
        names
            .iter()
            .map(|name| map.city_id(name).unwrap())
            .collect()
    }

    #[test]
    fn cities_are_deduplicated() {
        let map = diamond();
        assert_eq!(map.cities().len(), 4);
        assert_eq!(map.tracks().len(), 5);

        let b = map.city_id("B").unwrap();
        assert_eq!(map.city(b).name(), "B");
        assert_eq!(map.city(b).tracks().len(), 3);
    }

    #[test]
    fn tracks_between_parallel() {
        let map = diamond();
        let [a, b, c, d]: [CityId; 4] = ids(&map, &["A", "B", "C", "D"]).try_into().unwrap();

        assert_eq!(map.tracks_between(b, c).as_slice(), &[TrackId(1), TrackId(2)]);
        assert_eq!(map.tracks_between(c, b).as_slice(), &[TrackId(1), TrackId(2)]);
        assert_eq!(map.tracks_between(a, d).as_slice(), &[TrackId(4)]);
        assert!(map.tracks_between(a, c).is_empty());

        assert!(map.is_adjacent(a, b));
        assert!(!map.is_adjacent(b, d));
    }

    #[test]
    fn invalid_lengths_are_rejected() {
        for length in [5, 7] {
            let result = Map::from_records(vec![
                record("A", "B", 2, "red"),
                record("B", "C", length, "red"),
            ]);
            assert!(
                matches!(result, Err(Error::InvalidTrackLength(_, _, l)) if l == length),
                "length={length}"
            );
        }
    }

    #[test]
    fn invalid_records_are_rejected() {
        assert!(matches!(
            Map::from_records(vec![record("A", "B", 2, "turquoise")]),
            Err(Error::UnknownColor(_))
        ));
        assert!(matches!(
            Map::from_records(vec![record("A", "A", 2, "red")]),
            Err(Error::InvalidTrack(..))
        ));
        assert!(Map::from_records(Vec::new()).is_err());

        let mut too_many_ferries = record("A", "B", 2, "any");
        too_many_ferries.ferries = 3;
        assert!(matches!(
            Map::from_records(vec![too_many_ferries]),
            Err(Error::InvalidTrack(..))
        ));
    }

    #[test]
    fn shortest_route_all() {
        let map = diamond();
        let ownership = Ownership::new(&map);
        let [a, b, c, d]: [CityId; 4] = ids(&map, &["A", "B", "C", "D"]).try_into().unwrap();

        let route = map
            .shortest_route(a, d, RouteFilter::All, &ownership)
            .unwrap();
        assert_eq!(route.cities, vec![a, b, c, d]);
        // Uses the shorter of the two parallel tracks.
        assert_eq!(route.tracks, vec![TrackId(0), TrackId(2), TrackId(3)]);
        assert_eq!(route.length, 4);
        assert_eq!(route.hops(), 3);
    }

    #[test]
    fn shortest_route_to_itself() {
        let map = diamond();
        let a = map.city_id("A").unwrap();
        let route = map.shortest_unrestricted_route(a, a).unwrap();
        assert_eq!(route.cities, vec![a]);
        assert_eq!(route.length, 0);
    }

    #[test]
    fn shortest_route_all_ignores_ownership() {
        let map = diamond();
        let [a, d]: [CityId; 2] = ids(&map, &["A", "D"]).try_into().unwrap();
        let mut ownership = Ownership::new(&map);
        let before = map.shortest_route(a, d, RouteFilter::All, &ownership);

        ownership.claim(TrackId(0), 1).unwrap();
        ownership.claim(TrackId(2), 0).unwrap();
        assert_eq!(map.shortest_route(a, d, RouteFilter::All, &ownership), before);
    }

    #[test]
    fn shortest_route_unowned_skips_owned_parallel_track() {
        let map = diamond();
        let [a, d]: [CityId; 2] = ids(&map, &["A", "D"]).try_into().unwrap();
        let mut ownership = Ownership::new(&map);
        ownership.claim(TrackId(2), 0).unwrap();

        let route = map
            .shortest_route(a, d, RouteFilter::Unowned, &ownership)
            .unwrap();
        assert_eq!(route.tracks, vec![TrackId(0), TrackId(1), TrackId(3)]);
        assert_eq!(route.length, 5);
    }

    #[test]
    fn shortest_route_available_uses_own_tracks() {
        let map = diamond();
        let [a, d]: [CityId; 2] = ids(&map, &["A", "D"]).try_into().unwrap();
        let mut ownership = Ownership::new(&map);
        ownership.claim(TrackId(1), 1).unwrap();
        ownership.claim(TrackId(2), 1).unwrap();

        // Player 0 is blocked between B and C, and must take the long way.
        let route = map
            .shortest_route(a, d, RouteFilter::Available(0), &ownership)
            .unwrap();
        assert_eq!(route.tracks, vec![TrackId(4)]);
        assert_eq!(route.length, 8);

        // Player 1 owns the middle.
        let route = map
            .shortest_route(a, d, RouteFilter::Available(1), &ownership)
            .unwrap();
        assert_eq!(route.length, 4);
    }

    #[test]
    fn shortest_route_not_found() {
        let map = diamond();
        let [a, d]: [CityId; 2] = ids(&map, &["A", "D"]).try_into().unwrap();
        let mut ownership = Ownership::new(&map);
        ownership.claim(TrackId(0), 1).unwrap();
        ownership.claim(TrackId(4), 1).unwrap();

        assert_eq!(
            map.shortest_route(a, d, RouteFilter::Available(0), &ownership),
            None
        );
        assert_eq!(
            map.shortest_route(a, d, RouteFilter::OwnedBy(Some(0)), &ownership),
            None
        );
        assert!(map
            .shortest_route(a, d, RouteFilter::OwnedBy(Some(1)), &ownership)
            .is_some());
    }

    #[test]
    fn shortest_route_owned_by_anyone() {
        let map = diamond();
        let [a, b, c]: [CityId; 3] = ids(&map, &["A", "B", "C"]).try_into().unwrap();
        let mut ownership = Ownership::new(&map);
        ownership.claim(TrackId(0), 0).unwrap();
        ownership.claim(TrackId(1), 1).unwrap();

        let route = map
            .shortest_route(a, c, RouteFilter::OwnedBy(None), &ownership)
            .unwrap();
        assert_eq!(route.cities, vec![a, b, c]);
        assert_eq!(route.tracks, vec![TrackId(0), TrackId(1)]);
    }

    #[test]
    fn routes_never_use_excluded_tracks() {
        let map = Map::from_json(EUROPE).unwrap();
        let mut ownership = Ownership::new(&map);
        for (index, track) in map.tracks().iter().enumerate() {
            if index % 3 == 0 {
                ownership.claim(track.id(), index % 2).unwrap();
            }
        }

        let filters = [
            RouteFilter::All,
            RouteFilter::Unowned,
            RouteFilter::Available(0),
            RouteFilter::Available(1),
            RouteFilter::OwnedBy(None),
            RouteFilter::OwnedBy(Some(0)),
        ];
        let cities = map.cities().len();
        for from in (0..cities).step_by(5) {
            for to in (0..cities).step_by(3) {
                for filter in filters {
                    if let Some(route) =
                        map.shortest_route(CityId(from), CityId(to), filter, &ownership)
                    {
                        assert_eq!(route.cities.len(), route.tracks.len() + 1);
                        for track in &route.tracks {
                            assert!(filter.allows(ownership.owner(*track)));
                        }
                        let length: u32 =
                            route.tracks.iter().map(|track| map.track(*track).length()).sum();
                        assert_eq!(length, route.length);
                    }
                }
            }
        }
    }

    #[test]
    fn route_filter_allows() {
        assert!(RouteFilter::All.allows(Some(3)));
        assert!(RouteFilter::Unowned.allows(None));
        assert!(!RouteFilter::Unowned.allows(Some(0)));
        assert!(RouteFilter::Available(1).allows(Some(1)));
        assert!(!RouteFilter::Available(1).allows(Some(0)));
        assert!(RouteFilter::OwnedBy(None).allows(Some(0)));
        assert!(!RouteFilter::OwnedBy(None).allows(None));
        assert!(!RouteFilter::OwnedBy(Some(2)).allows(Some(0)));
    }

    // Tests for `Ownership`.

    #[test]
    fn claim_is_permanent() {
        let map = diamond();
        let mut ownership = Ownership::new(&map);
        assert_eq!(ownership.len(), 5);

        assert!(ownership.claim(TrackId(3), 1).is_ok());
        assert_eq!(ownership.owner(TrackId(3)), Some(1));
        assert!(matches!(
            ownership.claim(TrackId(3), 0),
            Err(Error::TrackAlreadyOwned(TrackId(3)))
        ));
        assert!(matches!(
            ownership.claim(TrackId(3), 1),
            Err(Error::TrackAlreadyOwned(TrackId(3)))
        ));
        assert_eq!(ownership.owner(TrackId(3)), Some(1));
    }

    #[test]
    fn owned_and_unowned_tracks() {
        let map = diamond();
        let mut ownership = Ownership::new(&map);
        ownership.claim(TrackId(1), 0).unwrap();
        ownership.claim(TrackId(4), 0).unwrap();
        ownership.claim(TrackId(0), 1).unwrap();

        assert_eq!(
            ownership.tracks_owned_by(0).collect::<Vec<_>>(),
            vec![TrackId(1), TrackId(4)]
        );
        assert_eq!(
            ownership.unowned_tracks().collect::<Vec<_>>(),
            vec![TrackId(2), TrackId(3)]
        );
        assert!(ownership.has_unowned_tracks());

        ownership.claim(TrackId(2), 1).unwrap();
        ownership.claim(TrackId(3), 1).unwrap();
        assert!(!ownership.has_unowned_tracks());
    }

    // Tests for `Map::has_player_fulfilled_destination`.

    #[test]
    fn destination_not_fulfilled_at_start() {
        let map = diamond();
        let ownership = Ownership::new(&map);
        let [a, c]: [CityId; 2] = ids(&map, &["A", "C"]).try_into().unwrap();
        assert!(!map.has_player_fulfilled_destination(&ownership, (a, c), 0));
    }

    #[test]
    fn destination_fulfilled_by_another_player() {
        let map = diamond();
        let mut ownership = Ownership::new(&map);
        let [a, c]: [CityId; 2] = ids(&map, &["A", "C"]).try_into().unwrap();
        ownership.claim(TrackId(0), 1).unwrap();
        ownership.claim(TrackId(1), 1).unwrap();

        assert!(!map.has_player_fulfilled_destination(&ownership, (a, c), 0));
        assert!(map.has_player_fulfilled_destination(&ownership, (a, c), 1));
        assert!(map.has_player_fulfilled_destination(&ownership, (c, a), 1));
    }

    #[test]
    fn destination_fulfilled_through_a_detour() {
        let map = diamond();
        let mut ownership = Ownership::new(&map);
        let [a, b, c]: [CityId; 3] = ids(&map, &["A", "B", "C"]).try_into().unwrap();
        // A - D - C, which is not the shortest route between A and C.
        ownership.claim(TrackId(4), 0).unwrap();
        ownership.claim(TrackId(3), 0).unwrap();

        assert!(map.has_player_fulfilled_destination(&ownership, (a, c), 0));
        assert!(!map.has_player_fulfilled_destination(&ownership, (a, b), 0));
    }

    #[test]
    fn europe_map() {
        let map = Map::from_json(EUROPE).unwrap();
        assert_eq!(map.cities().len(), 47);

        let paris = map.expect_city("Paris").unwrap();
        let dieppe = map.expect_city("Dieppe").unwrap();
        let petrograd = map.expect_city("Petrograd").unwrap();
        assert!(map.expect_city("Gotham").is_err());

        assert!(map.is_adjacent(paris, dieppe));
        assert!(map.is_adjacent(dieppe, paris));
        assert!(!map.is_adjacent(paris, petrograd));
        assert!(!map.is_adjacent(petrograd, paris));

        let stockholm = map.expect_city("Stockholm").unwrap();
        let tunnel = map.tracks_between(petrograd, stockholm);
        assert_eq!(tunnel.len(), 1);
        let tunnel = map.track(tunnel[0]);
        assert!(tunnel.tunnel());
        assert_eq!(tunnel.points(), 21);
        assert_eq!(
            map.describe_track(tunnel.id()),
            "Petrograd - Stockholm (8, any color)"
        );
    }
}
