//! Destination classification
//!
//! Subway lookup runs before the chain-store check, so a name that matches
//! both is treated as a station.

use super::traits::StationDirectory;
use crate::state_machine::PlaceKind;
use crate::vocabulary::Vocabulary;
use std::sync::Arc;

pub struct PlaceClassifier<S: StationDirectory> {
    directory: S,
    vocabulary: Arc<Vocabulary>,
}

impl<S: StationDirectory> PlaceClassifier<S> {
    pub fn new(directory: S, vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            directory,
            vocabulary,
        }
    }

    pub async fn classify(&self, destination: &str) -> PlaceKind {
        if let Some(station) = self.station_query(destination) {
            if self.directory.is_subway_station(station).await {
                return if destination.contains(self.vocabulary.exit_marker.as_str()) {
                    PlaceKind::SubwayStationWithExit
                } else {
                    PlaceKind::SubwayStation
                };
            }
        }

        if self.vocabulary.is_chain_store(destination) {
            PlaceKind::ChainStore
        } else {
            PlaceKind::Plain
        }
    }

    /// Directory key: the text before the last station suffix that ends a
    /// word. `서울역사박물관` has none and is never looked up.
    fn station_query<'a>(&self, destination: &'a str) -> Option<&'a str> {
        let suffix = self.vocabulary.station_suffix.as_str();
        if suffix.is_empty() {
            return None;
        }
        destination.rmatch_indices(suffix).find_map(|(start, matched)| {
            let (before, after) = destination.split_at(start);
            let rest = after.strip_prefix(matched)?;
            if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
                return None;
            }
            let name = before.trim();
            (!name.is_empty()).then_some(name)
        })
    }
}
