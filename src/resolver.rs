use crate::{
    shared::geo::Coordinate,
    shared::similarity::{self, SimilarityError},
    snapshot::{Snapshot, Stop},
};
use rayon::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No stop named {name:?}")]
    UnknownName { name: String },
    #[error("The stop table is empty")]
    EmptyStopTable,
    #[error("Similarity error: {0}")]
    Similarity(#[from] SimilarityError),
}

/// One stop query, one strategy. Each variant carries exactly the inputs
/// its strategy needs, so an illegal combination cannot be expressed.
#[derive(Debug, Clone)]
pub enum StopQuery {
    /// The stop whose name equals the string exactly.
    ExactName(String),
    /// The stop whose embedding is most similar to the encoded text.
    Semantic(String),
    /// The stop closest to the coordinate by great-circle distance.
    Nearest(Coordinate),
}

/// Text to fixed-length vector, however the model does it. Narrow on
/// purpose: the resolver never needs to know what is behind it, and
/// tests run on toy vectors. Treat `encode` as a blocking call with no
/// retry; callers wanting timeouts wrap it themselves.
pub trait Embedder {
    fn encode(&self, text: &str) -> Vec<f32>;
}

/// Resolves ambiguous stop queries against a snapshot's stop table.
/// Borrows the snapshot and the model; build one with
/// [`Snapshot::resolver`].
pub struct StopResolver<'a, E> {
    snapshot: &'a Snapshot,
    embedder: &'a E,
}

impl<'a, E: Embedder> StopResolver<'a, E> {
    pub(crate) fn new(snapshot: &'a Snapshot, embedder: &'a E) -> Self {
        Self { snapshot, embedder }
    }

    pub fn resolve(&self, query: &StopQuery) -> Result<&'a Stop, Error> {
        match query {
            StopQuery::ExactName(name) => self.by_name(name),
            StopQuery::Semantic(text) => self.by_embedding(text),
            StopQuery::Nearest(coordinate) => self.by_coordinate(coordinate),
        }
    }

    /// Duplicate stop names are not deduplicated: the first row in stop
    /// table order wins.
    fn by_name(&self, name: &str) -> Result<&'a Stop, Error> {
        self.snapshot
            .stops()
            .iter()
            .find(|stop| stop.name.as_ref() == name)
            .ok_or_else(|| Error::UnknownName {
                name: name.to_string(),
            })
    }

    fn by_embedding(&self, text: &str) -> Result<&'a Stop, Error> {
        let stops = self.snapshot.stops();
        let needle = self.embedder.encode(text);
        let scored = stops
            .par_iter()
            .enumerate()
            .map(|(i, stop)| similarity::cosine(&needle, &stop.embedding).map(|score| (i, score)))
            .collect::<Result<Vec<_>, _>>()?;
        // Strict comparison: on a tie the first table index wins
        let mut best: Option<(usize, f64)> = None;
        for (i, score) in scored {
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((i, score));
            }
        }
        best.map(|(i, _)| &stops[i]).ok_or(Error::EmptyStopTable)
    }

    fn by_coordinate(&self, coordinate: &Coordinate) -> Result<&'a Stop, Error> {
        let stops = self.snapshot.stops();
        let scored: Vec<(usize, f64)> = stops
            .par_iter()
            .enumerate()
            .map(|(i, stop)| (i, stop.coordinate.distance(coordinate).as_meters()))
            .collect();
        let mut best: Option<(usize, f64)> = None;
        for (i, meters) in scored {
            if best.is_none_or(|(_, top)| meters < top) {
                best = Some((i, meters));
            }
        }
        best.map(|(i, _)| &stops[i]).ok_or(Error::EmptyStopTable)
    }
}
