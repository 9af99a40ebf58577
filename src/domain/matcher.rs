//! Greedy pairing of cargo requests with freight offers.
//!
//! Cargo records are visited in store order. Each one takes the first freight
//! record, in store order, that is still free and compatible with it. There
//! is no backtracking, so the result depends only on the contents and order of
//! the two stores.

use serde::Serialize;
use tracing::instrument;

use crate::{
    domain::{CargoRecord, FreightRecord, RecordId},
    storage::KeyedStore,
};

use super::{Cargo, Freight};

/// A cargo record paired with the freight record that will carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pairing {
    /// The matched cargo record.
    pub cargo_id: RecordId,
    /// The freight record carrying it.
    pub freight_id: RecordId,
}

/// The outcome of one matching pass.
///
/// Every cargo identifier appears either in exactly one pairing or in
/// [`MatchResult::unmatched_cargo`], and likewise for freight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pairs: Vec<Pairing>,
    unmatched_cargo: Vec<RecordId>,
    unmatched_freight: Vec<RecordId>,
}

impl MatchResult {
    /// The matched pairs, in cargo store order.
    #[must_use]
    pub fn pairs(&self) -> &[Pairing] {
        &self.pairs
    }

    /// Cargo with no compatible free freight, in store order.
    #[must_use]
    pub fn unmatched_cargo(&self) -> &[RecordId] {
        &self.unmatched_cargo
    }

    /// Freight that was never taken, in store order.
    #[must_use]
    pub fn unmatched_freight(&self) -> &[RecordId] {
        &self.unmatched_freight
    }

    /// Whether the pass saw no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.unmatched_cargo.is_empty() && self.unmatched_freight.is_empty()
    }
}

/// Whether a cargo record can travel with a freight record.
///
/// Both the location and the departure time must be equal. Locations are
/// compared exactly; they are title-cased before they are stored.
#[must_use]
pub fn compatible(cargo: &CargoRecord, freight: &FreightRecord) -> bool {
    cargo.location() == freight.location() && cargo.departure_time() == freight.departure_time()
}

/// Builds a [`MatchResult`] from the current cargo and freight collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchEngine;

impl MatchEngine {
    /// Pairs cargo with freight, first fit in store order.
    ///
    /// Never fails: empty collections simply leave everything unmatched.
    #[must_use]
    #[instrument(level = "debug", skip_all, fields(cargo = cargo.len(), freight = freight.len()))]
    pub fn generate(cargo: &KeyedStore<Cargo>, freight: &KeyedStore<Freight>) -> MatchResult {
        let mut taken = vec![false; freight.len()];
        let mut result = MatchResult::default();

        for cargo_record in cargo {
            let candidate = freight
                .iter()
                .enumerate()
                .find(|(index, freight_record)| {
                    !taken[*index] && compatible(cargo_record, freight_record)
                });

            match candidate {
                Some((index, freight_record)) => {
                    taken[index] = true;
                    result.pairs.push(Pairing {
                        cargo_id: cargo_record.id().clone(),
                        freight_id: freight_record.id().clone(),
                    });
                }
                None => result.unmatched_cargo.push(cargo_record.id().clone()),
            }
        }

        result.unmatched_freight = freight
            .iter()
            .zip(&taken)
            .filter(|(_, taken)| !**taken)
            .map(|(record, _)| record.id().clone())
            .collect();

        tracing::debug!(
            "Matched {} pairs, {} cargo and {} freight unmatched",
            result.pairs.len(),
            result.unmatched_cargo.len(),
            result.unmatched_freight.len()
        );

        result
    }
}
