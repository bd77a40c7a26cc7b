use crate::fragment::{FragmentStore, LocusAnnotation, MateBase};
use crate::locus::{Locus, LocusKey, LocusTable};
use log::debug;
use std::collections::BTreeMap;

/// Read-pair topology of the support a fragment lends to a locus.
/// Exactly one status applies per fragment-locus pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocusStatus {
    /// Both mates observe the reference base
    RefConcordant,
    /// One mate covers the locus and observes the reference base
    RefSingleRead,
    /// Both mates observe the alternate base
    MutConcordant,
    /// One mate covers the locus and observes the alternate base
    MutSingleRead,
    /// The mates disagree on the observed base
    MutDiscordant,
    /// Both mates agree on a base that is neither reference nor alternate
    OtherConcordant,
    /// One mate observes a base that is neither reference nor alternate
    OtherSingleRead,
}

/// Tally and output column order for the seven categories
pub const CATEGORIES: [LocusStatus; 7] = [
    LocusStatus::MutConcordant,
    LocusStatus::MutSingleRead,
    LocusStatus::RefConcordant,
    LocusStatus::RefSingleRead,
    LocusStatus::MutDiscordant,
    LocusStatus::OtherSingleRead,
    LocusStatus::OtherConcordant,
];

impl LocusStatus {
    pub fn label(self) -> &'static str {
        match self {
            LocusStatus::MutConcordant => "CO_MUT",
            LocusStatus::MutSingleRead => "SO_MUT",
            LocusStatus::RefConcordant => "CO_REF",
            LocusStatus::RefSingleRead => "SO_REF",
            LocusStatus::MutDiscordant => "DO",
            LocusStatus::OtherSingleRead => "SO_OTHER",
            LocusStatus::OtherConcordant => "CO_OTHER",
        }
    }

    /// Position in [`CATEGORIES`]
    pub fn index(self) -> usize {
        match self {
            LocusStatus::MutConcordant => 0,
            LocusStatus::MutSingleRead => 1,
            LocusStatus::RefConcordant => 2,
            LocusStatus::RefSingleRead => 3,
            LocusStatus::MutDiscordant => 4,
            LocusStatus::OtherSingleRead => 5,
            LocusStatus::OtherConcordant => 6,
        }
    }
}

/// Literal base(s) observed by the fragment after placeholder substitution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBases {
    Single(u8),
    Pair(u8, u8),
}

/// One fragment's resolved observation at one locus
#[derive(Debug, Clone)]
pub struct ResolvedCall {
    pub fragment_id: String,
    pub fragment_len: u64,
    pub status: LocusStatus,
    pub bases: ResolvedBases,
}

/// Classifies one fragment-locus observation. The matches-reference
/// placeholder encodes "not the alternate, assume reference" and is
/// substituted with the locus's known reference base before comparison.
pub fn resolve(annotation: &LocusAnnotation, locus: &Locus) -> (LocusStatus, ResolvedBases) {
    let mate1 = literal(annotation.mate1, locus.ref_base);
    match annotation.mate2 {
        None => {
            let status = if mate1 == locus.ref_base {
                LocusStatus::RefSingleRead
            } else if mate1 == locus.alt_base {
                LocusStatus::MutSingleRead
            } else {
                LocusStatus::OtherSingleRead
            };
            (status, ResolvedBases::Single(mate1))
        }
        Some(raw2) => {
            let mate2 = literal(raw2, locus.ref_base);
            let status = if mate1 != mate2 {
                LocusStatus::MutDiscordant
            } else if mate1 == locus.ref_base {
                LocusStatus::RefConcordant
            } else if mate1 == locus.alt_base {
                LocusStatus::MutConcordant
            } else {
                LocusStatus::OtherConcordant
            };
            (status, ResolvedBases::Pair(mate1, mate2))
        }
    }
}

fn literal(mate: MateBase, ref_base: u8) -> u8 {
    match mate {
        MateBase::Call(base) => base,
        MateBase::MatchesRef => ref_base,
    }
}

/// The fragment store joined against the locus table, grouped by locus
/// in sorted key order, with the join's audit counters.
#[derive(Debug)]
pub struct ResolvedLoci<'a> {
    pub loci: Vec<(&'a Locus, Vec<ResolvedCall>)>,
    pub outer_fragments: usize,
    pub unresolved: usize,
}

/// Joins every fragment annotation to its locus and resolves the status.
/// Annotations referencing a locus absent from the table are excluded
/// and counted, never fatal.
pub fn resolve_all<'a>(store: &FragmentStore, table: &'a LocusTable) -> ResolvedLoci<'a> {
    let mut by_locus: BTreeMap<&'a LocusKey, (&'a Locus, Vec<ResolvedCall>)> = BTreeMap::new();
    let mut outer_fragments = 0;
    let mut unresolved = 0;

    for fragment in store.fragments() {
        if fragment.is_outer() {
            outer_fragments += 1;
            continue;
        }
        for annotation in &fragment.annotations {
            let locus = match table.get(&annotation.key) {
                Some(locus) => locus,
                None => {
                    debug!(
                        "Fragment {} references locus {} absent from the locus table",
                        fragment.id, annotation.key
                    );
                    unresolved += 1;
                    continue;
                }
            };
            let (status, bases) = resolve(annotation, locus);
            by_locus
                .entry(&locus.key)
                .or_insert_with(|| (locus, Vec::new()))
                .1
                .push(ResolvedCall {
                    fragment_id: fragment.id.clone(),
                    fragment_len: fragment.len(),
                    status,
                    bases,
                });
        }
    }

    ResolvedLoci {
        loci: by_locus.into_iter().map(|(_, entry)| entry).collect(),
        outer_fragments,
        unresolved,
    }
}
