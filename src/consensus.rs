use crate::locus::{Locus, LocusKey};
use crate::status::{LocusStatus, ResolvedBases, ResolvedCall, CATEGORIES};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Non-MUT categories competing by raw count when mutation signal is absent
const LOWER_TIER: [LocusStatus; 3] = [
    LocusStatus::MutDiscordant,
    LocusStatus::OtherSingleRead,
    LocusStatus::OtherConcordant,
];

/// Header of the per-locus consensus table
pub const CONSENSUS_HEADER: &str = "target_key\tCO_MUT\tSO_MUT\tCO_REF\tSO_REF\tDO\tSO_OTHER\t\
                                    CO_OTHER\tmlen_CO_MUT\tmlen_SO_MUT\tmlen_CO_REF\tmlen_SO_REF\t\
                                    mlen_DO\tmlen_SO_OTHER\tmlen_CO_OTHER\tconsensus_mismatch";

/// Per-category fragment support counts at one locus
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SupportTally {
    counts: [u32; 7],
}

impl SupportTally {
    pub fn count(&mut self, status: LocusStatus) {
        self.counts[status.index()] += 1;
    }

    pub fn get(&self, status: LocusStatus) -> u32 {
        self.counts[status.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

/// A finalized locus: support tally, per-category median fragment
/// lengths and the single consensus mismatch chosen to represent it
#[derive(Debug, Clone)]
pub struct ConsensusRecord<'a> {
    pub locus: &'a Locus,
    pub tally: SupportTally,
    pub median_len: [Option<f64>; 7],
    /// Winning mismatch category, `None` when only reference support exists
    pub category: Option<LocusStatus>,
    pub consensus_base: Option<u8>,
}

impl<'a> ConsensusRecord<'a> {
    /// The resolved mismatch in the form `chrom:pos:base`
    pub fn consensus_mismatch(&self) -> Option<String> {
        self.consensus_base
            .map(|base| format!("{}:{}", self.locus.key, base as char))
    }

    /// One TSV row matching [`CONSENSUS_HEADER`]
    pub fn to_row(&self) -> String {
        let mut row = self.locus.target_key();
        for category in &CATEGORIES {
            row.push_str(&format!("\t{}", self.tally.get(*category)));
        }
        for median in &self.median_len {
            match median {
                Some(value) => row.push_str(&format!("\t{:.1}", value)),
                None => row.push_str("\tNA"),
            }
        }
        match self.consensus_mismatch() {
            Some(mismatch) => row.push_str(&format!("\t{}", mismatch)),
            None => row.push_str("\t."),
        }
        row
    }
}

/// Derives the per-locus RNG stream. Depends only on the run seed and
/// the locus key, so shard assignment never changes a tie-break.
fn locus_rng(seed: u64, key: &LocusKey) -> StdRng {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    StdRng::seed_from_u64(seed ^ hasher.finish())
}

/// Aggregates a locus's resolved calls into one consensus record.
/// Priority is categorical: `CO_MUT` over `SO_MUT` over the lower tier,
/// where the lower tier is decided by highest count with uniform-random
/// tie-breaks. Returns `None` for a locus with no calls.
pub fn build_consensus<'a>(
    locus: &'a Locus,
    mut calls: Vec<ResolvedCall>,
    seed: u64,
) -> Option<ConsensusRecord<'a>> {
    if calls.is_empty() {
        return None;
    }
    calls.sort_by(|a, b| a.fragment_id.cmp(&b.fragment_id));
    let mut rng = locus_rng(seed, &locus.key);

    let mut tally = SupportTally::default();
    let mut lengths: [Vec<u64>; 7] = Default::default();
    for call in &calls {
        tally.count(call.status);
        lengths[call.status.index()].push(call.fragment_len);
    }
    let mut median_len = [None; 7];
    for (slot, values) in median_len.iter_mut().zip(lengths.iter_mut()) {
        *slot = median(values);
    }

    let category = select_category(&tally, &mut rng);
    if let Some(category) = category {
        debug!("{} resolved to {}", locus.target_key(), category.label());
    }
    let consensus_base = category.map(|category| {
        let candidates: Vec<&ResolvedCall> = calls
            .iter()
            .filter(|call| call.status == category)
            .collect();
        let chosen = if candidates.len() == 1 {
            candidates[0]
        } else {
            candidates[rng.gen_range(0..candidates.len())]
        };
        disambiguate(chosen.bases, locus.alt_base, &mut rng)
    });

    Some(ConsensusRecord {
        locus,
        tally,
        median_len,
        category,
        consensus_base,
    })
}

fn select_category(tally: &SupportTally, rng: &mut StdRng) -> Option<LocusStatus> {
    if tally.get(LocusStatus::MutConcordant) > 0 {
        return Some(LocusStatus::MutConcordant);
    }
    if tally.get(LocusStatus::MutSingleRead) > 0 {
        return Some(LocusStatus::MutSingleRead);
    }
    let max = LOWER_TIER
        .iter()
        .map(|category| tally.get(*category))
        .max()?;
    if max == 0 {
        return None;
    }
    let tied: Vec<LocusStatus> = LOWER_TIER
        .iter()
        .copied()
        .filter(|category| tally.get(*category) == max)
        .collect();
    if tied.len() == 1 {
        Some(tied[0])
    } else {
        Some(tied[rng.gen_range(0..tied.len())])
    }
}

/// Reduces the chosen fragment's base(s) to exactly one base. A
/// discordant pair keeps the base matching the known alternate when one
/// does, and falls back to a uniform choice between the two otherwise.
fn disambiguate(bases: ResolvedBases, alt_base: u8, rng: &mut StdRng) -> u8 {
    match bases {
        ResolvedBases::Single(base) => base,
        ResolvedBases::Pair(mate1, mate2) if mate1 == mate2 => mate1,
        ResolvedBases::Pair(mate1, mate2) => {
            if mate1 == alt_base {
                mate1
            } else if mate2 == alt_base {
                mate2
            } else if rng.gen_range(0..2) == 0 {
                mate1
            } else {
                mate2
            }
        }
    }
}

fn median(values: &mut Vec<u64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid] as f64)
    } else {
        Some((values[mid - 1] + values[mid]) as f64 / 2.0)
    }
}
