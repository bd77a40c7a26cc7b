#![warn(missing_debug_implementations, rust_2018_idioms, missing_docs)]
#![allow(dead_code)]

//! Consensus calling of cfDNA fragments at candidate mutation loci and
//! tabulation of the genome-wide SBS96 trinucleotide substitution spectrum.
mod cli;
mod consensus;
mod context;
mod error;
mod fragment;
mod locus;
mod spectrum;
mod status;

use crate::consensus::{build_consensus, ConsensusRecord, CONSENSUS_HEADER};
use crate::context::{FastaStore, TrinucleotideContext};
use crate::error::Error;
use crate::spectrum::{channel_index, OverlapType, Spectrum};
use log::{info, warn};
use rayon::prelude::*;
use std::io::Write;
use structopt::StructOpt;

type Result<T> = std::result::Result<T, crate::error::Error>;

/// A locus's consensus row plus its spectrum contribution, if any
#[derive(Debug)]
struct LocusOutcome<'a> {
    record: ConsensusRecord<'a>,
    channel: Option<(usize, OverlapType)>,
    excluded: Option<Error>,
}

fn main() -> Result<()> {
    let opt = cli::FragSig::from_args();
    opt.set_logging();

    rayon::ThreadPoolBuilder::new()
        .num_threads(opt.threads)
        .build_global()
        .map_err(|_| Error::ThreadError)?;

    let (rdr, _) = niffler::from_path(&opt.loci)?;
    let table = locus::LocusTable::from_reader(rdr)?;
    info!("Loaded {} candidate loci", table.len());

    let (rdr, _) = niffler::from_path(&opt.fragments)?;
    let store = fragment::FragmentStore::from_reader(rdr)?;
    info!(
        "Loaded {} fragments, {} duplicate identifiers collapsed",
        store.len(),
        store.duplicates
    );

    let (rdr, _) = niffler::from_path(&opt.reference)?;
    let reference = FastaStore::from_reader(bio::io::fasta::Reader::new(rdr))?;
    info!("Loaded {} reference sequences", reference.len());

    let resolved = status::resolve_all(&store, &table);
    if resolved.unresolved > 0 {
        warn!(
            "Skipped {} annotations referencing loci absent from the locus table",
            resolved.unresolved
        );
    }

    let seed = opt.seed;
    let outcomes: Vec<LocusOutcome<'_>> = resolved
        .loci
        .into_par_iter()
        .filter_map(|(locus, calls)| {
            let record = build_consensus(locus, calls, seed)?;
            let overlap = record.category.and_then(OverlapType::from_category);
            let (channel, excluded) = match overlap {
                None => (None, None),
                Some(overlap) => match TrinucleotideContext::from_locus(locus, &reference) {
                    Ok(ctx) => (channel_index(&ctx).map(|index| (index, overlap)), None),
                    Err(err) => (None, Some(err)),
                },
            };
            Some(LocusOutcome {
                record,
                channel,
                excluded,
            })
        })
        .collect();

    let mut excluded = 0;
    for outcome in &outcomes {
        if let Some(err) = &outcome.excluded {
            warn!(
                "Excluding {} from the spectrum: {}",
                outcome.record.locus.target_key(),
                err
            );
            excluded += 1;
        }
    }

    if let Some(ref path) = opt.consensus_out {
        let mut wtr = std::io::BufWriter::new(std::fs::File::create(path)?);
        writeln!(wtr, "{}", CONSENSUS_HEADER)?;
        for outcome in &outcomes {
            writeln!(wtr, "{}", outcome.record.to_row())?;
        }
    }

    let spectrum = outcomes
        .par_iter()
        .filter_map(|outcome| outcome.channel)
        .fold(Spectrum::new, |mut spectrum, (channel, overlap)| {
            spectrum.record(channel, overlap);
            spectrum
        })
        .reduce(Spectrum::new, Spectrum::merge);

    let stdout = std::io::stdout();
    spectrum.write(stdout.lock(), opt.normalize)?;

    info!(
        "Emitted {} consensus loci from {} fragments ({} outer), {} spectrum entries, {} loci excluded",
        outcomes.len(),
        store.len(),
        resolved.outer_fragments,
        spectrum.total(),
        excluded
    );

    Ok(())
}
