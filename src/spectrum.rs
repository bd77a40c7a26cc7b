use crate::context::TrinucleotideContext;
use crate::status::LocusStatus;
use crate::Result;
use std::io::Write;

/// Number of SBS96 channels
pub const CHANNELS: usize = 96;

/// The six pyrimidine-reference substitution types in canonical order
pub const MUTATION_TYPES: [(u8, u8); 6] = [
    (b'C', b'A'),
    (b'C', b'G'),
    (b'C', b'T'),
    (b'T', b'A'),
    (b'T', b'C'),
    (b'T', b'G'),
];

/// Flanking bases in canonical order
pub const FLANKS: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Read-pair overlap stratum of the spectrum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapType {
    CoMut,
    SoMut,
    Discordant,
}

/// Output order of the strata
pub const OVERLAP_TYPES: [OverlapType; 3] =
    [OverlapType::CoMut, OverlapType::SoMut, OverlapType::Discordant];

impl OverlapType {
    pub fn label(self) -> &'static str {
        match self {
            OverlapType::CoMut => "CO_MUT",
            OverlapType::SoMut => "SO_MUT",
            OverlapType::Discordant => "DO",
        }
    }

    fn index(self) -> usize {
        match self {
            OverlapType::CoMut => 0,
            OverlapType::SoMut => 1,
            OverlapType::Discordant => 2,
        }
    }

    /// Maps a consensus category to its stratum. The stratum describes
    /// the read-pair topology of the support, not which base was seen,
    /// so the other-base categories fold into the matching MUT stratum.
    /// Reference categories never reach the spectrum.
    pub fn from_category(status: LocusStatus) -> Option<Self> {
        match status {
            LocusStatus::MutConcordant | LocusStatus::OtherConcordant => Some(OverlapType::CoMut),
            LocusStatus::MutSingleRead | LocusStatus::OtherSingleRead => Some(OverlapType::SoMut),
            LocusStatus::MutDiscordant => Some(OverlapType::Discordant),
            LocusStatus::RefConcordant | LocusStatus::RefSingleRead => None,
        }
    }
}

/// Canonical channel index, mutation-type major then 5' and 3' flank.
/// `None` only for contexts that escaped pyrimidine normalization.
pub fn channel_index(context: &TrinucleotideContext) -> Option<usize> {
    let mutation_type = MUTATION_TYPES
        .iter()
        .position(|pair| *pair == (context.ref_base, context.alt_base))?;
    let five = FLANKS.iter().position(|base| *base == context.five_prime)?;
    let three = FLANKS.iter().position(|base| *base == context.three_prime)?;
    Some(mutation_type * 16 + five * 4 + three)
}

/// Channel label for a canonical index, e.g. `A[C>A]A` for 0
pub fn channel_label(index: usize) -> String {
    let (ref_base, alt_base) = MUTATION_TYPES[index / 16];
    let five = FLANKS[(index % 16) / 4];
    let three = FLANKS[index % 4];
    format!(
        "{}[{}>{}]{}",
        five as char, ref_base as char, alt_base as char, three as char
    )
}

/// Genome-wide consensus counts per SBS96 channel and overlap stratum
#[derive(Debug, Clone)]
pub struct Spectrum {
    counts: [[u64; 3]; CHANNELS],
}

impl Default for Spectrum {
    fn default() -> Self {
        Self::new()
    }
}

impl Spectrum {
    pub fn new() -> Self {
        Self {
            counts: [[0; 3]; CHANNELS],
        }
    }

    pub fn record(&mut self, channel: usize, overlap: OverlapType) {
        self.counts[channel][overlap.index()] += 1;
    }

    /// Accumulates another shard's counts; channel counts are
    /// commutative so reduction order is irrelevant
    pub fn merge(mut self, other: Self) -> Self {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            for (count, addition) in mine.iter_mut().zip(theirs.iter()) {
                *count += addition;
            }
        }
        self
    }

    pub fn get(&self, channel: usize, overlap: OverlapType) -> u64 {
        self.counts[channel][overlap.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Writes the long-form table: one row per (channel, stratum),
    /// zeros included, channel-major in canonical order. Normalized
    /// values are fractions of the grand total, so the whole table
    /// sums to one.
    pub fn write<W: Write>(&self, mut wtr: W, normalize: bool) -> Result<()> {
        writeln!(wtr, "channel\toverlap_type\tvalue")?;
        let total = self.total();
        for channel in 0..CHANNELS {
            let label = channel_label(channel);
            for overlap in &OVERLAP_TYPES {
                let count = self.get(channel, *overlap);
                if normalize {
                    let value = if total == 0 {
                        0.0
                    } else {
                        count as f64 / total as f64
                    };
                    writeln!(wtr, "{}\t{}\t{:.6}", label, overlap.label(), value)?;
                } else {
                    writeln!(wtr, "{}\t{}\t{}", label, overlap.label(), count)?;
                }
            }
        }
        Ok(())
    }
}
