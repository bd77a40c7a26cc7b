use crate::error::Error;
use crate::locus::Locus;
use crate::Result;
use bio::alphabets::dna;
use log::debug;
use std::collections::HashMap;

/// Capability for fetching reference bases. The trinucleotide
/// normalizer sees the genome only through this trait.
pub trait ReferenceAccessor: Sync {
    /// Returns the bases covering the 0-based half-open interval
    fn fetch(&self, chrom: &str, start: u64, end: u64) -> Result<&[u8]>;
}

/// Whole-genome in-memory store keyed by sequence name
#[derive(Debug, Default)]
pub struct FastaStore {
    sequences: HashMap<String, String>,
}

impl FastaStore {
    pub fn from_reader<T: std::io::Read>(rdr: bio::io::fasta::Reader<T>) -> Result<Self> {
        let mut sequences = HashMap::new();
        for record in rdr.records() {
            let record = record?;
            sequences.insert(
                record.id().to_string(),
                String::from_utf8(record.seq().to_vec())?,
            );
        }
        Ok(Self { sequences })
    }

    pub fn insert<N: Into<String>, S: Into<String>>(&mut self, name: N, seq: S) {
        self.sequences.insert(name.into(), seq.into());
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl ReferenceAccessor for FastaStore {
    fn fetch(&self, chrom: &str, start: u64, end: u64) -> Result<&[u8]> {
        let seq = self
            .sequences
            .get(chrom)
            .ok_or_else(|| Error::UnknownSequence(chrom.to_string()))?;
        if start >= end || end > seq.len() as u64 {
            return Err(Error::ContextOutOfBounds(format!(
                "{}:{}-{}",
                chrom, start, end
            )));
        }
        Ok(&seq.as_bytes()[start as usize..end as usize])
    }
}

/// Pyrimidine-normalized trinucleotide classification of one locus.
/// `ref_base` is always C or T after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrinucleotideContext {
    pub five_prime: u8,
    pub ref_base: u8,
    pub alt_base: u8,
    pub three_prime: u8,
}

impl TrinucleotideContext {
    /// Fetches the 3-base reference window centered on the locus and
    /// canonicalizes it. A purine reference base reverse-complements the
    /// window and complements both alleles, per the substitution
    /// signature convention. Non-ACGT windows are an error so the
    /// caller can exclude the record.
    pub fn from_locus<R: ReferenceAccessor + ?Sized>(locus: &Locus, reference: &R) -> Result<Self> {
        if locus.key.pos < 2 {
            return Err(Error::ContextOutOfBounds(locus.key.to_string()));
        }
        let fetched = reference.fetch(&locus.key.chrom, locus.key.pos - 2, locus.key.pos + 1)?;
        let mut window = [
            fetched[0].to_ascii_uppercase(),
            fetched[1].to_ascii_uppercase(),
            fetched[2].to_ascii_uppercase(),
        ];
        if window
            .iter()
            .any(|base| !matches!(*base, b'A' | b'C' | b'G' | b'T'))
        {
            return Err(Error::AmbiguousContext(
                String::from_utf8_lossy(&window).into_owned(),
                locus.key.to_string(),
            ));
        }
        if window[1] != locus.ref_base {
            debug!(
                "Reference window at {} has {} where the locus table expects {}",
                locus.key, window[1] as char, locus.ref_base as char
            );
        }

        let (ref_base, alt_base) = match locus.ref_base {
            b'A' | b'G' => {
                let revcomp = dna::revcomp(&window[..]);
                window.copy_from_slice(&revcomp);
                (
                    dna::complement(locus.ref_base),
                    dna::complement(locus.alt_base),
                )
            }
            _ => (locus.ref_base, locus.alt_base),
        };

        Ok(Self {
            five_prime: window[0],
            ref_base,
            alt_base,
            three_prime: window[2],
        })
    }

    /// Channel label in the conventional `A[C>T]G` form
    pub fn channel(&self) -> String {
        format!(
            "{}[{}>{}]{}",
            self.five_prime as char,
            self.ref_base as char,
            self.alt_base as char,
            self.three_prime as char
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locus::LocusKey;

    fn locus(pos: u64, ref_base: u8, alt_base: u8) -> Locus {
        Locus {
            key: LocusKey {
                chrom: "chr1".to_string(),
                pos,
            },
            ref_base,
            alt_base,
        }
    }

    fn store(seq: &str) -> FastaStore {
        let mut store = FastaStore::default();
        store.insert("chr1", seq);
        store
    }

    #[test]
    fn test_pyrimidine_reference_passthrough() {
        // ACT with the C at position 2
        let reference = store("ACTG");
        let ctx = TrinucleotideContext::from_locus(&locus(2, b'C', b'A'), &reference).unwrap();
        assert_eq!(ctx.channel(), "A[C>A]T");
    }

    #[test]
    fn test_purine_reference_is_reverse_complemented() {
        // AGA window with the purine G in the middle normalizes to TCT
        let reference = store("AAGAA");
        let ctx = TrinucleotideContext::from_locus(&locus(3, b'G', b'T'), &reference).unwrap();
        assert_eq!(ctx.five_prime, b'T');
        assert_eq!(ctx.ref_base, b'C');
        assert_eq!(ctx.alt_base, b'A');
        assert_eq!(ctx.three_prime, b'T');
        assert_eq!(ctx.channel(), "T[C>A]T");
    }

    #[test]
    fn test_complement_is_involutive() {
        let reference = store("AAGAA");
        let ctx = TrinucleotideContext::from_locus(&locus(3, b'G', b'T'), &reference).unwrap();
        let window = [ctx.five_prime, ctx.ref_base, ctx.three_prime];
        let twice = dna::revcomp(dna::revcomp(&window[..]));
        assert_eq!(twice, window.to_vec());
        assert!(matches!(ctx.ref_base, b'C' | b'T'));
    }

    #[test]
    fn test_ambiguous_window_is_rejected() {
        let reference = store("ANCTG");
        let err = TrinucleotideContext::from_locus(&locus(3, b'C', b'T'), &reference).unwrap_err();
        assert!(matches!(err, Error::AmbiguousContext(_, _)));
    }

    #[test]
    fn test_contig_edges_are_rejected() {
        let reference = store("ACTG");
        assert!(TrinucleotideContext::from_locus(&locus(1, b'A', b'T'), &reference).is_err());
        assert!(TrinucleotideContext::from_locus(&locus(4, b'G', b'A'), &reference).is_err());
        let missing = TrinucleotideContext::from_locus(
            &Locus {
                key: LocusKey {
                    chrom: "chrM".to_string(),
                    pos: 2,
                },
                ref_base: b'C',
                alt_base: b'T',
            },
            &reference,
        );
        assert!(matches!(missing.unwrap_err(), Error::UnknownSequence(_)));
    }
}
