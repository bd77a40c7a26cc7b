use crate::error::Error;
use crate::locus::LocusKey;
use crate::Result;
use log::debug;
use std::collections::HashSet;
use std::io::BufRead;

/// Strand the fragment was sequenced from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
    Unknown,
}

/// One mate's observation at a locus: a literal base call, or the
/// placeholder upstream emits when the mate matched the reference
/// without materializing the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MateBase {
    Call(u8),
    MatchesRef,
}

/// Raw per-mate observation at one locus, before status resolution.
/// `mate2` is absent when only one mate covered the locus.
#[derive(Debug, Clone)]
pub struct LocusAnnotation {
    pub key: LocusKey,
    pub mate1: MateBase,
    pub mate2: Option<MateBase>,
}

/// A paired-end fragment with its overlapping-locus annotations
#[derive(Debug, Clone)]
pub struct Fragment {
    pub id: String,
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub annotations: Vec<LocusAnnotation>,
}

impl Fragment {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Fragment overlapping no candidate locus
    pub fn is_outer(&self) -> bool {
        self.annotations.is_empty()
    }
}

/// Collapses an upstream `.N` duplicate-name disambiguation suffix back
/// to the underlying read-pair name, so `readX` and `readX.1` count once.
pub fn logical_id(raw: &str) -> &str {
    match raw.rfind('.') {
        Some(idx)
            if idx > 0
                && !raw[idx + 1..].is_empty()
                && raw[idx + 1..].bytes().all(|b| b.is_ascii_digit()) =>
        {
            &raw[..idx]
        }
        _ => raw,
    }
}

/// The full set of fragments for a run, de-duplicated first-seen-wins
/// on the logical identifier.
#[derive(Debug, Default)]
pub struct FragmentStore {
    fragments: Vec<Fragment>,
    pub duplicates: usize,
}

impl FragmentStore {
    /// Reads a six column TSV of
    /// `id  chrom  start  end  strand  annotations` entries where
    /// `annotations` is `.` or a comma-separated list of `chrom:pos:bases`.
    pub fn from_reader<T: std::io::Read>(rdr: T) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut fragments = Vec::new();
        let mut duplicates = 0;
        for (i, line) in std::io::BufReader::new(rdr).lines().enumerate() {
            let line = line?;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fragment = parse_fragment_line(&line).ok_or(Error::FragmentRecordError(i + 1))?;
            if !seen.insert(fragment.id.clone()) {
                debug!("Dropping duplicate fragment {}", fragment.id);
                duplicates += 1;
                continue;
            }
            fragments.push(fragment);
        }
        Ok(Self {
            fragments,
            duplicates,
        })
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

fn parse_fragment_line(line: &str) -> Option<Fragment> {
    let mut fields = line.split('\t');
    let id = logical_id(fields.next()?).to_string();
    let chrom = fields.next()?.to_string();
    let start = fields.next()?.parse().ok()?;
    let end: u64 = fields.next()?.parse().ok()?;
    let strand = match fields.next()? {
        "+" => Strand::Forward,
        "-" => Strand::Reverse,
        "." => Strand::Unknown,
        _ => return None,
    };
    let annotations = match fields.next()? {
        "." => Vec::new(),
        list => list
            .split(',')
            .map(parse_annotation)
            .collect::<Option<Vec<_>>>()?,
    };
    if id.is_empty() || chrom.is_empty() || end < start {
        return None;
    }
    Some(Fragment {
        id,
        chrom,
        start,
        end,
        strand,
        annotations,
    })
}

fn parse_annotation(field: &str) -> Option<LocusAnnotation> {
    let mut parts = field.rsplitn(3, ':');
    let bases = parts.next()?.as_bytes();
    let pos = parts.next()?.parse().ok()?;
    let chrom = parts.next()?;
    if chrom.is_empty() {
        return None;
    }
    let (mate1, mate2) = match bases {
        [one] => (mate_base(*one)?, None),
        [one, two] => (mate_base(*one)?, Some(mate_base(*two)?)),
        _ => return None,
    };
    Some(LocusAnnotation {
        key: LocusKey {
            chrom: chrom.to_string(),
            pos,
        },
        mate1,
        mate2,
    })
}

fn mate_base(raw: u8) -> Option<MateBase> {
    match raw.to_ascii_uppercase() {
        b'.' => Some(MateBase::MatchesRef),
        base if matches!(base, b'A' | b'C' | b'G' | b'T' | b'N') => Some(MateBase::Call(base)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_id_strips_suffix() {
        assert_eq!(logical_id("readX"), "readX");
        assert_eq!(logical_id("readX.1"), "readX");
        assert_eq!(logical_id("readX.12"), "readX");
        assert_eq!(logical_id("readX.1a"), "readX.1a");
        assert_eq!(logical_id(".7"), ".7");
    }

    #[test]
    fn test_parse_fragment_line() {
        let fragment =
            parse_fragment_line("frag1\tchr1\t100\t260\t+\tchr1:150:TT,chr1:200:.C").unwrap();
        assert_eq!(fragment.id, "frag1");
        assert_eq!(fragment.len(), 160);
        assert_eq!(fragment.strand, Strand::Forward);
        assert_eq!(fragment.annotations.len(), 2);
        assert_eq!(fragment.annotations[0].mate1, MateBase::Call(b'T'));
        assert_eq!(fragment.annotations[0].mate2, Some(MateBase::Call(b'T')));
        assert_eq!(fragment.annotations[1].mate1, MateBase::MatchesRef);
        assert_eq!(fragment.annotations[1].mate2, Some(MateBase::Call(b'C')));
    }

    #[test]
    fn test_parse_outer_fragment() {
        let fragment = parse_fragment_line("frag2\tchr2\t10\t180\t-\t.").unwrap();
        assert!(fragment.is_outer());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_fragment_line("frag\tchr1\t100\t50\t+\t.").is_none());
        assert!(parse_fragment_line("frag\tchr1\t100\t200\t?\t.").is_none());
        assert!(parse_fragment_line("frag\tchr1\t100\t200\t+\tchr1:150:XYZ").is_none());
        assert!(parse_fragment_line("frag\tchr1\t100\t200\t+\tchr1:150:QQ").is_none());
    }

    #[test]
    fn test_store_dedup_first_seen_wins() {
        let input = "readX\tchr1\t0\t100\t+\tchr1:50:TT\n\
                     readX.1\tchr1\t5\t105\t+\tchr1:50:CC\n\
                     readY\tchr1\t0\t100\t-\t.\n";
        let store = FragmentStore::from_reader(input.as_bytes()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.duplicates, 1);
        assert_eq!(store.fragments()[0].id, "readX");
        assert_eq!(
            store.fragments()[0].annotations[0].mate1,
            MateBase::Call(b'T')
        );
    }
}
