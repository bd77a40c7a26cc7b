use crate::error::Error;
use crate::Result;
use std::collections::HashMap;
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

/// Chromosome and 1-based position identifying a candidate mutation site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocusKey {
    pub chrom: String,
    pub pos: u64,
}

impl fmt::Display for LocusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chrom, self.pos)
    }
}

impl FromStr for LocusKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut fields = s.rsplitn(2, ':');
        let pos = fields.next().and_then(|p| p.parse().ok());
        match (fields.next(), pos) {
            (Some(chrom), Some(pos)) if !chrom.is_empty() => Ok(Self {
                chrom: chrom.to_string(),
                pos,
            }),
            _ => Err(Error::UnresolvedLocus(s.to_string())),
        }
    }
}

/// A candidate mutation site with its known reference and alternate base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locus {
    pub key: LocusKey,
    pub ref_base: u8,
    pub alt_base: u8,
}

impl Locus {
    /// Full site identity in the form `chrom:pos:ref:alt`
    pub fn target_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.key, self.ref_base as char, self.alt_base as char
        )
    }
}

/// Hash-indexed locus table keyed by chromosome and position
#[derive(Debug, Default)]
pub struct LocusTable {
    loci: HashMap<LocusKey, Locus>,
}

impl LocusTable {
    /// Reads a four column TSV of `chrom  pos  ref  alt` entries.
    /// Lines starting with `#` are skipped, any other malformed line is an error.
    pub fn from_reader<T: std::io::Read>(rdr: T) -> Result<Self> {
        let mut loci = HashMap::new();
        for (i, line) in std::io::BufReader::new(rdr).lines().enumerate() {
            let line = line?;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let locus = parse_locus_line(&line).ok_or(Error::LocusRecordError(i + 1))?;
            loci.insert(locus.key.clone(), locus);
        }
        Ok(Self { loci })
    }

    pub fn get(&self, key: &LocusKey) -> Option<&Locus> {
        self.loci.get(key)
    }

    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }
}

fn parse_locus_line(line: &str) -> Option<Locus> {
    let mut fields = line.split('\t');
    let chrom = fields.next()?;
    let pos = fields.next()?.parse().ok()?;
    let ref_base = single_base(fields.next()?)?;
    let alt_base = single_base(fields.next()?)?;
    if chrom.is_empty() || ref_base == alt_base {
        return None;
    }
    Some(Locus {
        key: LocusKey {
            chrom: chrom.to_string(),
            pos,
        },
        ref_base,
        alt_base,
    })
}

fn single_base(field: &str) -> Option<u8> {
    match field.as_bytes() {
        [base] if matches!(*base, b'A' | b'C' | b'G' | b'T') => Some(*base),
        _ => None,
    }
}
