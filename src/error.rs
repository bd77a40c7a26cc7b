use thiserror::Error;

#[derive(Debug, Error)]
/// Errors of which majority are related to I/O issues or malformed input tables
pub enum Error {
    #[error("Could not read input file")]
    /// Could not read an input line
    Io(#[from] std::io::Error),
    #[error("Could not convert bytes as it is invalid UTF-8")]
    /// Data is not in UTF-8 format
    NotUTF8(#[from] std::string::FromUtf8Error),
    #[error("Could not open input file")]
    /// Open compressed/plain input error
    OpenInput(#[from] niffler::Error),
    #[error("Could not spawn threads")]
    /// Create thread pools error
    ThreadError,
    #[error("Could not read locus table entry at line {0}")]
    /// Malformed locus table line
    LocusRecordError(usize),
    #[error("Could not read fragment entry at line {0}")]
    /// Malformed fragment table line
    FragmentRecordError(usize),
    #[error("Fragment references locus `{0}` absent from the locus table")]
    /// Annotation key with no locus table entry
    UnresolvedLocus(String),
    #[error("Unknown reference sequence `{0}`")]
    /// Chromosome missing from the reference FASTA
    UnknownSequence(String),
    #[error("Trinucleotide window at {0} is outside the reference sequence")]
    /// Locus too close to a contig edge for a 3-base window
    ContextOutOfBounds(String),
    #[error("Trinucleotide window `{0}` at {1} contains non-ACGT characters")]
    /// Ambiguous bases in the fetched reference window
    AmbiguousContext(String, String),
}
