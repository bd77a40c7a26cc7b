use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "fragsig",
    about = "Consensus calling of cfDNA fragments at candidate mutation loci and SBS96 spectra"
)]
pub(crate) struct FragSig {
    #[structopt(
        short,
        long,
        help = "Reference FASTA, optionally gzipped",
        parse(from_os_str)
    )]
    pub reference: PathBuf,
    #[structopt(
        short,
        long,
        help = "Write the per-locus consensus table to this path",
        parse(from_os_str)
    )]
    pub consensus_out: Option<PathBuf>,
    #[structopt(
        short,
        long,
        help = "Emit fractions of the grand total instead of raw counts"
    )]
    pub normalize: bool,
    #[structopt(
        short,
        long,
        help = "Seed for the consensus tie-breaks",
        default_value = "0"
    )]
    pub seed: u64,
    #[structopt(short, long, help = "Number of threads", default_value = "4")]
    pub threads: usize,
    #[structopt(
        short,
        long,
        help = "Verbosity, -v for debug and -vv for trace",
        parse(from_occurrences)
    )]
    pub verbose: u8,
    #[structopt(
        help = "Fragment table produced by the alignment/annotation step",
        parse(from_os_str)
    )]
    pub fragments: PathBuf,
    #[structopt(help = "Candidate mutation loci", parse(from_os_str))]
    pub loci: PathBuf,
}

impl FragSig {
    pub(crate) fn set_logging(&self) {
        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    }
}
