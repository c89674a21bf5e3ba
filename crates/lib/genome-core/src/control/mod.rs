use std::{error::Error, fmt, sync::Arc};

use crate::fetch::Fetcher;
use crate::services::ReportCache;
use crate::sources::{
    ClinVarClient,
    EntrezClient,
    GeneClient,
    GnomadClient,
    NucleotideClient,
    PubmedClient,
    ReactomeClient,
    SourceConfig,
    SourceError,
};

pub mod context;
pub mod discovery;
pub mod genes;
pub mod variants;

pub use discovery::{DEFAULT_LITERATURE_CONCURRENCY, DiscoveryRequest, rank_counts};

#[derive(Debug)]
pub enum ControlError {
    Source(SourceError),
    InvalidInput(String),
    NoCandidateGenes { phenotype: String },
}

impl ControlError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Source(SourceError::NotFound(_)))
    }
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(err) => write!(f, "{err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::NoCandidateGenes { phenotype } => {
                write!(f, "no candidate genes found for phenotype '{phenotype}'")
            }
        }
    }
}

impl Error for ControlError {}

impl From<SourceError> for ControlError {
    fn from(err: SourceError) -> Self {
        Self::Source(err)
    }
}

/// Entry point for every query the server exposes.
///
/// Cloning is cheap; all clones share one fetcher and rate limiter.
#[derive(Clone)]
pub struct GenomeControlPlane {
    clinvar: ClinVarClient,
    gene: GeneClient,
    pubmed: PubmedClient,
    nucleotide: NucleotideClient,
    gnomad: GnomadClient,
    reactome: ReactomeClient,
    literature_concurrency: usize,
    reports: Option<ReportCache>,
}

impl GenomeControlPlane {
    pub fn new(fetcher: Arc<Fetcher>, config: &SourceConfig) -> Self {
        let entrez = Arc::new(config.entrez());
        Self {
            clinvar: EntrezClient::new(fetcher.clone(), entrez.clone()),
            gene: EntrezClient::new(fetcher.clone(), entrez.clone()),
            pubmed: EntrezClient::new(fetcher.clone(), entrez.clone()),
            nucleotide: EntrezClient::new(fetcher.clone(), entrez),
            gnomad: GnomadClient::new(fetcher.clone(), config.gnomad_url.clone()),
            reactome: ReactomeClient::new(fetcher, config.reactome_url.clone()),
            literature_concurrency: DEFAULT_LITERATURE_CONCURRENCY,
            reports: None,
        }
    }

    /// Upper bound on per-gene literature lookups in flight. Zero is treated as one.
    #[must_use]
    pub fn with_literature_concurrency(mut self, concurrency: usize) -> Self {
        self.literature_concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn with_report_cache(mut self, cache: ReportCache) -> Self {
        self.reports = Some(cache);
        self
    }
}

/// Trimmed, non-empty text input.
fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ControlError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ControlError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(value)
}
