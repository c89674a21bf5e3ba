use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::{GNOMAD_DATASET_GRCH37, GNOMAD_DATASET_GRCH38};

/// ClinVar variant record normalized from an esummary document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariantSummary {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinical_significance: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gene_symbols: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// NCBI Gene record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneSummary {
    pub gene_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// PubMed citation as returned by esummary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleSummary {
    pub pmid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
}

/// PubMed article with its abstract, parsed from efetch XML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleAbstract {
    pub pmid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
}

/// Reactome pathway a gene product participates in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pathway {
    pub st_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AlleleCounts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ac: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub an: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub af: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SampleSet {
    Genome,
    Exome,
}

/// gnomAD allele frequencies for one variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopulationFrequency {
    pub variant_id: String,
    pub dataset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genome: Option<AlleleCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exome: Option<AlleleCounts>,
}

impl PopulationFrequency {
    /// Genome counts when present, otherwise exome counts.
    #[must_use]
    pub fn preferred(&self) -> Option<(SampleSet, AlleleCounts)> {
        self.genome
            .map(|counts| (SampleSet::Genome, counts))
            .or_else(|| self.exome.map(|counts| (SampleSet::Exome, counts)))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum GenomeBuild {
    #[serde(rename = "GRCh37")]
    Grch37,
    #[default]
    #[serde(rename = "GRCh38")]
    Grch38,
}

impl GenomeBuild {
    #[must_use]
    pub const fn gnomad_dataset(self) -> &'static str {
        match self {
            Self::Grch37 => GNOMAD_DATASET_GRCH37,
            Self::Grch38 => GNOMAD_DATASET_GRCH38,
        }
    }
}

impl FromStr for GenomeBuild {
    type Err = CoordinateParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "grch37" | "hg19" => Ok(Self::Grch37),
            "grch38" | "hg38" => Ok(Self::Grch38),
            other => Err(CoordinateParseError::new(format!("unknown genome build: {other}"))),
        }
    }
}

/// Error returned when a variant coordinate string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateParseError {
    message: String,
}

impl CoordinateParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CoordinateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid variant coordinate: {}", self.message)
    }
}

impl Error for CoordinateParseError {}

/// Chromosome-position-ref-alt variant coordinate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariantCoordinate {
    pub chrom: String,
    pub pos: u64,
    pub ref_allele: String,
    pub alt_allele: String,
}

impl VariantCoordinate {
    /// gnomAD variant id, `CHROM-POS-REF-ALT` without a `chr` prefix.
    #[must_use]
    pub fn gnomad_id(&self) -> String {
        let chrom = self.chrom.strip_prefix("chr").unwrap_or(&self.chrom);
        format!("{chrom}-{}-{}-{}", self.pos, self.ref_allele, self.alt_allele)
    }
}

impl FromStr for VariantCoordinate {
    type Err = CoordinateParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.trim().split('-').collect();
        let [chrom, pos, ref_allele, alt_allele] = parts.as_slice() else {
            return Err(CoordinateParseError::new(format!(
                "expected CHROM-POS-REF-ALT, got '{value}'"
            )));
        };
        if [chrom, ref_allele, alt_allele].iter().any(|part| part.is_empty()) {
            return Err(CoordinateParseError::new(format!("empty component in '{value}'")));
        }
        let pos = pos
            .parse::<u64>()
            .ok()
            .filter(|pos| *pos > 0)
            .ok_or_else(|| CoordinateParseError::new(format!("position must be a positive integer: '{pos}'")))?;
        Ok(Self {
            chrom: (*chrom).to_string(),
            pos,
            ref_allele: ref_allele.to_ascii_uppercase(),
            alt_allele: alt_allele.to_ascii_uppercase(),
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Exon,
    Intron,
    Cds,
    Utr,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strand {
    #[default]
    Plus,
    Minus,
}

/// Annotated region of a reference sequence, 1-based and inclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureInterval {
    pub kind: FeatureKind,
    pub ordinal: u32,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
}

impl FeatureInterval {
    #[must_use]
    pub const fn contains(&self, position: u64) -> bool {
        self.start <= position && position <= self.end
    }
}

/// Ordered feature list of one reference sequence.
///
/// Intervals are sorted by start and never overlap within the same kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,
    pub intervals: Vec<FeatureInterval>,
}

impl FeatureTable {
    pub fn of_kind(&self, kind: FeatureKind) -> impl Iterator<Item = &FeatureInterval> {
        self.intervals.iter().filter(move |interval| interval.kind == kind)
    }

    /// Exon intervals in coordinate order.
    #[must_use]
    pub fn exons(&self) -> Vec<FeatureInterval> {
        self.of_kind(FeatureKind::Exon).copied().collect()
    }
}

/// RefSeq accession split into its stable id and version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceSequence {
    pub accession: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

impl ReferenceSequence {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        match value.rsplit_once('.') {
            Some((accession, version)) => match version.parse::<u32>() {
                Ok(version) => Self {
                    accession: accession.to_string(),
                    version: Some(version),
                },
                Err(_) => Self {
                    accession: value.to_string(),
                    version: None,
                },
            },
            None => Self {
                accession: value.to_string(),
                version: None,
            },
        }
    }
}

impl fmt::Display for ReferenceSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(version) => write!(f, "{}.{version}", self.accession),
            None => write!(f, "{}", self.accession),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Region {
    Exon { ordinal: u32 },
    Intron { ordinal: u32 },
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exon { ordinal } => write!(f, "Exon {ordinal}"),
            Self::Intron { ordinal } => write!(f, "Intron {ordinal}"),
        }
    }
}

/// Outcome of placing a coordinate against a feature table.
///
/// `Ambiguous` is a real outcome, not a failure: the table could not be read
/// as a single transcript model, so no region is claimed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Classification {
    Found { region: Region },
    Ambiguous { reason: String },
    OutOfRange { first: u64, last: u64 },
}

impl Classification {
    #[must_use]
    pub const fn region(&self) -> Option<Region> {
        match self {
            Self::Found { region } => Some(*region),
            _ => None,
        }
    }
}

/// Structural context of a coordinate within a gene's reference transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenomicContext {
    pub gene_symbol: String,
    pub reference: ReferenceSequence,
    pub position: u64,
    pub classification: Classification,
    pub exon_count: usize,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneRank {
    pub symbol: String,
    pub variant_count: usize,
}

/// Literature gathered for one candidate gene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneEvidence {
    pub symbol: String,
    pub variant_count: usize,
    pub gene_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pmids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub articles: Vec<ArticleAbstract>,
}

/// Candidate gene whose literature section was dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OmittedGene {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub phenotype: String,
    pub ranked_genes: Vec<GeneRank>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<GeneEvidence>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub omitted: Vec<OmittedGene>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_parse_with_or_without_chr_prefix() {
        let coordinate: VariantCoordinate = "chrX-153296777-c-t".parse().unwrap();
        assert_eq!(coordinate.chrom, "chrX");
        assert_eq!(coordinate.gnomad_id(), "X-153296777-C-T");

        assert!("17-0-G-A".parse::<VariantCoordinate>().is_err());
        assert!("17-43045712-G".parse::<VariantCoordinate>().is_err());
        assert!("17-43045712--A".parse::<VariantCoordinate>().is_err());
    }

    #[test]
    fn genome_build_accepts_ucsc_aliases() {
        assert_eq!("hg19".parse::<GenomeBuild>().unwrap(), GenomeBuild::Grch37);
        assert_eq!(" GRCh38 ".parse::<GenomeBuild>().unwrap(), GenomeBuild::Grch38);
        assert_eq!(GenomeBuild::default().gnomad_dataset(), GNOMAD_DATASET_GRCH38);
    }

    #[test]
    fn reference_sequence_splits_the_version() {
        let reference = ReferenceSequence::parse("NM_000249.4");
        assert_eq!(reference.accession, "NM_000249");
        assert_eq!(reference.version, Some(4));
        assert_eq!(reference.to_string(), "NM_000249.4");
        assert_eq!(ReferenceSequence::parse("NM_000249").version, None);
    }

    #[test]
    fn classification_serializes_with_an_outcome_tag() {
        let found = Classification::Found {
            region: Region::Intron { ordinal: 2 },
        };
        assert_eq!(
            serde_json::to_value(&found).unwrap(),
            serde_json::json!({"outcome": "found", "region": {"kind": "intron", "ordinal": 2}})
        );
        let out = Classification::OutOfRange { first: 1, last: 500 };
        assert_eq!(serde_json::to_value(&out).unwrap()["outcome"], "out_of_range");
        assert_eq!(out.region(), None);
    }
}
