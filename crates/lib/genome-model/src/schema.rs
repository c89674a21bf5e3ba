pub const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const GNOMAD_API_URL: &str = "https://gnomad.broadinstitute.org/api";
pub const REACTOME_CONTENT_URL: &str = "https://reactome.org/ContentService";

pub const DB_CLINVAR: &str = "clinvar";
pub const DB_GENE: &str = "gene";
pub const DB_PUBMED: &str = "pubmed";
pub const DB_NUCLEOTIDE: &str = "nucleotide";

pub const ENDPOINT_ESEARCH: &str = "esearch.fcgi";
pub const ENDPOINT_ESUMMARY: &str = "esummary.fcgi";
pub const ENDPOINT_EFETCH: &str = "efetch.fcgi";
pub const ENDPOINT_ELINK: &str = "elink.fcgi";

pub const HUMAN_TAXON_ID: &str = "9606";
pub const REACTOME_SPECIES: &str = "Homo sapiens";
pub const REACTOME_SCHEMA_PATHWAY: &str = "Pathway";
pub const REACTOME_DB_UNIPROT: &str = "UniProt";

pub const GNOMAD_DATASET_GRCH38: &str = "gnomad_r3";
pub const GNOMAD_DATASET_GRCH37: &str = "gnomad_r2_1";

/// Candidate paths for a ClinVar record's clinical significance, most specific first.
///
/// Newer esummary payloads split classifications by scheme; older ones carry a
/// single `clinical_significance` field.
pub const CLINICAL_SIGNIFICANCE_FIELDS: &[&[&str]] = &[
    &["germline_classification", "description"],
    &["oncogenicity_classification", "description"],
    &["clinical_impact_classification", "description"],
    &["clinical_significance", "description"],
    &["clinical_significance"],
];

/// Candidate paths for the accession of a ClinVar record.
pub const VARIANT_ACCESSION_FIELDS: &[&[&str]] = &[&["accession_version"], &["accession"]];

/// Candidate paths for the date a ClinVar classification was last evaluated.
pub const LAST_EVALUATED_FIELDS: &[&[&str]] = &[
    &["germline_classification", "last_evaluated"],
    &["oncogenicity_classification", "last_evaluated"],
    &["clinical_impact_classification", "last_evaluated"],
    &["clinical_significance", "last_evaluated"],
];

/// Candidate paths for the display name of a Reactome event.
pub const PATHWAY_NAME_FIELDS: &[&[&str]] = &[&["displayName"], &["name"]];

/// Candidate paths for the kind of a Reactome event.
pub const PATHWAY_KIND_FIELDS: &[&[&str]] = &[&["type"], &["className"], &["schemaClass"]];

/// Candidate paths for the accession of a nucleotide record.
pub const NUCLEOTIDE_ACCESSION_FIELDS: &[&[&str]] = &[&["accessionversion"], &["caption"]];

pub const GNOMAD_VARIANT_QUERY: &str = r"query getVariant($variantId: String!, $datasetId: DatasetId!) {
  variant(variantId: $variantId, dataset: $datasetId) {
    exome { ac an af }
    genome { ac an af }
  }
}";

#[must_use]
pub fn make_gene_term(symbol: &str) -> String {
    format!("{symbol}[Sym] AND human[Organism]")
}

/// Nucleotide search terms for a gene's reference mRNA, most curated first.
#[must_use]
pub fn make_refseq_terms(symbol: &str) -> [String; 3] {
    [
        format!(
            "{symbol}[Gene Name] AND refseq_select[Filter] AND biomol_mrna[Prop] AND human[Organism]"
        ),
        format!("{symbol}[Gene Name] AND RefSeq[Filter] AND biomol_mrna[Prop] AND human[Organism]"),
        format!("{symbol}[Gene Name] AND biomol_mrna[Prop] AND human[Organism]"),
    ]
}
