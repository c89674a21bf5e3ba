use genome_model::{Classification, GenomicContext, ReferenceSequence};
use tracing::info;

use super::{ControlError, GenomeControlPlane, required};
use crate::classify::classify;
use crate::parsers::FeatureTableParse;
use crate::sources::SourceError;

impl GenomeControlPlane {
    /// Places a position on a gene's current RefSeq mRNA.
    ///
    /// `position` is 1-based on the reference sequence. Mapping is best effort
    /// against the latest version only; an unreadable transcript model yields an
    /// `Ambiguous` classification rather than an error.
    ///
    /// # Errors
    /// Returns `ControlError::InvalidInput` for a blank symbol or position zero,
    /// and `ControlError::Source` with `NotFound` when the gene has no RefSeq
    /// mRNA or the sequence has no exon features.
    pub async fn get_genomic_context(
        &self,
        symbol: &str,
        position: u64,
    ) -> Result<GenomicContext, ControlError> {
        let symbol = required("symbol", symbol)?;
        if position == 0 {
            return Err(ControlError::InvalidInput(
                "position is 1-based and must be at least 1".to_string(),
            ));
        }

        let reference = self.nucleotide.resolve_refseq(symbol).await?;
        let parsed = self.nucleotide.feature_table(&reference).await?;

        let (classification, exon_count) = match parsed {
            FeatureTableParse::Ambiguous { reason } => (Classification::Ambiguous { reason }, 0),
            FeatureTableParse::Table(table) => {
                let exon_count = table.exons().len();
                if exon_count == 0 {
                    return Err(SourceError::NotFound(format!("exon features on {reference}")).into());
                }
                (classify(&table, position), exon_count)
            }
        };
        info!(%symbol, %reference, position, ?classification, "classified position");

        Ok(GenomicContext {
            gene_symbol: symbol.to_string(),
            note: context_note(&reference, &classification),
            reference,
            position,
            classification,
            exon_count,
        })
    }
}

fn context_note(reference: &ReferenceSequence, classification: &Classification) -> String {
    let basis = format!(
        "Best-effort mapping against {reference}, the latest RefSeq version; \
         positions are read on this transcript, not on a genome assembly."
    );
    match classification {
        Classification::Found { region } => format!("{basis} Position falls in {region}."),
        Classification::Ambiguous { reason } => {
            format!("{basis} No region reported because the feature table is ambiguous: {reason}.")
        }
        Classification::OutOfRange { first, last } => format!(
            "{basis} Position lies outside the annotated exons ({first}-{last})."
        ),
    }
}
