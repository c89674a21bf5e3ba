//! Placement of a coordinate against a transcript's exon model.

use genome_model::{Classification, FeatureKind, FeatureTable, Region};

/// Classifies a 1-based `position` as exonic, intronic or outside the exon span.
///
/// Exon boundaries are inclusive. A table without exons cannot place anything
/// and reports ambiguity rather than guessing.
#[must_use]
pub fn classify(table: &FeatureTable, position: u64) -> Classification {
    let exons = table.exons();
    let (Some(first), Some(last)) = (exons.first(), exons.last()) else {
        return Classification::Ambiguous {
            reason: "reference sequence has no annotated exons".to_string(),
        };
    };
    let (first, last) = (first.start, last.end);
    if position < first || position > last {
        return Classification::OutOfRange { first, last };
    }

    let index = exons.partition_point(|exon| exon.end < position);
    if let Some(exon) = exons.get(index).filter(|exon| exon.contains(position)) {
        return Classification::Found {
            region: Region::Exon {
                ordinal: exon.ordinal,
            },
        };
    }

    match table
        .of_kind(FeatureKind::Intron)
        .find(|intron| intron.contains(position))
    {
        Some(intron) => Classification::Found {
            region: Region::Intron {
                ordinal: intron.ordinal,
            },
        },
        None => Classification::Ambiguous {
            reason: format!("position {position} falls between exons with no intron annotated"),
        },
    }
}
