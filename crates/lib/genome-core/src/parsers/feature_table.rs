//! NCBI five-column feature table (`efetch rettype=ft`) parsing.
//!
//! The format is tab separated:
//!
//! ```text
//! >Feature ref|NM_000059.4|
//! 1	11954	gene
//! 			gene	BRCA2
//! 1	100	exon
//! 			number	1
//! 228	400	CDS
//! 500	10484
//! ```
//!
//! A feature line carries start, stop and key; a line with only start and stop
//! extends the previous feature; qualifier lines start with three empty columns.

use std::collections::HashSet;

use genome_model::{FeatureInterval, FeatureKind, FeatureTable, Strand};

use super::ParseError;

/// Result of reading a feature table as a single transcript model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureTableParse {
    Table(FeatureTable),
    Ambiguous { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: u64,
    end: u64,
    strand: Strand,
}

#[derive(Debug)]
struct RawFeature {
    key: String,
    spans: Vec<Span>,
}

#[derive(Debug, Default)]
struct RawRecord {
    accession: Option<String>,
    features: Vec<RawFeature>,
}

/// Parser for NCBI feature tables.
pub struct FeatureTableParser;

impl FeatureTableParser {
    /// Parses feature table text into exon, intron, CDS and UTR intervals.
    ///
    /// # Errors
    /// Returns `ParseError` if the text holds no feature records or a location
    /// cannot be read.
    pub fn parse(text: &str) -> Result<FeatureTableParse, ParseError> {
        let records = read_records(text)?;
        if records.is_empty() {
            return Err(ParseError::new("feature table contains no records"));
        }
        if records.len() > 1 {
            let accessions: Vec<&str> = records
                .iter()
                .map(|record| record.accession.as_deref().unwrap_or("?"))
                .collect();
            return Ok(FeatureTableParse::Ambiguous {
                reason: format!(
                    "feature table holds {} records ({})",
                    records.len(),
                    accessions.join(", ")
                ),
            });
        }
        let Some(record) = records.into_iter().next() else {
            return Err(ParseError::new("feature table contains no records"));
        };
        Ok(build_table(record))
    }
}

fn read_records(text: &str) -> Result<Vec<RawRecord>, ParseError> {
    let mut records: Vec<RawRecord> = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix(">Feature") {
            records.push(RawRecord {
                accession: parse_header(header),
                features: Vec::new(),
            });
            continue;
        }

        let columns: Vec<&str> = line.split('\t').collect();
        let first = columns.first().map_or("", |column| column.trim());
        if first.is_empty() {
            // Qualifier line.
            continue;
        }

        if records.is_empty() {
            records.push(RawRecord::default());
        }
        let Some(record) = records.last_mut() else {
            continue;
        };

        let second = columns.get(1).map_or("", |column| column.trim());
        let key = columns.get(2).map_or("", |column| column.trim());
        let Some(span) = parse_span(first, second, line_no)? else {
            continue;
        };

        if key.is_empty() {
            match record.features.last_mut() {
                Some(feature) => feature.spans.push(span),
                None => {
                    return Err(ParseError::new(format!(
                        "line {line_no}: location continues a feature that was never opened"
                    )));
                }
            }
        } else {
            record.features.push(RawFeature {
                key: key.to_string(),
                spans: vec![span],
            });
        }
    }

    Ok(records)
}

fn parse_header(header: &str) -> Option<String> {
    let token = header.split_whitespace().next()?;
    let accession = token
        .split('|')
        .filter(|part| !part.is_empty())
        .find(|part| !matches!(*part, "ref" | "gb" | "emb" | "dbj" | "lcl"))
        .unwrap_or(token);
    Some(accession.to_string())
}

/// Reads one location pair. Between-base sites (`12^13`) yield `None`.
fn parse_span(start: &str, end: &str, line_no: usize) -> Result<Option<Span>, ParseError> {
    if start.contains('^') || end.contains('^') {
        return Ok(None);
    }
    let start = parse_position(start, line_no)?;
    let end = parse_position(end, line_no)?;
    let span = if start <= end {
        Span {
            start,
            end,
            strand: Strand::Plus,
        }
    } else {
        Span {
            start: end,
            end: start,
            strand: Strand::Minus,
        }
    };
    Ok(Some(span))
}

fn parse_position(value: &str, line_no: usize) -> Result<u64, ParseError> {
    value
        .trim_start_matches(['<', '>'])
        .parse::<u64>()
        .map_err(|_| ParseError::new(format!("line {line_no}: invalid location '{value}'")))
}

fn feature_kind(key: &str) -> Option<FeatureKind> {
    match key {
        "exon" => Some(FeatureKind::Exon),
        "CDS" => Some(FeatureKind::Cds),
        "5'UTR" | "3'UTR" => Some(FeatureKind::Utr),
        _ => None,
    }
}

fn build_table(record: RawRecord) -> FeatureTableParse {
    let mrna_models: HashSet<Vec<(u64, u64)>> = record
        .features
        .iter()
        .filter(|feature| feature.key == "mRNA")
        .map(|feature| feature.spans.iter().map(|span| (span.start, span.end)).collect())
        .collect();
    if mrna_models.len() > 1 {
        return FeatureTableParse::Ambiguous {
            reason: format!("{} competing mRNA models in one record", mrna_models.len()),
        };
    }

    let mut exons = Vec::new();
    let mut cds = Vec::new();
    let mut utrs = Vec::new();
    for feature in &record.features {
        let Some(kind) = feature_kind(&feature.key) else {
            continue;
        };
        let bucket = match kind {
            FeatureKind::Exon => &mut exons,
            FeatureKind::Cds => &mut cds,
            FeatureKind::Utr | FeatureKind::Intron => &mut utrs,
        };
        bucket.extend(feature.spans.iter().copied());
    }

    let strands: HashSet<Strand> = exons
        .iter()
        .chain(&cds)
        .chain(&utrs)
        .map(|span| span.strand)
        .collect();
    if strands.len() > 1 {
        return FeatureTableParse::Ambiguous {
            reason: "features annotated on both strands".to_string(),
        };
    }
    let strand = strands.into_iter().next().unwrap_or_default();

    let mut intervals = Vec::new();
    for (kind, spans) in [
        (FeatureKind::Exon, exons),
        (FeatureKind::Cds, cds),
        (FeatureKind::Utr, utrs),
    ] {
        match order_spans(kind, spans, strand) {
            Ok(mut ordered) => {
                if kind == FeatureKind::Exon {
                    let introns = derive_introns(&ordered, strand);
                    intervals.append(&mut ordered);
                    intervals.extend(introns);
                } else {
                    intervals.append(&mut ordered);
                }
            }
            Err(reason) => return FeatureTableParse::Ambiguous { reason },
        }
    }
    intervals.sort_by_key(|interval| (interval.start, kind_rank(interval.kind)));

    FeatureTableParse::Table(FeatureTable {
        accession: record.accession,
        intervals,
    })
}

const fn kind_rank(kind: FeatureKind) -> u8 {
    match kind {
        FeatureKind::Exon => 0,
        FeatureKind::Intron => 1,
        FeatureKind::Utr => 2,
        FeatureKind::Cds => 3,
    }
}

/// Sorts, deduplicates and numbers spans of one kind in transcription order.
fn order_spans(
    kind: FeatureKind,
    mut spans: Vec<Span>,
    strand: Strand,
) -> Result<Vec<FeatureInterval>, String> {
    spans.sort_by_key(|span| (span.start, span.end));
    spans.dedup();

    if let Some(pair) = spans.windows(2).find(|pair| pair[1].start <= pair[0].end) {
        return Err(format!(
            "overlapping {} intervals {}-{} and {}-{}",
            kind_label(kind),
            pair[0].start,
            pair[0].end,
            pair[1].start,
            pair[1].end
        ));
    }

    let count = spans.len();
    Ok(spans
        .into_iter()
        .enumerate()
        .map(|(index, span)| FeatureInterval {
            kind,
            ordinal: ordinal_for(index, count, strand),
            start: span.start,
            end: span.end,
            strand,
        })
        .collect())
}

fn derive_introns(exons: &[FeatureInterval], strand: Strand) -> Vec<FeatureInterval> {
    exons
        .windows(2)
        .filter(|pair| pair[1].start > pair[0].end + 1)
        .map(|pair| {
            // The intron takes the number of the exon transcribed just before it.
            let preceding = match strand {
                Strand::Plus => &pair[0],
                Strand::Minus => &pair[1],
            };
            FeatureInterval {
                kind: FeatureKind::Intron,
                ordinal: preceding.ordinal,
                start: pair[0].end + 1,
                end: pair[1].start - 1,
                strand,
            }
        })
        .collect()
}

fn ordinal_for(index: usize, count: usize, strand: Strand) -> u32 {
    let ordinal = match strand {
        Strand::Plus => index + 1,
        Strand::Minus => count - index,
    };
    u32::try_from(ordinal).unwrap_or(u32::MAX)
}

const fn kind_label(kind: FeatureKind) -> &'static str {
    match kind {
        FeatureKind::Exon => "exon",
        FeatureKind::Intron => "intron",
        FeatureKind::Cds => "CDS",
        FeatureKind::Utr => "UTR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRCA_LIKE: &str = ">Feature ref|NM_000001.3|
1\t500\tgene
\t\t\tgene\tTEST1
1\t500\tmRNA
\t\t\tproduct\ttest transcript
1\t100\texon
\t\t\tnumber\t1
201\t300\texon
\t\t\tnumber\t2
401\t500\texon
\t\t\tnumber\t3
<1\t49\t5'UTR
50\t450\tCDS
\t\t\tproduct\ttest protein
451\t>500\t3'UTR
";

    fn table(text: &str) -> FeatureTable {
        match FeatureTableParser::parse(text).expect("table should parse") {
            FeatureTableParse::Table(table) => table,
            FeatureTableParse::Ambiguous { reason } => panic!("unexpected ambiguity: {reason}"),
        }
    }

    #[test]
    fn reads_exons_introns_and_coding_regions() {
        let table = table(BRCA_LIKE);
        assert_eq!(table.accession.as_deref(), Some("NM_000001.3"));

        let exons = table.exons();
        assert_eq!(exons.len(), 3);
        assert_eq!((exons[1].start, exons[1].end, exons[1].ordinal), (201, 300, 2));

        let introns: Vec<_> = table.of_kind(FeatureKind::Intron).collect();
        assert_eq!(introns.len(), 2);
        assert_eq!((introns[0].start, introns[0].end, introns[0].ordinal), (101, 200, 1));
        assert_eq!((introns[1].start, introns[1].end, introns[1].ordinal), (301, 400, 2));

        assert_eq!(table.of_kind(FeatureKind::Cds).count(), 1);
        assert_eq!(table.of_kind(FeatureKind::Utr).count(), 2);
        assert!(table.intervals.windows(2).all(|pair| pair[0].start <= pair[1].start));
    }

    #[test]
    fn continuation_lines_extend_a_feature() {
        let text = ">Feature ref|NM_000002.1|
1\t100\texon
201\t300\texon
10\t100\tCDS
201\t250
";
        let table = table(text);
        let cds: Vec<_> = table.of_kind(FeatureKind::Cds).collect();
        assert_eq!(cds.len(), 2);
        assert_eq!((cds[1].start, cds[1].end), (201, 250));
    }

    #[test]
    fn reversed_locations_number_exons_from_the_three_prime_end() {
        let text = ">Feature ref|NC_TEST.1|
500\t401\texon
300\t201\texon
100\t1\texon
";
        let table = table(text);
        let exons = table.exons();
        assert!(exons.iter().all(|exon| exon.strand == Strand::Minus));
        assert_eq!(exons[0].ordinal, 3);
        assert_eq!(exons[2].ordinal, 1);
        let introns: Vec<_> = table.of_kind(FeatureKind::Intron).collect();
        assert_eq!(introns[1].ordinal, 1);
        assert_eq!(introns[0].ordinal, 2);
    }

    #[test]
    fn overlapping_exons_are_ambiguous() {
        let text = ">Feature ref|NM_000003.1|
1\t100\texon
90\t200\texon
";
        let parsed = FeatureTableParser::parse(text).unwrap();
        assert!(matches!(parsed, FeatureTableParse::Ambiguous { ref reason } if reason.contains("overlapping exon")));
    }

    #[test]
    fn several_records_are_ambiguous() {
        let text = ">Feature ref|NM_000004.1|
1\t100\texon
>Feature ref|NM_000004.2|
1\t120\texon
";
        let parsed = FeatureTableParser::parse(text).unwrap();
        assert!(matches!(parsed, FeatureTableParse::Ambiguous { .. }));
    }

    #[test]
    fn competing_mrna_models_are_ambiguous() {
        let text = ">Feature ref|NG_000005.1|
1\t100\tmRNA
201\t300
1\t100\tmRNA
401\t500
1\t100\texon
";
        let parsed = FeatureTableParser::parse(text).unwrap();
        assert!(matches!(parsed, FeatureTableParse::Ambiguous { .. }));
    }

    #[test]
    fn duplicate_exon_lines_collapse() {
        let text = ">Feature ref|NM_000006.1|
1\t100\texon
1\t100\texon
201\t300\texon
";
        assert_eq!(table(text).exons().len(), 2);
    }

    #[test]
    fn rejects_empty_and_malformed_tables() {
        assert!(FeatureTableParser::parse("").is_err());
        assert!(FeatureTableParser::parse(">Feature ref|NM_1.1|\nabc\t100\texon\n").is_err());
    }
}
