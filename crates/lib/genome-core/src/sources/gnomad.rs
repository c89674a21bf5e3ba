use std::sync::Arc;

use genome_model::schema::GNOMAD_VARIANT_QUERY;
use genome_model::{AlleleCounts, GenomeBuild, PopulationFrequency, VariantCoordinate};
use serde_json::{Value, json};

use super::SourceError;
use crate::fetch::{Fetcher, HttpRequest, Source};
use crate::parsers::ParseError;

/// gnomAD GraphQL client.
#[derive(Clone)]
pub struct GnomadClient {
    fetcher: Arc<Fetcher>,
    url: String,
}

impl GnomadClient {
    pub fn new(fetcher: Arc<Fetcher>, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }

    /// Allele counts for one variant in the dataset matching `build`.
    ///
    /// # Errors
    /// Returns `SourceError::NotFound` when gnomAD has no such variant and
    /// `SourceError::Parse` for other GraphQL errors.
    pub async fn population_frequency(
        &self,
        variant: &VariantCoordinate,
        build: GenomeBuild,
    ) -> Result<PopulationFrequency, SourceError> {
        let variant_id = variant.gnomad_id();
        let dataset = build.gnomad_dataset();
        let body = json!({
            "query": GNOMAD_VARIANT_QUERY,
            "variables": { "variantId": variant_id, "datasetId": dataset },
        });
        let request = HttpRequest::post_json(Source::Gnomad, "gnomad_variant", &self.url, body);
        let doc: Value = self.fetcher.fetch(&request).await?.json()?;

        let messages = graphql_errors(&doc);
        let variant_doc = doc
            .get("data")
            .and_then(|data| data.get("variant"))
            .filter(|variant| !variant.is_null());

        let Some(variant_doc) = variant_doc else {
            if messages.is_empty() || messages.iter().any(|message| is_not_found(message)) {
                return Err(SourceError::NotFound(format!(
                    "gnomAD variant {variant_id} in {dataset}"
                )));
            }
            return Err(ParseError::new(format!("gnomAD: {}", messages.join("; "))).into());
        };

        Ok(PopulationFrequency {
            variant_id,
            dataset: dataset.to_string(),
            genome: allele_counts(variant_doc.get("genome")),
            exome: allele_counts(variant_doc.get("exome")),
        })
    }
}

fn graphql_errors(doc: &Value) -> Vec<String> {
    doc.get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|error| error.get("message").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn is_not_found(message: &str) -> bool {
    message.to_ascii_lowercase().contains("not found")
}

fn allele_counts(value: Option<&Value>) -> Option<AlleleCounts> {
    let value = value.filter(|value| value.is_object())?;
    Some(AlleleCounts {
        ac: value.get("ac").and_then(Value::as_u64),
        an: value.get("an").and_then(Value::as_u64),
        af: value.get("af").and_then(Value::as_f64),
    })
}

#[cfg(test)]
mod tests {
    use genome_model::SampleSet;

    use super::*;
    use crate::testing::{RouteTransport, fetcher};

    fn client(transport: Arc<RouteTransport>) -> GnomadClient {
        GnomadClient::new(fetcher(transport), "https://gnomad.test/api")
    }

    fn coordinate(value: &str) -> VariantCoordinate {
        value.parse().unwrap()
    }

    #[tokio::test]
    async fn posts_query_and_prefers_genome_counts() {
        let transport = RouteTransport::new();
        transport.on(
            "gnomad_variant",
            r#"{"data": {"variant": {
                "exome": {"ac": 10, "an": 250000, "af": 0.00004},
                "genome": {"ac": 3, "an": 150000, "af": 0.00002}
            }}}"#,
        );
        let frequency = client(transport.clone())
            .population_frequency(&coordinate("chr1-55516888-G-GA"), GenomeBuild::Grch38)
            .await
            .unwrap();
        assert_eq!(frequency.variant_id, "1-55516888-G-GA");
        assert_eq!(frequency.dataset, "gnomad_r3");
        let (set, counts) = frequency.preferred().unwrap();
        assert_eq!(set, SampleSet::Genome);
        assert_eq!(counts.ac, Some(3));

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["variables"]["variantId"], "1-55516888-G-GA");
        assert_eq!(body["variables"]["datasetId"], "gnomad_r3");
    }

    #[tokio::test]
    async fn exome_only_variant_falls_back() {
        let transport = RouteTransport::new();
        transport.on(
            "gnomad_variant",
            r#"{"data": {"variant": {"exome": {"ac": 1, "an": 2, "af": 0.5}, "genome": null}}}"#,
        );
        let frequency = client(transport)
            .population_frequency(&coordinate("17-1000-A-T"), GenomeBuild::Grch37)
            .await
            .unwrap();
        assert_eq!(frequency.dataset, "gnomad_r2_1");
        assert_eq!(frequency.preferred().map(|(set, _)| set), Some(SampleSet::Exome));
    }

    #[tokio::test]
    async fn unknown_variant_is_not_found() {
        let transport = RouteTransport::new();
        transport.on(
            "gnomad_variant",
            r#"{"data": {"variant": null}, "errors": [{"message": "Variant not found"}]}"#,
        );
        let err = client(transport)
            .population_frequency(&coordinate("1-1-A-C"), GenomeBuild::Grch38)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn other_graphql_errors_are_parse_errors() {
        let transport = RouteTransport::new();
        transport.on(
            "gnomad_variant",
            r#"{"errors": [{"message": "Invalid dataset"}]}"#,
        );
        let err = client(transport)
            .population_frequency(&coordinate("1-1-A-C"), GenomeBuild::Grch38)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
