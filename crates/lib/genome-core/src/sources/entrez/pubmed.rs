use genome_model::schema::DB_PUBMED;
use genome_model::{ArticleAbstract, ArticleSummary};
use serde_json::Value;

use super::{EntrezClient, EntrezDatabase};
use crate::parsers::fields::{as_list, text_at};
use crate::parsers::{ParseError, PubmedXmlParser};
use crate::sources::SourceError;

pub struct Pubmed;

pub type PubmedClient = EntrezClient<Pubmed>;

impl EntrezDatabase for Pubmed {
    const NAME: &'static str = DB_PUBMED;

    type Summary = ArticleSummary;

    fn parse_summary(uid: &str, doc: &Value) -> Result<ArticleSummary, ParseError> {
        let authors = as_list(doc.get("authors").unwrap_or(&Value::Null))
            .into_iter()
            .filter_map(|author| text_at(author, &["name"]))
            .collect();
        Ok(ArticleSummary {
            pmid: uid.to_string(),
            title: text_at(doc, &["title"]),
            journal: text_at(doc, &["source"]),
            pub_date: text_at(doc, &["pubdate"]),
            authors,
        })
    }
}

impl EntrezClient<Pubmed> {
    /// Titles and abstracts for `pmids`, fetched as one efetch XML batch.
    ///
    /// # Errors
    /// Returns `SourceError::Fetch` on transport failure and `SourceError::Parse`
    /// when the XML cannot be read.
    pub async fn abstracts(&self, pmids: &[String]) -> Result<Vec<ArticleAbstract>, SourceError> {
        if pmids.is_empty() {
            return Ok(Vec::new());
        }
        let xml = self.fetch_detail(&pmids.join(","), "abstract", "xml").await?;
        Ok(PubmedXmlParser::parse_async(xml).await?)
    }
}
