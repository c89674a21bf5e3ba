use genome_model::ArticleAbstract;
use roxmltree::{Document, Node, ParsingOptions};

use super::ParseError;

/// Parser for PubMed `efetch` XML (`rettype=abstract`, `retmode=xml`).
pub struct PubmedXmlParser;

impl PubmedXmlParser {
    /// Parses a `PubmedArticleSet` into one record per article, in document order.
    ///
    /// Articles without a PMID are skipped. Structured abstracts keep their
    /// section labels as `Label: text` lines.
    ///
    /// # Errors
    /// Returns `ParseError` if the XML is invalid or is not a `PubmedArticleSet`.
    pub fn parse(xml: &str) -> Result<Vec<ArticleAbstract>, ParseError> {
        // efetch responses carry a DOCTYPE line.
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(xml, options)?;
        let root = doc.root_element();
        if !root.has_tag_name("PubmedArticleSet") {
            return Err(ParseError::new(format!(
                "expected PubmedArticleSet, found {}",
                root.tag_name().name()
            )));
        }

        let articles = root
            .children()
            .filter(|node| node.has_tag_name("PubmedArticle"))
            .filter_map(parse_article)
            .collect();
        Ok(articles)
    }

    /// Parses on the blocking pool; large batches run to megabytes.
    ///
    /// # Errors
    /// Returns `ParseError` if the XML cannot be parsed or the task fails.
    pub async fn parse_async(xml: String) -> Result<Vec<ArticleAbstract>, ParseError> {
        tokio::task::spawn_blocking(move || Self::parse(&xml)).await?
    }
}

fn parse_article(node: Node<'_, '_>) -> Option<ArticleAbstract> {
    let citation = child(node, "MedlineCitation")?;
    let pmid = optional_text(child(citation, "PMID")?)?;
    let article = child(citation, "Article");

    let title = article
        .and_then(|article| child(article, "ArticleTitle"))
        .and_then(optional_text);
    let journal = article.and_then(|article| child(article, "Journal"));
    let journal_title = journal
        .and_then(|journal| child(journal, "Title"))
        .and_then(optional_text);
    let pub_date = journal
        .and_then(|journal| child(journal, "JournalIssue"))
        .and_then(|issue| child(issue, "PubDate"))
        .and_then(render_pub_date);
    let abstract_text = article
        .and_then(|article| child(article, "Abstract"))
        .and_then(render_abstract);

    Some(ArticleAbstract {
        pmid,
        title,
        journal: journal_title,
        pub_date,
        abstract_text,
    })
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(name))
}

fn render_pub_date(node: Node<'_, '_>) -> Option<String> {
    let year = child(node, "Year").and_then(optional_text);
    let month = child(node, "Month").and_then(optional_text);
    match (year, month) {
        (Some(year), Some(month)) => Some(format!("{year} {month}")),
        (Some(year), None) => Some(year),
        // Some records only carry a free-form date.
        _ => child(node, "MedlineDate").and_then(optional_text),
    }
}

fn render_abstract(node: Node<'_, '_>) -> Option<String> {
    let sections: Vec<String> = node
        .children()
        .filter(|child| child.has_tag_name("AbstractText"))
        .filter_map(|section| {
            let text = optional_text(section)?;
            Some(match section.attribute("Label") {
                Some(label) if !label.trim().is_empty() => format!("{}: {text}", label.trim()),
                _ => text,
            })
        })
        .collect();
    if sections.is_empty() {
        None
    } else {
        Some(sections.join("\n"))
    }
}

/// Text content of `node` and its inline markup, whitespace collapsed.
fn optional_text(node: Node<'_, '_>) -> Option<String> {
    let raw: String = node
        .descendants()
        .filter(Node::is_text)
        .filter_map(|text| text.text())
        .collect();
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() { None } else { Some(text) }
}
