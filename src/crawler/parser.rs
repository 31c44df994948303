//! HTML parser for extracting titles, links and article text
//!
//! The crawl driver needs a page's title and outgoing links; the extraction
//! workers need its article text. Both go through [`DocumentParser`], and
//! [`HtmlDocumentParser`] answers them with CSS selectors. The default
//! selectors match the MediaWiki page layout:
//!
//! | Element | Selector |
//! |---------|----------|
//! | Title | `#firstHeading` |
//! | Links | `#bodyContent a[href]` |
//! | Article text | `#mw-content-text` |

use crate::{Result, TrawlError};
use scraper::{Html, Selector};

/// Title and raw link targets of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page title
    pub title: String,

    /// `href` values of the links in the page body, as written
    pub links: Vec<String>,
}

/// Structural document capability
pub trait DocumentParser: Send + Sync {
    /// Extracts the title and outgoing links
    ///
    /// Fails with [`TrawlError::HtmlParse`] when the document has no title element.
    fn parse_page(&self, html: &str) -> Result<ParsedPage>;

    /// Extracts the article body as plain text
    ///
    /// Fails with [`TrawlError::HtmlParse`] when the document has no body element.
    fn extract_body_text(&self, html: &str) -> Result<String>;
}

/// Selector-driven HTML document parser
#[derive(Debug, Clone)]
pub struct HtmlDocumentParser {
    title: Selector,
    links: Selector,
    body: Selector,
}

impl HtmlDocumentParser {
    /// Creates a parser from three CSS selectors
    pub fn new(title: &str, links: &str, body: &str) -> Result<Self> {
        Ok(Self {
            title: parse_selector(title)?,
            links: parse_selector(links)?,
            body: parse_selector(body)?,
        })
    }

    /// Parser for MediaWiki article pages
    pub fn wikipedia() -> Result<Self> {
        Self::new("#firstHeading", "#bodyContent a[href]", "#mw-content-text")
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| TrawlError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

impl DocumentParser for HtmlDocumentParser {
    fn parse_page(&self, html: &str) -> Result<ParsedPage> {
        let document = Html::parse_document(html);

        let title = document
            .select(&self.title)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .ok_or_else(|| TrawlError::HtmlParse("document has no title element".to_string()))?;

        let links = document
            .select(&self.links)
            .filter_map(|element| element.value().attr("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty())
            .collect();

        Ok(ParsedPage { title, links })
    }

    fn extract_body_text(&self, html: &str) -> Result<String> {
        let document = Html::parse_document(html);

        document
            .select(&self.body)
            .next()
            .map(|element| element.text().collect::<String>())
            .ok_or_else(|| TrawlError::HtmlParse("document has no body content element".to_string()))
    }
}
