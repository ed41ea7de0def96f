//! Entry fragments and label-anchored text lookup
//!
//! An entry fragment is the part of a listing page that belongs to one
//! company. Field extractors only see fragments, so they do not care which
//! locator strategy produced them.

use regex::Regex;
use scraper::ElementRef;

use crate::infrastructure::parsing_error::{ScrapeError, ScrapeResult};

/// How a fragment was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorStrategy {
    /// Container carrying a stable card marker class
    MarkerCard,
    /// Structural parent of a heading that links to a company page
    CompanyHeading,
    /// The whole document, as on a detail page
    Document,
}

/// One company's portion of a parsed page
#[derive(Debug, Clone, Copy)]
pub struct EntryFragment<'a> {
    pub element: ElementRef<'a>,
    pub strategy: LocatorStrategy,
    /// Heading the locator anchored on, if any
    pub heading: Option<ElementRef<'a>>,
}

impl<'a> EntryFragment<'a> {
    pub fn new(element: ElementRef<'a>, strategy: LocatorStrategy) -> Self {
        Self {
            element,
            strategy,
            heading: None,
        }
    }

    pub fn with_heading(mut self, heading: ElementRef<'a>) -> Self {
        self.heading = Some(heading);
        self
    }

    /// Normalised text of the whole fragment
    pub fn text(&self) -> String {
        element_text(&self.element)
    }

    /// Visible elements of the fragment in document order, the fragment itself first
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'a>> + use<'a> {
        self.element
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| !is_non_visible(el))
    }

    /// All `a[href]` elements with their href, document order
    pub fn links(&self) -> impl Iterator<Item = (ElementRef<'a>, &'a str)> + use<'a> {
        self.elements()
            .filter(|el| el.value().name() == "a")
            .filter_map(|el| el.value().attr("href").map(|href| (el, href)))
    }
}

fn is_non_visible(element: &ElementRef<'_>) -> bool {
    matches!(element.value().name(), "script" | "style" | "noscript" | "template")
}

/// Collapse every whitespace run (including NBSP and narrow NBSP) into one space
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of an element with text nodes separated and whitespace collapsed
pub fn element_text(element: &ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for node in element.descendants() {
        if let Some(text) = node.value().as_text() {
            let hidden = node
                .parent()
                .and_then(ElementRef::wrap)
                .is_some_and(|parent| is_non_visible(&parent));
            if !hidden {
                parts.push(&**text);
            }
        }
    }
    normalize_text(&parts.join(" "))
}

/// A field label compiled for case-insensitive matching
#[derive(Debug, Clone)]
pub struct LabelMatcher {
    label: String,
    pattern: Regex,
}

impl LabelMatcher {
    pub fn new(label: &str) -> ScrapeResult<Self> {
        let pattern = Regex::new(&format!("(?i){}", regex::escape(label)))
            .map_err(|e| ScrapeError::invalid_selector(label, &e.to_string()))?;
        Ok(Self {
            label: label.to_string(),
            pattern,
        })
    }

    /// Compile a list of alternate labels in priority order
    pub fn compile_all(labels: &[String]) -> ScrapeResult<Vec<Self>> {
        labels.iter().map(|label| Self::new(label)).collect()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Text following the label, with separators trimmed; `None` when the label is absent
    pub fn value_after<'t>(&self, text: &'t str) -> Option<&'t str> {
        let found = self.pattern.find(text)?;
        Some(text[found.end()..].trim_matches(|c: char| c.is_whitespace() || c == ':'))
    }
}

/// Deepest element under `root` whose text contains the label
pub fn find_label_element<'a>(root: &EntryFragment<'a>, matcher: &LabelMatcher) -> Option<ElementRef<'a>> {
    root.elements().find(|el| {
        matcher.matches(&element_text(el))
            && !el
                .children()
                .filter_map(ElementRef::wrap)
                .any(|child| !is_non_visible(&child) && matcher.matches(&element_text(&child)))
    })
}

/// Candidate value texts for a label, most specific first: the label node's
/// own remainder, that remainder joined with the next sibling element, and
/// whatever follows the label in the parent's text.
pub fn labeled_candidates(fragment: &EntryFragment<'_>, matcher: &LabelMatcher) -> Vec<String> {
    let Some(label_element) = find_label_element(fragment, matcher) else {
        return Vec::new();
    };

    let own_text = element_text(&label_element);
    let own_value = matcher.value_after(&own_text).unwrap_or_default().to_string();

    let mut candidates = vec![own_value.clone()];

    if let Some(sibling) = label_element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .map(|sibling| element_text(&sibling))
        .find(|text| !text.is_empty())
    {
        candidates.push(normalize_text(&format!("{own_value} {sibling}")));
    }

    if let Some(parent) = label_element.parent().and_then(ElementRef::wrap) {
        let parent_text = element_text(&parent);
        if let Some(value) = matcher.value_after(&parent_text) {
            candidates.push(value.to_string());
        }
    }

    candidates.retain(|c| !c.is_empty());
    candidates.dedup();
    candidates
}

/// First candidate of the first matching label that `parse` accepts
pub fn find_labeled<T>(
    fragment: &EntryFragment<'_>,
    matchers: &[LabelMatcher],
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    matchers.iter().find_map(|matcher| {
        labeled_candidates(fragment, matcher)
            .iter()
            .find_map(|candidate| parse(candidate))
    })
}

/// Raw text accompanying the first matching label
pub fn find_labeled_value(fragment: &EntryFragment<'_>, matchers: &[LabelMatcher]) -> Option<String> {
    find_labeled(fragment, matchers, |text| Some(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn root_fragment(html: &Html) -> EntryFragment<'_> {
        EntryFragment::new(html.root_element(), LocatorStrategy::Document)
    }

    fn matchers(labels: &[&str]) -> Vec<LabelMatcher> {
        labels.iter().map(|l| LabelMatcher::new(l).unwrap()).collect()
    }

    #[test]
    fn test_normalize_text_collapses_nbsp() {
        assert_eq!(normalize_text("13\u{a0}170\u{202f}000  företag\n"), "13 170 000 företag");
    }

    #[test]
    fn test_value_in_same_node() {
        let html = Html::parse_fragment("<div><span>Org.nr 556469-6291</span></div>");
        let value = find_labeled_value(&root_fragment(&html), &matchers(&["Org.nr"]));
        assert_eq!(value.as_deref(), Some("556469-6291"));
    }

    #[test]
    fn test_value_in_next_sibling() {
        let html = Html::parse_fragment(
            "<dl><dt>Anställda</dt><dd>45</dd><dt>Omsättning</dt><dd>12 000</dd></dl>",
        );
        let value = find_labeled_value(&root_fragment(&html), &matchers(&["Anställda"]));
        assert_eq!(value.as_deref(), Some("45"));
    }

    #[test]
    fn test_value_in_parent_text() {
        let html = Html::parse_fragment("<p><b>Anställda:</b> 12</p>");
        let value = find_labeled_value(&root_fragment(&html), &matchers(&["Anställda"]));
        assert_eq!(value.as_deref(), Some("12"));
    }

    #[test]
    fn test_candidates_join_label_remainder_with_sibling() {
        let html = Html::parse_fragment("<div><span>Omsättning 2023</span><span>1 234 tkr</span></div>");
        let fragment = root_fragment(&html);
        let candidates = labeled_candidates(&fragment, &LabelMatcher::new("Omsättning").unwrap());
        assert_eq!(candidates[0], "2023");
        assert_eq!(candidates[1], "2023 1 234 tkr");
    }

    #[test]
    fn test_alternate_label_is_used_when_primary_missing() {
        let html = Html::parse_fragment("<div><span>Antal anställda</span><span>7</span></div>");
        let value = find_labeled_value(
            &root_fragment(&html),
            &matchers(&["Anställda mer", "Antal anställda"]),
        );
        assert_eq!(value.as_deref(), Some("7"));
    }

    #[test]
    fn test_script_text_is_ignored() {
        let html = Html::parse_fragment(
            r#"<div><script>var x = "Org.nr 111111-1111";</script><span>Org.nr 556469-6291</span></div>"#,
        );
        let value = find_labeled_value(&root_fragment(&html), &matchers(&["Org.nr"]));
        assert_eq!(value.as_deref(), Some("556469-6291"));
    }

    #[test]
    fn test_missing_label_is_none() {
        let html = Html::parse_fragment("<div><span>Omsättning 2023 1 000</span></div>");
        assert!(find_labeled_value(&root_fragment(&html), &matchers(&["Anställda"])).is_none());
    }
}
