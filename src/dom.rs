//! Queryable landing-page documents.
//!
//! [`Page`] pairs the markup text with its parsed tree and routes every CSS
//! selector evaluation through the request's [`CallBudget`]. Strategies and
//! heuristics never touch `dom_query` selection directly on the document; the
//! free functions below only read from selections they already hold.

use dom_query::NodeRef;
pub use dom_query::{Document, Selection};

use crate::budget::CallBudget;
use crate::error::Result;

/// Markup plus tree, with budgeted queries.
///
/// A page built from empty input or a PDF payload has a null tree: it is
/// backed by an empty document so every query yields no matches.
pub struct Page<'b> {
    markup: String,
    tree: Document,
    has_tree: bool,
    budget: &'b CallBudget,
}

impl<'b> Page<'b> {
    /// Parse markup into a page charged against `budget`.
    #[must_use]
    pub fn parse(markup: impl Into<String>, budget: &'b CallBudget) -> Self {
        let markup = markup.into();
        if markup.trim().is_empty() {
            return Self::null(budget);
        }
        let tree = Document::from(markup.as_str());
        Self {
            markup,
            tree,
            has_tree: true,
            budget,
        }
    }

    /// A page with no usable tree.
    #[must_use]
    pub fn null(budget: &'b CallBudget) -> Self {
        Self {
            markup: String::new(),
            tree: Document::from(""),
            has_tree: false,
            budget,
        }
    }

    /// Independent copy of the current tree sharing the same budget.
    ///
    /// Phases that strip sections work on a fork so they never see each
    /// other's mutations.
    #[must_use]
    pub fn fork(&self) -> Page<'b> {
        if !self.has_tree {
            return Self::null(self.budget);
        }
        Self {
            markup: self.markup.clone(),
            tree: Document::from(self.tree.html().to_string()),
            has_tree: true,
            budget: self.budget,
        }
    }

    /// Markup as originally supplied, scripts included.
    #[must_use]
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Serialization of the tree as it is now (after any stripping).
    #[must_use]
    pub fn html(&self) -> String {
        if self.has_tree {
            self.tree.html().to_string()
        } else {
            String::new()
        }
    }

    /// False for pages built from empty or non-HTML input.
    #[must_use]
    pub fn has_tree(&self) -> bool {
        self.has_tree
    }

    /// Budget this page charges.
    #[must_use]
    pub fn budget(&self) -> &'b CallBudget {
        self.budget
    }

    /// All elements matching `css` in document order.
    #[track_caller]
    pub fn select(&self, css: &str) -> Result<Selection<'_>> {
        self.budget.charge()?;
        Ok(self.tree.select(css))
    }

    /// First element matching `css`.
    #[track_caller]
    pub fn select_first(&self, css: &str) -> Result<Option<Selection<'_>>> {
        self.budget.charge()?;
        let found = self.tree.select_single(css);
        Ok(found.exists().then_some(found))
    }

    /// True when at least one element matches `css`.
    #[track_caller]
    pub fn exists(&self, css: &str) -> Result<bool> {
        self.budget.charge()?;
        Ok(self.tree.select_single(css).exists())
    }

    /// Descendants of `scope` matching `css`.
    #[track_caller]
    pub fn select_in<'a>(&self, scope: &Selection<'a>, css: &str) -> Result<Selection<'a>> {
        self.budget.charge()?;
        Ok(scope.select(css))
    }

    /// First descendant of `scope` matching `css`.
    #[track_caller]
    pub fn first_in<'a>(&self, scope: &Selection<'a>, css: &str) -> Result<Option<Selection<'a>>> {
        self.budget.charge()?;
        let found = scope.select_single(css);
        Ok(found.exists().then_some(found))
    }

    /// Remove every element matching `css`. Returns how many were removed.
    #[track_caller]
    pub fn strip(&self, css: &str) -> Result<usize> {
        let found = self.select(css)?;
        let count = found.length();
        if count > 0 {
            found.remove();
        }
        Ok(count)
    }

    /// Content of the first `<meta>` whose `name` or `property` equals `key`.
    #[track_caller]
    pub fn meta_content(&self, key: &str) -> Result<Option<String>> {
        let css = format!(r#"meta[name="{key}"], meta[property="{key}"]"#);
        Ok(self
            .select(&css)?
            .iter()
            .find_map(|meta| attr(&meta, "content")))
    }
}

impl std::fmt::Debug for Page<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("markup_len", &self.markup.len())
            .field("has_tree", &self.has_tree)
            .finish_non_exhaustive()
    }
}

/// Attribute value of the first node in the selection.
#[inline]
#[must_use]
pub fn attr(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Lowercase tag name of the first node in the selection.
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(NodeRef::node_name)
        .map(|t| t.to_ascii_lowercase())
}

/// Text of the selection with surrounding whitespace removed.
#[inline]
#[must_use]
pub fn trimmed_text(sel: &Selection) -> String {
    sel.text().trim().to_string()
}

/// All attribute values of a node.
#[must_use]
pub fn attribute_values(node: &NodeRef) -> Vec<String> {
    node.attrs().iter().map(|a| a.value.to_string()).collect()
}

/// True for `h1`..`h6`.
#[must_use]
pub fn is_heading(node: &NodeRef) -> bool {
    node.node_name().is_some_and(|name| {
        let name = name.to_ascii_lowercase();
        name.len() == 2 && name.starts_with('h') && matches!(name.as_bytes()[1], b'1'..=b'6')
    })
}

/// Element children of a node, skipping text and comments.
#[must_use]
pub fn element_children<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    node.children().into_iter().filter(NodeRef::is_element).collect()
}

/// Following element siblings of the selection's first node.
#[must_use]
pub fn following_element_siblings<'a>(sel: &Selection<'a>) -> Vec<NodeRef<'a>> {
    let mut found = Vec::new();
    let mut next = sel.nodes().first().and_then(NodeRef::next_sibling);
    while let Some(node) = next {
        if node.is_element() {
            found.push(node);
        }
        next = node.next_sibling();
    }
    found
}

/// Drop every node that is an ancestor of another node in the list.
///
/// Leaves the innermost matches, in their original order.
#[must_use]
pub fn innermost<'a>(nodes: Vec<NodeRef<'a>>) -> Vec<NodeRef<'a>> {
    let ids: Vec<_> = nodes.iter().map(|n| n.id).collect();
    nodes
        .into_iter()
        .filter(|node| {
            !node
                .descendants()
                .into_iter()
                .any(|d| d.id != node.id && ids.contains(&d.id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetLimits;
    use crate::error::Error;

    fn budget() -> CallBudget {
        CallBudget::with_limits(BudgetLimits::default())
    }

    #[test]
    fn queries_are_charged() {
        let budget = budget();
        let page = Page::parse("<div class='a'><p>x</p><p>y</p></div>", &budget);

        let div = page.select_first("div.a").ok().flatten();
        assert!(div.is_some());
        let paragraphs = div.map(|d| page.select_in(&d, "p").map(|s| s.length()));
        assert!(matches!(paragraphs, Some(Ok(2))));
        assert_eq!(budget.calls(), 2);
    }

    #[test]
    fn budget_refusal_surfaces_from_queries() {
        let budget = CallBudget::with_limits(BudgetLimits { warn_at: 1, limit: 1 });
        let page = Page::parse("<p>x</p>", &budget);
        assert!(page.exists("p").is_ok());
        assert!(matches!(
            page.exists("p"),
            Err(Error::SelectorBudgetExceeded { calls: 2, .. })
        ));
    }

    #[test]
    fn null_page_matches_nothing() {
        let budget = budget();
        let page = Page::parse("   ", &budget);
        assert!(!page.has_tree());
        assert!(matches!(page.exists("meta"), Ok(false)));
        assert!(matches!(page.meta_content("citation_author"), Ok(None)));
        assert_eq!(page.html(), "");
    }

    #[test]
    fn fork_is_independent() {
        let budget = budget();
        let page = Page::parse("<div><script>x()</script><a href='/a'>A</a></div>", &budget);
        let copy = page.fork();
        assert!(matches!(copy.strip("script"), Ok(1)));

        assert!(matches!(copy.exists("script"), Ok(false)));
        assert!(matches!(page.exists("script"), Ok(true)));
        assert!(page.markup().contains("<script>"));
    }

    #[test]
    fn meta_content_matches_name_or_property() {
        let budget = budget();
        let page = Page::parse(
            r#"<meta property="og:url" content="https://brill.com/view/x">
               <meta name="citation_title" content="A title">"#,
            &budget,
        );
        assert_eq!(
            page.meta_content("og:url").ok().flatten().as_deref(),
            Some("https://brill.com/view/x")
        );
        assert_eq!(
            page.meta_content("citation_title").ok().flatten().as_deref(),
            Some("A title")
        );
    }

    #[test]
    fn heading_detection() {
        let doc = Document::from("<h3>Abstract</h3><header>x</header>");
        let h3 = doc.select("h3");
        let header = doc.select("header");
        assert!(h3.nodes().first().is_some_and(is_heading));
        assert!(!header.nodes().first().is_some_and(is_heading));
    }

    #[test]
    fn innermost_drops_ancestors() {
        let doc = Document::from(
            r#"<div class="authors" id="outer"><div class="author" id="inner">x</div></div>"#,
        );
        let nodes: Vec<_> = doc.select("div").nodes().to_vec();
        let kept = innermost(nodes);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].attr("id").map(|s| s.to_string()).as_deref(), Some("inner"));
    }

    #[test]
    fn following_siblings_skip_text() {
        let doc = Document::from("<div><br>text<sup>1</sup>Org<sup>2</sup>Other</div>");
        let br = doc.select("br");
        let sups = following_element_siblings(&br);
        assert_eq!(sups.len(), 2);
        assert!(sups.iter().all(|n| n.node_name().is_some_and(|t| &*t == "sup")));
    }
}
