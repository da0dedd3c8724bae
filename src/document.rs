use scraper::{ElementRef, Html, Selector};

use crate::{Error, Result};

/// A parsed HTML page and the handful of queries extraction needs.
///
/// Everything in `parse` goes through this, so it can be fed fixture markup
/// in tests without touching the network.
pub struct Page {
    html: Html,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Every element matching `selector`, in document order.
    pub fn select_all<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html.select(selector)
    }

    pub fn first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    /// First `tag` element whose trimmed text is exactly `title`.
    pub fn heading(&self, tag: &Selector, title: &str) -> Option<ElementRef<'_>> {
        self.html
            .select(tag)
            .find(|el| el.text().collect::<String>().trim() == title)
    }

    /// First element matching `selector` that comes after `anchor` in document order.
    pub fn next_after<'a>(&'a self, anchor: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
        self.html
            .tree
            .root()
            .descendants()
            .skip_while(|node| *node != *anchor)
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| selector.matches(el))
    }
}

#[inline]
pub(crate) fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::InvalidSelector(sel_str.into()))
}

/// Text fragments of an element, trimmed, empties dropped.
pub(crate) fn fragments<'a>(el: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    el.text().map(str::trim).filter(|t| !t.is_empty())
}

/// Flattened text of an element, trimmed.
pub(crate) fn flat_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <html><body>
            <table class="vitals-table"><tr><th>Decoy</th><td>x</td></tr></table>
            <h2>Training</h2>
            <p>Intro <b>text</b></p>
            <div><table class="vitals-table"><tr><th>Catch rate</th><td>45</td></tr></table></div>
            <h2>Breeding</h2>
        </body></html>
    "#;

    #[test]
    fn heading_requires_exact_text() {
        let page = Page::parse(FIXTURE);
        let h2 = create_selector("h2").unwrap();
        assert!(page.heading(&h2, "Training").is_some());
        assert!(page.heading(&h2, "Train").is_none());
    }

    #[test]
    fn next_after_skips_earlier_elements() {
        let page = Page::parse(FIXTURE);
        let h2 = create_selector("h2").unwrap();
        let table = create_selector("table.vitals-table").unwrap();

        let heading = page.heading(&h2, "Training").unwrap();
        let found = page.next_after(heading, &table).unwrap();
        assert!(flat_text(found).contains("Catch rate"));

        let last = page.heading(&h2, "Breeding").unwrap();
        assert!(page.next_after(last, &table).is_none());
    }

    #[test]
    fn invalid_selector_is_an_error() {
        assert!(matches!(create_selector("a[["), Err(Error::InvalidSelector(_))));
    }
}
