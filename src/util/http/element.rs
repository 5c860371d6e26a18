use anyhow::{anyhow, Result};
use scraper::{Html, Selector};

/// The information needed to extract text from one HTML element of a fetched page.
#[derive(Debug, Clone, Copy)]
pub struct GetOneElementText<'a> {
    /// The URL the document was fetched from, used in messages only.
    pub url: &'a str,
    /// The CSS selector that locates the element.
    pub selector: &'a str,
    pub document: &'a Html,
}

/// Returns the trimmed text of the first element matching `target.selector`.
///
/// * `Ok(None)` - no element matched, or the matched element has no text.
/// * `Err` - the selector itself cannot be parsed.
pub fn get_one_element(target: GetOneElementText<'_>) -> Result<Option<String>> {
    let selector = Selector::parse(target.selector)
        .map_err(|why| {
            anyhow!(
                "Failed to Selector::parse({}) for {} because: {:?}",
                target.selector,
                target.url,
                why
            )
        })?;

    Ok(target
        .document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_one_element() {
        let document = Html::parse_document(
            r#"<html><body><div class="a"> <span>12</span>,5 </div><div class="a">99</div></body></html>"#,
        );
        let text = get_one_element(GetOneElementText {
            url: "test",
            selector: "div.a",
            document: &document,
        })
        .unwrap();
        assert_eq!(text, Some("12,5".to_string()));
    }

    #[test]
    fn test_get_one_element_empty_or_missing() {
        let document = Html::parse_document(r#"<div class="a">   </div>"#);
        let empty = get_one_element(GetOneElementText {
            url: "test",
            selector: "div.a",
            document: &document,
        })
        .unwrap();
        assert_eq!(empty, None);

        let missing = get_one_element(GetOneElementText {
            url: "test",
            selector: "div.b",
            document: &document,
        })
        .unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_get_one_element_bad_selector() {
        let document = Html::parse_document("<div></div>");
        assert!(get_one_element(GetOneElementText {
            url: "test",
            selector: "div[",
            document: &document,
        })
        .is_err());
    }
}
