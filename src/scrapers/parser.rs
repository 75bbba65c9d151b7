//! HTML extraction for listing and detail pages.
//!
//! Pure functions of page content; malformed markup degrades to zero
//! records rather than an error. An empty listing page is the crawl
//! termination signal, not a failure.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::models::{PetitionDetail, PetitionListing};
use crate::utils::text::{after_colon, normalize_ws};

/// Extract all petition records from one listing page, in page order.
pub fn parse_listing(html: &str, base: &Url) -> Vec<PetitionListing> {
    let document = Html::parse_document(html);
    let items = match Selector::parse("div.pet_item") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&items)
        .filter_map(|item| parse_listing_item(item, base))
        .collect()
}

fn parse_listing_item(item: ElementRef<'_>, base: &Url) -> Option<PetitionListing> {
    let anchor = select_first(item, "a.pet_link")?;
    let href = anchor.value().attr("href")?;
    let link = match base.join(href) {
        Ok(url) => url.to_string(),
        Err(err) => {
            debug!("skipping listing item with unresolvable href {href:?}: {err}");
            return None;
        }
    };

    let number = select_text(item, "span.pet_number")?;
    if number.is_empty() {
        debug!("skipping listing item without a petition number");
        return None;
    }

    let tag = select_text(item, "span.pet_tag")
        .unwrap_or_default()
        .replace('#', "")
        .trim()
        .to_string();
    let title = element_text(anchor);
    let vote_count = select_text(item, "div.pet_counts").unwrap_or_default();
    let status = select_text(item, "div.pet_status").unwrap_or_default();

    // Date labels carry the value after a colon, e.g. "Дата оприлюднення: ...".
    // The plain selector also matches the answered variant, so the first
    // match is taken as the publication date.
    let published_at = select_text(item, "div.pet_date")
        .and_then(|text| after_colon(&text))
        .unwrap_or_default();
    let answered_at = select_text(item, "div.pet_date.ans").and_then(|text| after_colon(&text));
    let countdown = select_text(item, "div.pet_timer").filter(|text| !text.is_empty());

    Some(PetitionListing {
        number,
        tag,
        title,
        status,
        vote_count,
        link,
        published_at,
        answered_at,
        countdown,
    })
}

/// Extract detail-page fields.
///
/// The creator is taken from the first `div.pet_date` element on the page,
/// a positional best-effort heuristic inherited from the site layout; an
/// unrecognized layout yields empty fields, which callers treat as
/// "enrichment unavailable".
pub fn parse_detail(html: &str) -> PetitionDetail {
    let document = Html::parse_document(html);

    let creator = Selector::parse("div.pet_date")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .map(element_text)
        .and_then(|text| after_colon(&text))
        .unwrap_or_default();

    let body_text = Selector::parse("div.article")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .map(element_text)
        .unwrap_or_default();

    PetitionDetail { creator, body_text }
}

fn select_first<'a>(item: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    item.select(&selector).next()
}

/// Whitespace-normalized text content of the first match, if any.
fn select_text(item: ElementRef<'_>, selector: &str) -> Option<String> {
    select_first(item, selector).map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_ws(&element.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://petition.example.test").unwrap()
    }

    const LISTING_ITEM: &str = r#"
        <div class="pet_item">
          <span class="pet_tag"> #ecology </span>
          <a class="pet_link" href="/petition/223344">
            Plant
            more

            trees
          </a>
          <span class="pet_number">22/223344-еп</span>
          <div class="pet_counts"> 25 001 </div>
          <div class="pet_status">Collecting signatures</div>
          <div class="pet_date">Published: 01 January 2024</div>
          <div class="pet_timer"> 42 days left </div>
        </div>"#;

    #[test]
    fn test_parse_listing_item_fields() {
        let html = format!("<html><body>{LISTING_ITEM}</body></html>");
        let records = parse_listing(&html, &base());
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.number, "22/223344-еп");
        assert_eq!(record.tag, "ecology");
        assert_eq!(record.title, "Plant more trees");
        assert_eq!(record.vote_count, "25 001");
        assert_eq!(record.status, "Collecting signatures");
        assert_eq!(record.link, "https://petition.example.test/petition/223344");
        assert_eq!(record.published_at, "01 January 2024");
        assert_eq!(record.answered_at, None);
        assert_eq!(record.countdown.as_deref(), Some("42 days left"));
    }

    #[test]
    fn test_parse_listing_answered_variant() {
        let html = r#"
            <div class="pet_item">
              <a class="pet_link" href="https://petition.example.test/petition/1">Answered one</a>
              <span class="pet_number">22/1</span>
              <div class="pet_date">Published: 01 January 2024</div>
              <div class="pet_date ans">Answered: 01 March 2024</div>
            </div>"#;
        let records = parse_listing(html, &base());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].published_at, "01 January 2024");
        assert_eq!(records[0].answered_at.as_deref(), Some("01 March 2024"));
    }

    #[test]
    fn test_parse_listing_preserves_page_order() {
        let html = r#"
            <div class="pet_item">
              <a class="pet_link" href="/p/1">First</a><span class="pet_number">22/1</span>
            </div>
            <div class="pet_item">
              <a class="pet_link" href="/p/2">Second</a><span class="pet_number">22/2</span>
            </div>"#;
        let records = parse_listing(html, &base());
        let numbers: Vec<&str> = records.iter().map(|r| r.number.as_str()).collect();
        assert_eq!(numbers, vec!["22/1", "22/2"]);
    }

    #[test]
    fn test_parse_listing_skips_items_without_identity() {
        let html = r#"
            <div class="pet_item"><a class="pet_link" href="/p/1">No number</a></div>
            <div class="pet_item"><span class="pet_number">22/2</span></div>
            <div class="pet_item">
              <a class="pet_link" href="/p/3">Kept</a><span class="pet_number">22/3</span>
            </div>"#;
        let records = parse_listing(html, &base());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].number, "22/3");
    }

    #[test]
    fn test_parse_listing_empty_page() {
        assert!(parse_listing("<html><body>No results</body></html>", &base()).is_empty());
        assert!(parse_listing("", &base()).is_empty());
    }

    #[test]
    fn test_parse_detail() {
        let html = r#"
            <html><body>
              <div class="pet_date">Initiated by: Taras Shevchenko</div>
              <div class="pet_date">Published: 01 January 2024</div>
              <div class="article">
                Full petition
                text over
                several lines.
              </div>
            </body></html>"#;
        let detail = parse_detail(html);
        assert_eq!(detail.creator, "Taras Shevchenko");
        assert_eq!(detail.body_text, "Full petition text over several lines.");
        assert!(!detail.is_empty());
    }

    #[test]
    fn test_parse_detail_unrecognized_layout() {
        let detail = parse_detail("<html><body><p>maintenance page</p></body></html>");
        assert!(detail.is_empty());
    }
}
