//! Product page extraction
//!
//! Streams the page through `lol_html` and keeps the first match of each
//! field inside `div.details-block`. A page without that block has no
//! product on it.

use std::{cell::RefCell, rc::Rc};

use lol_html::{RewriteStrSettings, element, rewrite_str, text};

use super::FetchError;

const DETAILS: &str = "div.details-block";
const TITLE: &str = "div.details-block li.breadcrumb-item.active";
const OLD_PRICE: &str = "div.details-block span.old";
const REGULAR_PRICE: &str = "div.details-block span.regular";
const SIZE_OPTION: &str = "div.details-block select#prodSizeChangeSel option";
const PRODUCT_ID: &str = "div.details-block div.product-id";
const BRAND_LOGO: &str = "div.details-block div.product-brnd-logo img[src]";
const PROMO_TAG: &str = "div.details-block span.customlabel img[src]";

/// Image paths below this marker name the cached brand logo
pub const BRAND_MARKER: &str = "topsale.am/img/brands/";
/// Image paths below this marker name the cached promo tag
pub const TAG_MARKER: &str = "topsale.am/img/";

/// Fields scraped from one product page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub title: String,
    pub price_original: String,
    pub price_sale: String,
    pub product_id: u64,
    pub size: String,
    pub brand_src: Option<String>,
    pub tag_srcs: Vec<String>,
}

impl ProductPage {
    /// Brand logo source and cache name, if the page has a usable logo
    ///
    /// `0` is the shop's placeholder for "no brand"; SVG logos are skipped
    /// because the label canvas only takes raster images.
    pub fn brand_asset(&self) -> Option<(String, String)> {
        let src = self.brand_src.as_ref()?;
        let name = asset_name(src, BRAND_MARKER)?;
        if name == "0" || name.to_ascii_lowercase().ends_with(".svg") {
            return None;
        }
        Some((src.clone(), name))
    }

    /// Promo tag sources and cache names
    pub fn tag_assets(&self) -> Vec<(String, String)> {
        self.tag_srcs
            .iter()
            .filter_map(|src| asset_name(src, TAG_MARKER).map(|name| (src.clone(), name)))
            .collect()
    }
}

/// First match of a text field
#[derive(Debug, Clone, Default)]
struct FirstText {
    seen: usize,
    text: String,
}

impl FirstText {
    fn open(&mut self) {
        self.seen += 1;
    }

    fn push(&mut self, chunk: &str) {
        if self.seen == 1 {
            self.text.push_str(chunk);
        }
    }

    fn value(&self) -> Option<String> {
        (self.seen > 0).then(|| clean_text(&self.text))
    }
}

#[derive(Debug, Clone, Default)]
struct PageState {
    found: bool,
    title: FirstText,
    old_price: FirstText,
    regular_price: FirstText,
    size: FirstText,
    product_id: FirstText,
    brand_src: Option<String>,
    tag_srcs: Vec<String>,
}

/// Element + text handler pair collecting the first match into `$field`
macro_rules! first_text {
    ($state:expr, $selector:expr, $field:ident) => {
        [
            element!($selector, {
                let state = Rc::clone(&$state);
                move |_el| {
                    state.borrow_mut().$field.open();
                    Ok(())
                }
            }),
            text!($selector, {
                let state = Rc::clone(&$state);
                move |t| {
                    state.borrow_mut().$field.push(t.as_str());
                    Ok(())
                }
            }),
        ]
    };
}

/// Extract the product from a page; `Ok(None)` when the page has no product block
pub fn parse_product_page(html: &str) -> Result<Option<ProductPage>, FetchError> {
    let state = Rc::new(RefCell::new(PageState::default()));

    let mut handlers = vec![
        element!(DETAILS, {
            let state = Rc::clone(&state);
            move |_el| {
                state.borrow_mut().found = true;
                Ok(())
            }
        }),
        element!(BRAND_LOGO, {
            let state = Rc::clone(&state);
            move |el| {
                let mut state = state.borrow_mut();
                if state.brand_src.is_none() {
                    state.brand_src = el.get_attribute("src");
                }
                Ok(())
            }
        }),
        element!(PROMO_TAG, {
            let state = Rc::clone(&state);
            move |el| {
                if let Some(src) = el.get_attribute("src") {
                    state.borrow_mut().tag_srcs.push(src);
                }
                Ok(())
            }
        }),
    ];
    handlers.extend(first_text!(state, TITLE, title));
    handlers.extend(first_text!(state, OLD_PRICE, old_price));
    handlers.extend(first_text!(state, REGULAR_PRICE, regular_price));
    handlers.extend(first_text!(state, SIZE_OPTION, size));
    handlers.extend(first_text!(state, PRODUCT_ID, product_id));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| FetchError::Parse(err.to_string()))?;

    let state = Rc::try_unwrap(state)
        .map(|cell| cell.into_inner())
        .unwrap_or_else(|rc| rc.borrow().clone());

    if !state.found {
        return Ok(None);
    }

    let title = state
        .title
        .value()
        .ok_or_else(|| FetchError::Parse("product title missing".to_string()))?;
    let price_sale = state
        .regular_price
        .value()
        .map(|p| price_digits(&p))
        .ok_or_else(|| FetchError::Parse("sale price missing".to_string()))?;
    let price_original = state
        .old_price
        .value()
        .map_or_else(|| "0".to_string(), |p| price_digits(&p));
    let product_id = state
        .product_id
        .value()
        .and_then(|text| first_number(&text))
        .unwrap_or(0);

    Ok(Some(ProductPage {
        title,
        price_original,
        price_sale,
        product_id,
        size: state.size.value().unwrap_or_default(),
        brand_src: state.brand_src,
        tag_srcs: state.tag_srcs,
    }))
}

/// Path after `marker`, without query or fragment; rejects traversal
pub fn asset_name(src: &str, marker: &str) -> Option<String> {
    let start = src.find(marker)? + marker.len();
    let name = src[start..].split(['?', '#']).next().unwrap_or_default();
    if name.is_empty() || name.split('/').any(|part| part.is_empty() || part == "..") {
        return None;
    }
    Some(name.to_string())
}

/// First run of digits and thousands separators, "0" when there is none
fn price_digits(text: &str) -> String {
    let run: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .collect();
    if run.is_empty() { "0".to_string() } else { run }
}

fn first_number(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Decode the common entities and collapse whitespace
fn clean_text(raw: &str) -> String {
    let decoded = raw
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html><body>
<nav><ol><li class="breadcrumb-item active">Not the product</li></ol></nav>
<div class="details-block"><div><div><div>
  <ol class="breadcrumb">
    <li class="breadcrumb-item"><a href="/">Home</a></li>
    <li class="breadcrumb-item active">Rebound Joy   Sneakers &amp; Socks</li>
  </ol>
  <div class="product-brnd-logo"><img src="https://topsale.am/img/brands/puma.png?v=2"></div>
  <div class="prices">
    <span class="old">32,000 &#1423;</span>
    <span class="regular">19,900 &#1423;</span>
    <span class="regular">1 &#1423;</span>
  </div>
  <span class="customlabel"><img src="https://topsale.am/img/tags/sale-40.png"></span>
  <span class="customlabel"><img src="https://topsale.am/img/tags/new.png"></span>
  <select id="prodSizeChangeSel">
    <option value="1">42</option>
    <option value="2">43</option>
  </select>
  <div class="product-id">Product code: 20713</div>
</div></div></div></div>
</body></html>"#;

    #[test]
    fn test_parse_full_page() {
        let page = parse_product_page(PAGE).unwrap().unwrap();

        assert_eq!(page.title, "Rebound Joy Sneakers & Socks");
        assert_eq!(page.price_original, "32,000");
        assert_eq!(page.price_sale, "19,900");
        assert_eq!(page.product_id, 20713);
        assert_eq!(page.size, "42");
        assert_eq!(
            page.brand_asset(),
            Some((
                "https://topsale.am/img/brands/puma.png?v=2".to_string(),
                "puma.png".to_string()
            ))
        );
        assert_eq!(
            page.tag_assets()
                .into_iter()
                .map(|(_, name)| name)
                .collect::<Vec<_>>(),
            vec!["tags/sale-40.png", "tags/new.png"]
        );
    }

    #[test]
    fn test_no_details_block() {
        let html = r#"<html><body><div class="listing">nothing</div></body></html>"#;
        assert_eq!(parse_product_page(html).unwrap(), None);
        assert_eq!(parse_product_page("").unwrap(), None);
    }

    #[test]
    fn test_optional_fields_default() {
        let html = r#"<div class="details-block">
            <li class="breadcrumb-item active">Plain Tee</li>
            <span class="regular">4,500</span>
            <div class="product-id">no code</div>
        </div>"#;
        let page = parse_product_page(html).unwrap().unwrap();

        assert_eq!(page.price_original, "0");
        assert_eq!(page.price_sale, "4,500");
        assert_eq!(page.product_id, 0);
        assert_eq!(page.size, "");
        assert_eq!(page.brand_asset(), None);
        assert!(page.tag_assets().is_empty());
    }

    #[test]
    fn test_missing_sale_price_is_error() {
        let html = r#"<div class="details-block">
            <li class="breadcrumb-item active">Plain Tee</li>
        </div>"#;
        assert!(matches!(
            parse_product_page(html),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_brand_placeholder_and_svg_skipped() {
        let mut page = parse_product_page(PAGE).unwrap().unwrap();
        page.brand_src = Some("https://topsale.am/img/brands/0".to_string());
        assert_eq!(page.brand_asset(), None);
        page.brand_src = Some("https://topsale.am/img/brands/adidas.SVG".to_string());
        assert_eq!(page.brand_asset(), None);
    }

    #[test]
    fn test_asset_name_rejects_traversal() {
        assert_eq!(
            asset_name("https://topsale.am/img/a/b.png#x", TAG_MARKER),
            Some("a/b.png".to_string())
        );
        assert_eq!(asset_name("https://topsale.am/img/../etc/passwd", TAG_MARKER), None);
        assert_eq!(asset_name("https://topsale.am/img/", TAG_MARKER), None);
        assert_eq!(asset_name("https://cdn.example/img/x.png", TAG_MARKER), None);
    }

    #[test]
    fn test_price_and_id_helpers() {
        assert_eq!(price_digits("  12,345 AMD"), "12,345");
        assert_eq!(price_digits("free"), "0");
        assert_eq!(first_number("ID: 0042 / 7"), Some(42));
        assert_eq!(first_number("none"), None);
    }
}
