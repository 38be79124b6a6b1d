//! JavaScript evaluated in the page.
//!
//! Selector strings are embedded as JSON literals so quotes and brackets in
//! them survive intact.

#![cfg_attr(not(feature = "browser"), allow(dead_code))]

use serde_json::{json, Value};

use crate::config::ListingSelectors;

/// Scroll offset, document height and viewport height.
pub const SCROLL_METRICS_SCRIPT: &str = r#"
    (() => ({
        offset: document.documentElement.scrollTop,
        maxHeight: document.documentElement.scrollHeight,
        viewportHeight: window.innerHeight,
    }))()
"#;

fn literal(s: &str) -> String {
    Value::from(s).to_string()
}

pub fn count_script(selector: &str) -> String {
    format!(
        "document.querySelectorAll({}).length",
        literal(selector)
    )
}

pub fn exists_script(selector: &str) -> String {
    format!(
        "document.querySelector({}) !== null",
        literal(selector)
    )
}

/// Field maps of all cards from `start` onwards.
///
/// Missing sub-elements come back as `null`, empty ones as `""`.
pub fn read_cards_script(selectors: &ListingSelectors, start: usize) -> String {
    let sel = json!({
        "card": selectors.card,
        "title": selectors.title,
        "company": selectors.company,
        "location": selectors.location,
        "salary": selectors.salary,
    });

    format!(
        r#"
        (() => {{
            const sel = {sel};
            const text = (el) => el ? (el.innerText ?? el.textContent ?? "") : null;
            return Array.from(document.querySelectorAll(sel.card)).slice({start}).map((card) => {{
                const title = card.querySelector(sel.title);
                return {{
                    title: text(title),
                    cardLink: card.href || null,
                    titleLink: title && title.href ? title.href : null,
                    company: text(card.querySelector(sel.company)),
                    location: text(card.querySelector(sel.location)),
                    salary: text(card.querySelector(sel.salary)),
                }};
            }});
        }})()
        "#
    )
}

pub fn scroll_to_script(offset: f64) -> String {
    format!(
        "window.scrollTo({{ top: {}, behavior: \"smooth\" }})",
        offset
    )
}

/// Clicks the first `li` of the matched list; evaluates to false when
/// either the list or the item is missing.
pub fn click_first_item_script(selector: &str) -> String {
    format!(
        r#"
        (() => {{
            const list = document.querySelector({});
            const item = list ? list.querySelector("li:first-of-type") : null;
            if (!item) return false;
            item.click();
            return true;
        }})()
        "#,
        literal(selector)
    )
}
