//! Primary text extractor: a readability-style heuristic that scores block
//! elements by text density and picks the highest-scoring subtree, the way
//! `trafilatura` does in the original implementation (SPEC_FULL.md §4.4
//! step 1, original_source's extraction pipeline).

use scraper::{Html, Selector};

const NOISE_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside", "form", "noscript"];

pub struct Extracted {
    pub title: Option<String>,
    pub text: String,
}

/// Returns `None` if no candidate block scores above the minimum density
/// threshold, signalling the caller to fall back to the structural extractor.
pub fn extract(html: &str) -> Option<Extracted> {
    let document = Html::parse_document(html);
    let title = extract_title(&document);

    let block_selector = Selector::parse("p, article, section, div, main").ok()?;
    let noise_selector = Selector::parse(&NOISE_TAGS.join(",")).ok()?;
    let noise_ids: std::collections::HashSet<_> = document
        .select(&noise_selector)
        .flat_map(|el| el.descendants().map(|n| n.id()))
        .collect();

    let mut best_text = String::new();
    let mut best_score = 0.0_f64;

    for element in document.select(&block_selector) {
        if noise_ids.contains(&element.id()) {
            continue;
        }
        let text: String = element
            .text()
            .collect::<Vec<_>>()
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let score = density_score(&text);
        if score > best_score {
            best_score = score;
            best_text = text;
        }
    }

    if best_score <= 0.0 || best_text.len() < 140 {
        return None;
    }

    Some(Extracted {
        title,
        text: best_text,
    })
}

/// Word count weighted down for link-heavy / boilerplate blocks. A crude
/// stand-in for `trafilatura`'s link-density and tag-depth heuristics.
fn density_score(text: &str) -> f64 {
    let word_count = text.split_whitespace().count() as f64;
    let punctuation_ratio = text.chars().filter(|c| c.is_ascii_punctuation()).count() as f64
        / text.len().max(1) as f64;
    word_count * (1.0 - punctuation_ratio.min(0.5))
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_densest_block_and_title() {
        let html = r#"
            <html><head><title>About Acme</title></head>
            <body>
              <nav><a href="/1">1</a><a href="/2">2</a><a href="/3">3</a></nav>
              <article>
                <p>Acme builds payroll software for small businesses across North America,
                helping thousands of teams pay their people correctly and on time every month.</p>
              </article>
            </body></html>
        "#;
        let result = extract(html).expect("should find a dense block");
        assert_eq!(result.title.as_deref(), Some("About Acme"));
        assert!(result.text.contains("payroll software"));
        assert!(!result.text.contains("1"));
    }

    #[test]
    fn sparse_page_returns_none() {
        let html = "<html><body><nav><a href=\"/1\">1</a></nav></body></html>";
        assert!(extract(html).is_none());
    }
}
