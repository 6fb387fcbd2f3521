//! Fallback text extractor: strip known noise tags and keep everything else,
//! whitespace-collapsed. Used when the readability extractor finds nothing
//! dense enough (SPEC_FULL.md §4.4 step 2).

use scraper::{Html, Selector};

const NOISE_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside", "noscript"];

pub fn extract(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(noise_selector) = Selector::parse(&NOISE_TAGS.join(",")) else {
        return String::new();
    };
    let noise_ids: std::collections::HashSet<_> = document
        .select(&noise_selector)
        .flat_map(|el| el.descendants().map(|n| n.id()))
        .collect();

    let Ok(body_selector) = Selector::parse("body") else {
        return String::new();
    };
    let Some(body) = document.select(&body_selector).next() else {
        return String::new();
    };

    let mut out = String::new();
    for element in body.descendants() {
        if let Some(text) = element.value().as_text() {
            if noise_ids.contains(&element.id()) {
                continue;
            }
            out.push_str(text);
            out.push(' ');
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_noise_tags_and_collapses_whitespace() {
        let html = r#"
            <html><body>
              <header>Site Header</header>
              <script>var x = 1;</script>
              <main>   Hello    World  </main>
              <footer>Site Footer</footer>
            </body></html>
        "#;
        let text = extract(html);
        assert_eq!(text, "Hello World");
    }
}
