//! Robots.txt sub-discovery. Parses directives for their candidate *paths*,
//! not their policy — Theodore's core does not honor `Disallow` (SPEC_FULL.md
//! §4.2 step 1, §9 "Open question — robots policy").

use std::time::Duration;

use tracing::debug;

use crate::http;

#[derive(Debug, Default, Clone)]
pub struct RobotsInfo {
    pub sitemaps: Vec<String>,
    /// Allow/Disallow path patterns for the wildcard user agent, treated as
    /// candidate locations only.
    pub raw_paths: Vec<String>,
    pub parsing_errors: Vec<String>,
}

pub async fn fetch(
    client: &reqwest::Client,
    base_url: &str,
    timeout: Duration,
) -> Result<RobotsInfo, reqwest::Error> {
    let robots_url = format!("{base_url}/robots.txt");

    let fetch = http::get_capped(client, &robots_url);
    let (status, body) = match tokio::time::timeout(timeout, fetch).await {
        Ok(result) => result?,
        Err(_) => {
            debug!(base_url, "robots.txt fetch timed out");
            return Ok(RobotsInfo::default());
        }
    };

    if status < 200 || status >= 300 {
        debug!(base_url, status, "robots.txt not found or not ok");
        return Ok(RobotsInfo::default());
    }

    Ok(parse(&body))
}

fn parse(body: &str) -> RobotsInfo {
    let mut info = RobotsInfo::default();
    let mut in_wildcard_section = false;

    for (line_no, raw_line) in body.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((directive, value)) = line.split_once(':') else {
            info.parsing_errors
                .push(format!("line {}: not a directive", line_no + 1));
            continue;
        };
        let directive = directive.trim().to_lowercase();
        let value = value.trim();

        match directive.as_str() {
            "user-agent" => {
                in_wildcard_section = value == "*";
            }
            "sitemap" => info.sitemaps.push(value.to_string()),
            "allow" | "disallow" if in_wildcard_section => {
                if !value.is_empty() {
                    info.raw_paths.push(value.to_string());
                }
            }
            "allow" | "disallow" | "crawl-delay" => {}
            _ => {
                info.parsing_errors
                    .push(format!("line {}: unknown directive '{}'", line_no + 1, directive));
            }
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sitemaps_and_wildcard_paths() {
        let body = "User-agent: *\nDisallow: /admin\nAllow: /public\nSitemap: /sitemap.xml\n\nUser-agent: Googlebot\nDisallow: /private\n";
        let info = parse(body);
        assert_eq!(info.sitemaps, vec!["/sitemap.xml".to_string()]);
        assert_eq!(info.raw_paths, vec!["/admin".to_string(), "/public".to_string()]);
        assert!(!info.raw_paths.contains(&"/private".to_string()));
    }

    #[test]
    fn unparseable_lines_are_recorded_not_fatal() {
        let body = "not a directive at all\nUser-agent: *\nAllow: /ok\n";
        let info = parse(body);
        assert_eq!(info.parsing_errors.len(), 1);
        assert_eq!(info.raw_paths, vec!["/ok".to_string()]);
    }
}
