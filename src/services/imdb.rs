//! IMDB Top 250 chart scraper
//!
//! The chart page embeds its listing as JSON-LD inside a script tag;
//! parsing that block is far more stable than walking the surrounding
//! markup. Titles arrive HTML-escaped and are decoded before use.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const CHART_URL: &str = "https://www.imdb.com/chart/top";
// IMDB serves a stripped page to unknown agents; a browser UA gets the
// full chart with the embedded JSON-LD block.
const USER_AGENT: &str = "Mozilla/5.0";

/// IMDB chart errors
#[derive(Debug, Error)]
pub enum ImdbError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Deserialize)]
struct ChartPayload {
    #[serde(rename = "itemListElement", default)]
    item_list_element: Vec<ChartEntry>,
}

#[derive(Debug, Deserialize)]
struct ChartEntry {
    item: ChartItem,
}

#[derive(Debug, Deserialize)]
struct ChartItem {
    name: String,
}

/// Client for the public IMDB Top 250 chart
pub struct ImdbChartClient {
    http_client: reqwest::Client,
}

impl ImdbChartClient {
    pub fn new() -> Result<Self, ImdbError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ImdbError::NetworkError(e.to_string()))?;

        Ok(Self { http_client })
    }

    /// Fetch the chart page and return its titles in rank order
    pub async fn top_250_titles(&self) -> Result<Vec<String>, ImdbError> {
        tracing::debug!(url = CHART_URL, "Fetching IMDB Top 250 chart");

        let response = self
            .http_client
            .get(CHART_URL)
            .send()
            .await
            .map_err(|e| ImdbError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ImdbError::ApiError(status.as_u16(), error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ImdbError::NetworkError(e.to_string()))?;

        let titles = parse_chart_titles(&body)?;

        tracing::info!(count = titles.len(), "Retrieved IMDB Top 250 titles");

        Ok(titles)
    }
}

fn parse_chart_titles(html: &str) -> Result<Vec<String>, ImdbError> {
    let payload = extract_ld_json(html)
        .ok_or_else(|| ImdbError::ParseError("No JSON-LD block in chart page".to_string()))?;

    let chart: ChartPayload = serde_json::from_str(payload)
        .map_err(|e| ImdbError::ParseError(e.to_string()))?;

    Ok(chart
        .item_list_element
        .into_iter()
        .map(|entry| unescape_entities(&entry.item.name))
        .collect())
}

fn extract_ld_json(html: &str) -> Option<&str> {
    let start = html.find("application/ld+json")?;
    let tail = &html[start..];
    let open = tail.find('>')?;
    let tail = &tail[open + 1..];
    let close = tail.find("</script>")?;
    Some(tail[..close].trim())
}

/// Decode HTML entities in a chart title.
///
/// Single left-to-right pass, so decoded output is never rescanned
/// (`&amp;#39;` becomes `&#39;`, not `'`). Handles the five basic named
/// entities plus decimal and hex numeric references; anything else is
/// left as written.
fn unescape_entities(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut rest = title;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match decode_entity(rest) {
            Some((decoded, consumed)) => {
                out.push(decoded);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Decode one entity at the start of `s` (which begins with `&`),
/// returning the character and the byte length consumed
fn decode_entity(s: &str) -> Option<(char, usize)> {
    // Entities are short; a far-off semicolon means this `&` is literal.
    let end = s.find(';').filter(|&i| i <= 32)?;
    let body = &s[1..end];
    let consumed = end + 1;

    let decoded = if let Some(num) = body.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        char::from_u32(code)?
    } else {
        match body {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => return None,
        }
    };

    Some((decoded, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART_FIXTURE: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>IMDb Top 250 Movies</title>
<script type="application/ld+json">{
  "@context": "https://schema.org",
  "@type": "ItemList",
  "itemListElement": [
    {"@type": "ListItem", "item": {"@type": "Movie", "name": "The Shawshank Redemption"}},
    {"@type": "ListItem", "item": {"@type": "Movie", "name": "Schindler&apos;s List"}},
    {"@type": "ListItem", "item": {"@type": "Movie", "name": "The Lord of the Rings: The Return of the King"}}
  ]
}</script>
</head>
<body>chart body</body>
</html>"#;

    #[test]
    fn test_parses_titles_in_rank_order() {
        let titles = parse_chart_titles(CHART_FIXTURE).expect("fixture should parse");

        assert_eq!(titles.len(), 3);
        assert_eq!(titles[0], "The Shawshank Redemption");
        assert_eq!(titles[1], "Schindler's List");
        assert_eq!(titles[2], "The Lord of the Rings: The Return of the King");
    }

    #[test]
    fn test_missing_json_ld_is_a_parse_error() {
        let err = parse_chart_titles("<html><body>no chart here</body></html>").unwrap_err();
        assert!(matches!(err, ImdbError::ParseError(_)));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let html = r#"<script type="application/ld+json">{not json}</script>"#;
        let err = parse_chart_titles(html).unwrap_err();
        assert!(matches!(err, ImdbError::ParseError(_)));
    }

    #[test]
    fn test_unescapes_html_entities() {
        assert_eq!(unescape_entities("Schindler&apos;s List"), "Schindler's List");
        assert_eq!(unescape_entities("Fast &amp; Furious"), "Fast & Furious");
        assert_eq!(
            unescape_entities("&quot;Quoted&quot; &amp;amp; kept"),
            "\"Quoted\" &amp; kept"
        );
    }

    #[test]
    fn test_unescapes_numeric_entities() {
        assert_eq!(unescape_entities("Am&#233;lie"), "Amélie");
        assert_eq!(unescape_entities("L&#xE9;on"), "Léon");
        assert_eq!(unescape_entities("WALL&#183;E"), "WALL·E");
        assert_eq!(unescape_entities("It&#x27;s a Wonderful Life"), "It's a Wonderful Life");
    }

    #[test]
    fn test_leaves_undecodable_text_alone() {
        assert_eq!(unescape_entities("Tom & Jerry"), "Tom & Jerry");
        assert_eq!(unescape_entities("Bonnie &eacute; Clyde"), "Bonnie &eacute; Clyde");
        assert_eq!(unescape_entities("late &#99999999999; night"), "late &#99999999999; night");
        assert_eq!(unescape_entities("dangling &"), "dangling &");
    }

    #[test]
    fn test_empty_item_list_gives_empty_titles() {
        let html = r#"<script type="application/ld+json">{"itemListElement": []}</script>"#;
        let titles = parse_chart_titles(html).expect("empty list should parse");
        assert!(titles.is_empty());
    }
}
