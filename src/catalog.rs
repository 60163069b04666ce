//! The startup-loaded bird catalog and free-text entity resolution.

use serde_json::Value;
use strsim::levenshtein;
use tracing::{debug, info};

use crate::error::Error;
use crate::fetch::Fetcher;
use crate::name::normalize;
use crate::TARGET_WEB_REQUEST;

const LIST_PATH: &str = "birds/names-aliases-json.html?output_format=json";

/// One bird from the site listing. Created once at catalog load and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    /// Detail-page reference, relative to the site base URL.
    pub page_ref: String,
}

/// The fixed list of known birds, in the site's listing order.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Fetch and parse the site listing. Runs once at startup; any failure
    /// here is fatal to the process.
    pub async fn load<F: Fetcher>(fetcher: &F, site_url: &str) -> Result<Self, Error> {
        let url = format!("{}{}", site_url, LIST_PATH);
        info!(target: TARGET_WEB_REQUEST, "Loading bird catalog from {}", url);
        let response = fetcher.fetch_text(&url).await?;
        if !response.ok {
            return Err(Error::Fetch {
                url,
                reason: format!("status {}", response.status),
            });
        }
        let entries = parse_listing(&response.body)?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Find the best-matching entry for a free-text query.
    ///
    /// The query is normalized and compared against each entry's normalized
    /// name: an exact key match wins immediately, otherwise the entry with
    /// the minimum Levenshtein distance is returned, ties going to the
    /// first-seen entry in listing order. A non-empty query against a
    /// non-empty catalog therefore always resolves to some entry, however
    /// distant; only an empty query fails.
    pub fn resolve(&self, query: &str) -> Result<&CatalogEntry, Error> {
        if query.is_empty() {
            return Err(Error::NotFound);
        }
        let key = normalize(query);

        if let Some(entry) = self.entries.iter().find(|e| normalize(&e.name) == key) {
            debug!("Exact match for '{}': {}", query, entry.name);
            return Ok(entry);
        }

        let mut best: Option<(&CatalogEntry, usize)> = None;
        for entry in &self.entries {
            let distance = levenshtein(&normalize(&entry.name), &key);
            match best {
                Some((_, min)) if distance >= min => {}
                _ => best = Some((entry, distance)),
            }
        }
        match best {
            Some((entry, distance)) => {
                debug!("Closest match for '{}': {} (distance {})", query, entry.name, distance);
                Ok(entry)
            }
            None => Err(Error::NotFound),
        }
    }
}

/// Parse the listing body: a JSON array whose well-formed rows are
/// `[id, name, pageRef]` string triples. Rows of any other shape are
/// skipped without error, matching the site's loose output format.
fn parse_listing(body: &str) -> Result<Vec<CatalogEntry>, Error> {
    let listing: Value = serde_json::from_str(body)
        .map_err(|err| Error::Parse(format!("catalog listing is not valid JSON: {}", err)))?;
    let Value::Array(rows) = listing else {
        return Err(Error::Parse("catalog listing is not a JSON array".to_string()));
    };

    let mut entries = Vec::new();
    for row in &rows {
        let Value::Array(fields) = row else { continue };
        if fields.len() != 3 {
            continue;
        }
        if let (Some(id), Some(name), Some(page_ref)) =
            (fields[0].as_str(), fields[1].as_str(), fields[2].as_str())
        {
            entries.push(CatalogEntry {
                id: id.to_string(),
                name: name.to_string(),
                page_ref: page_ref.to_string(),
            });
        }
    }
    debug!("Parsed {} catalog entries from {} rows", entries.len(), rows.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            name: name.to_string(),
            page_ref: format!("birds/{}.html", id),
        }
    }

    fn eagle_catalog() -> Catalog {
        Catalog::from_entries(vec![
            entry("12", "Bald Eagle"),
            entry("13", "Golden Eagle"),
        ])
    }

    #[test]
    fn test_parse_listing_accepts_triples() {
        let body = r#"[["12","Bald Eagle","birds/bald-eagle.html"],
                       ["13","Golden Eagle","birds/golden-eagle.html"]]"#;
        let entries = parse_listing(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "12");
        assert_eq!(entries[0].name, "Bald Eagle");
        assert_eq!(entries[1].page_ref, "birds/golden-eagle.html");
    }

    #[test]
    fn test_parse_listing_skips_malformed_rows() {
        // Non-array rows, wrong arity and non-string fields are all skipped.
        let body = r#"[
            "header",
            ["12","Bald Eagle","birds/bald-eagle.html"],
            ["13","Golden Eagle"],
            ["14","Osprey","birds/osprey.html","extra"],
            [15,"Merlin","birds/merlin.html"],
            {"id":"16"}
        ]"#;
        let entries = parse_listing(body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Bald Eagle");
    }

    #[test]
    fn test_parse_listing_rejects_non_array() {
        assert!(matches!(
            parse_listing(r#"{"birds":[]}"#),
            Err(Error::Parse(_))
        ));
        assert!(matches!(parse_listing("not json"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_resolve_exact_match() {
        let catalog = eagle_catalog();
        assert_eq!(catalog.resolve("Bald Eagle").unwrap().id, "12");
        // Normalization makes hyphenated and lowercased forms exact too.
        assert_eq!(catalog.resolve("bald-eagle").unwrap().id, "12");
    }

    #[test]
    fn test_resolve_approximate_match() {
        let catalog = eagle_catalog();
        assert_eq!(catalog.resolve("Bold Eagle").unwrap().id, "12");
        assert_eq!(catalog.resolve("goldn eagl").unwrap().id, "13");
    }

    #[test]
    fn test_resolve_always_returns_an_entry() {
        let catalog = eagle_catalog();
        // Nonsense input still resolves to the globally closest entry.
        assert!(catalog.resolve("xyzzy").is_ok());
    }

    #[test]
    fn test_resolve_tie_goes_to_first_seen() {
        let catalog = Catalog::from_entries(vec![entry("1", "Crow"), entry("2", "Craw")]);
        // "crew" is distance 1 from both; listing order decides.
        assert_eq!(catalog.resolve("crew").unwrap().id, "1");
    }

    #[test]
    fn test_resolve_empty_query_fails() {
        let catalog = eagle_catalog();
        assert!(matches!(catalog.resolve(""), Err(Error::NotFound)));
    }
}
