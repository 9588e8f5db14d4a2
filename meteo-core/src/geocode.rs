//! Place-name resolution: geocoding upstream + TTL cache + best-match
//! candidate selection.

use std::sync::Arc;

use crate::cache::TtlCache;
use crate::error::{Error, Result};
use crate::model::{GeoCandidate, ResolvedLocation};
use crate::provider::GeocodeApi;

const CANDIDATE_COUNT: u8 = 5;
const LANGUAGE: &str = "en";
const DEFAULT_TIMEZONE: &str = "UTC";

/// Resolves a free-text place name to a single best-match location.
#[derive(Debug)]
pub struct LocationResolver {
    api: Arc<dyn GeocodeApi>,
    cache: TtlCache<ResolvedLocation>,
}

impl LocationResolver {
    pub fn new(api: Arc<dyn GeocodeApi>, ttl_secs: u64) -> Self {
        Self {
            api,
            cache: TtlCache::new(ttl_secs),
        }
    }

    /// Resolve `query` to a location, consulting the cache first.
    ///
    /// Zero upstream candidates yield [`Error::NotFound`]; negative results
    /// are never cached, so a later retry hits the upstream again.
    pub async fn resolve(&self, query: &str) -> Result<ResolvedLocation> {
        let key = query.to_lowercase();

        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(query, "geocode cache hit");
            return Ok(hit);
        }

        let candidates = self.api.search(query, CANDIDATE_COUNT, LANGUAGE).await?;
        if candidates.is_empty() {
            return Err(Error::NotFound);
        }

        let chosen = select_candidate(&key, &candidates);
        let resolved = ResolvedLocation {
            name: chosen.name.clone(),
            country: chosen.country.clone(),
            latitude: chosen.latitude,
            longitude: chosen.longitude,
            timezone: chosen
                .timezone
                .clone()
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            population: chosen.population,
            admin1: chosen.admin1.clone(),
        };

        tracing::info!(query, name = %resolved.name, "resolved location");
        self.cache.set(&key, resolved.clone());
        Ok(resolved)
    }
}

/// Pick the best candidate for a case-folded query.
///
/// An exact case-insensitive name match wins immediately, first such match
/// in upstream order. Otherwise the candidate with the strictly highest
/// population wins, missing population counting as 0; when no candidate has
/// a population the first in upstream order stands (nothing strictly beats
/// the initial best).
fn select_candidate<'a>(query_lower: &str, candidates: &'a [GeoCandidate]) -> &'a GeoCandidate {
    let mut best = &candidates[0];

    for candidate in candidates {
        if candidate.name.to_lowercase() == query_lower {
            return candidate;
        }

        if candidate.population.unwrap_or(0) > best.population.unwrap_or(0) {
            best = candidate;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fake upstream serving a fixed candidate list (or a failure) and
    /// counting how many times it was asked.
    #[derive(Debug)]
    struct FakeGeocode {
        candidates: Vec<GeoCandidate>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeGeocode {
        fn serving(candidates: Vec<GeoCandidate>) -> Arc<Self> {
            Arc::new(Self {
                candidates,
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                candidates: Vec::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl GeocodeApi for FakeGeocode {
        async fn search(&self, _: &str, _: u8, _: &str) -> Result<Vec<GeoCandidate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Upstream("connection refused".into()));
            }
            Ok(self.candidates.clone())
        }
    }

    fn candidate(name: &str, population: Option<u64>) -> GeoCandidate {
        GeoCandidate {
            name: name.to_string(),
            country: Some("Testland".to_string()),
            latitude: 10.0,
            longitude: 20.0,
            timezone: None,
            population,
            admin1: None,
        }
    }

    #[tokio::test]
    async fn exact_match_beats_population() {
        let api = FakeGeocode::serving(vec![
            candidate("Pune", Some(50)),
            candidate("pune", Some(9_000_000)),
        ]);
        let resolver = LocationResolver::new(api, 300);

        let got = resolver.resolve("pune").await.unwrap();
        // First case-insensitive exact match in upstream order wins.
        assert_eq!(got.name, "Pune");
        assert_eq!(got.population, Some(50));
    }

    #[tokio::test]
    async fn highest_population_wins_without_exact_match() {
        let api = FakeGeocode::serving(vec![
            candidate("Springfield A", Some(100)),
            candidate("Springfield B", Some(9_000_000)),
            candidate("Springfield C", Some(500)),
        ]);
        let resolver = LocationResolver::new(api, 300);

        let got = resolver.resolve("springfield").await.unwrap();
        assert_eq!(got.name, "Springfield B");
    }

    #[tokio::test]
    async fn first_candidate_wins_when_no_population_data() {
        let api = FakeGeocode::serving(vec![
            candidate("Alpha", None),
            candidate("Beta", None),
            candidate("Gamma", None),
        ]);
        let resolver = LocationResolver::new(api, 300);

        let got = resolver.resolve("delta").await.unwrap();
        assert_eq!(got.name, "Alpha");
    }

    #[tokio::test]
    async fn missing_timezone_defaults_to_utc() {
        let api = FakeGeocode::serving(vec![candidate("Alpha", None)]);
        let resolver = LocationResolver::new(api, 300);

        let got = resolver.resolve("alpha").await.unwrap();
        assert_eq!(got.timezone, "UTC");
        assert_eq!(got.admin1, None);
    }

    #[tokio::test]
    async fn empty_candidate_list_is_not_found() {
        let api = FakeGeocode::serving(Vec::new());
        let resolver = LocationResolver::new(api, 300);

        let err = resolver.resolve("nowhere").await.unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[tokio::test]
    async fn upstream_failure_propagates() {
        let resolver = LocationResolver::new(FakeGeocode::failing(), 300);

        let err = resolver.resolve("anywhere").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test]
    async fn repeat_query_is_served_from_cache() {
        let api = FakeGeocode::serving(vec![candidate("Alpha", None)]);
        let resolver = LocationResolver::new(Arc::clone(&api) as Arc<dyn GeocodeApi>, 300);

        resolver.resolve("Alpha").await.unwrap();
        // Case-folded key, so a differently-cased repeat also hits.
        resolver.resolve("ALPHA").await.unwrap();

        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn not_found_is_not_cached() {
        let api = FakeGeocode::serving(Vec::new());
        let resolver = LocationResolver::new(Arc::clone(&api) as Arc<dyn GeocodeApi>, 300);

        let _ = resolver.resolve("nowhere").await;
        let _ = resolver.resolve("nowhere").await;

        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
    }
}
