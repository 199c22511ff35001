//! ARES (Czech business register) lookup
//!
//! IČO values are validated locally (8 digits, mod-11 check digit) before any
//! network call. Successful lookups are cached in memory for 24 hours.

use async_trait::async_trait;
use serde::Deserialize;
use shared::models::AresSubject;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;

const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AresError {
    #[error("invalid IČO: {0}")]
    InvalidIco(String),

    #[error("subject {0} not found in ARES")]
    NotFound(String),

    #[error("ARES unavailable: {0}")]
    Unavailable(String),
}

/// Normalize an IČO (trim, left-pad to 8 digits) and verify its check digit
pub fn normalize_ico(raw: &str) -> Result<String, AresError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.len() > 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AresError::InvalidIco(raw.to_string()));
    }
    let ico = format!("{raw:0>8}");
    if !is_valid_ico(&ico) {
        return Err(AresError::InvalidIco(ico));
    }
    Ok(ico)
}

/// Weights 8..2 over the first seven digits; check = (11 - sum mod 11) mod 10
pub fn is_valid_ico(ico: &str) -> bool {
    let digits: Vec<u32> = ico.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 8 || ico.len() != 8 {
        return false;
    }
    let sum: u32 = digits[..7]
        .iter()
        .zip((2..=8).rev())
        .map(|(d, w)| d * w)
        .sum();
    (11 - sum % 11) % 10 == digits[7]
}

// ── ARES response ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AresResponse {
    ico: String,
    obchodni_jmeno: String,
    dic: Option<String>,
    sidlo: Option<AresSeat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AresSeat {
    nazev_obce: Option<String>,
    nazev_casti_obce: Option<String>,
    nazev_ulice: Option<String>,
    cislo_domovni: Option<u32>,
    cislo_orientacni: Option<u32>,
    cislo_orientacni_pismeno: Option<String>,
    psc: Option<u32>,
    textova_adresa: Option<String>,
}

impl AresSeat {
    /// "Street 778/3a", or the district when the place has no streets
    fn street_line(&self) -> Option<String> {
        let place = self
            .nazev_ulice
            .as_deref()
            .or(self.nazev_casti_obce.as_deref())
            .or(self.nazev_obce.as_deref())?;
        let mut number = self.cislo_domovni.map(|n| n.to_string()).unwrap_or_default();
        if let Some(orient) = self.cislo_orientacni {
            if !number.is_empty() {
                number.push('/');
            }
            number.push_str(&orient.to_string());
            if let Some(letter) = &self.cislo_orientacni_pismeno {
                number.push_str(letter);
            }
        }
        if number.is_empty() {
            Some(place.to_string())
        } else {
            Some(format!("{place} {number}"))
        }
    }
}

/// Map the ARES JSON body onto [`AresSubject`]
pub fn parse_subject(body: &str) -> Result<AresSubject, AresError> {
    let resp: AresResponse = serde_json::from_str(body)
        .map_err(|e| AresError::Unavailable(format!("unexpected ARES response: {e}")))?;
    let seat = resp.sidlo.unwrap_or_default();
    Ok(AresSubject {
        ico: resp.ico,
        name: resp.obchodni_jmeno,
        dic: resp.dic,
        address: seat.street_line().or_else(|| seat.textova_adresa.clone()),
        city: seat.nazev_obce.clone(),
        zip: seat.psc.map(|p| format!("{p:05}")),
    })
}

// ── Lookup backends ──

#[async_trait]
pub trait AresLookup: Send + Sync {
    /// Fetch a subject by normalized IČO
    async fn fetch(&self, ico: &str) -> Result<AresSubject, AresError>;
}

/// HTTP client for the ARES REST API
pub struct AresClient {
    http: reqwest::Client,
    base_url: String,
}

impl AresClient {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("smeny-server/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AresLookup for AresClient {
    async fn fetch(&self, ico: &str) -> Result<AresSubject, AresError> {
        let url = format!("{}/{ico}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AresError::Unavailable(e.to_string()))?;

        match resp.status() {
            reqwest::StatusCode::NOT_FOUND => Err(AresError::NotFound(ico.to_string())),
            status if status.is_success() => {
                let body = resp
                    .text()
                    .await
                    .map_err(|e| AresError::Unavailable(e.to_string()))?;
                parse_subject(&body)
            }
            status => Err(AresError::Unavailable(format!("ARES returned {status}"))),
        }
    }
}

// ── Cached service ──

struct CacheEntry {
    subject: AresSubject,
    expires_at: Instant,
}

/// Validating, caching front of an [`AresLookup`]
#[derive(Clone)]
pub struct AresService {
    backend: Arc<dyn AresLookup>,
    cache: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl AresService {
    pub fn new(backend: Arc<dyn AresLookup>) -> Self {
        Self {
            backend,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn lookup(&self, raw_ico: &str) -> Result<AresSubject, AresError> {
        let ico = normalize_ico(raw_ico)?;

        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&ico)
                && entry.expires_at > Instant::now()
            {
                return Ok(entry.subject.clone());
            }
        }

        let subject = self.backend.fetch(&ico).await?;

        let mut cache = self.cache.write().await;
        let now = Instant::now();
        cache.retain(|_, e| e.expires_at > now);
        cache.insert(
            ico,
            CacheEntry {
                subject: subject.clone(),
                expires_at: now + CACHE_TTL,
            },
        );
        Ok(subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ASSECO: &str = r#"{
        "ico": "27074358",
        "obchodniJmeno": "Asseco Central Europe, a.s.",
        "sidlo": {
            "kodStatu": "CZ",
            "nazevObce": "Praha",
            "nazevCastiObce": "Michle",
            "nazevUlice": "Budějovická",
            "cisloDomovni": 778,
            "cisloOrientacni": 3,
            "cisloOrientacniPismeno": "a",
            "psc": 14000,
            "textovaAdresa": "Budějovická 778/3a, Michle, 14000 Praha 4"
        },
        "pravniForma": "121",
        "dic": "CZ27074358"
    }"#;

    struct CountingLookup {
        calls: AtomicUsize,
        result: Result<AresSubject, AresError>,
    }

    #[async_trait]
    impl AresLookup for CountingLookup {
        async fn fetch(&self, _ico: &str) -> Result<AresSubject, AresError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn subject() -> AresSubject {
        parse_subject(ASSECO).unwrap()
    }

    #[test]
    fn test_ico_checksum() {
        assert!(is_valid_ico("27074358"));
        assert!(is_valid_ico("25596641"));
        assert!(!is_valid_ico("27074359"));
        assert!(!is_valid_ico("2707435"));
        assert!(!is_valid_ico("2707435a"));
    }

    #[test]
    fn test_normalize_ico() {
        assert_eq!(normalize_ico(" 27074358 ").unwrap(), "27074358");
        assert!(matches!(normalize_ico("123"), Err(AresError::InvalidIco(_))));
        assert!(matches!(normalize_ico("123456789"), Err(AresError::InvalidIco(_))));
        assert!(matches!(normalize_ico(""), Err(AresError::InvalidIco(_))));
    }

    #[test]
    fn test_parse_subject() {
        let s = subject();
        assert_eq!(s.ico, "27074358");
        assert_eq!(s.name, "Asseco Central Europe, a.s.");
        assert_eq!(s.dic.as_deref(), Some("CZ27074358"));
        assert_eq!(s.address.as_deref(), Some("Budějovická 778/3a"));
        assert_eq!(s.city.as_deref(), Some("Praha"));
        assert_eq!(s.zip.as_deref(), Some("14000"));
    }

    #[test]
    fn test_parse_subject_without_street() {
        let body = r#"{
            "ico": "25596641",
            "obchodniJmeno": "Obecní s.r.o.",
            "sidlo": { "nazevObce": "Lhota", "cisloDomovni": 12, "psc": 5601 }
        }"#;
        let s = parse_subject(body).unwrap();
        assert_eq!(s.address.as_deref(), Some("Lhota 12"));
        assert_eq!(s.zip.as_deref(), Some("05601"));
        assert_eq!(s.dic, None);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(parse_subject("<html>"), Err(AresError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_invalid_ico_skips_backend() {
        let backend = Arc::new(CountingLookup {
            calls: AtomicUsize::new(0),
            result: Ok(subject()),
        });
        let service = AresService::new(backend.clone());
        assert!(matches!(
            service.lookup("27074359").await,
            Err(AresError::InvalidIco(_))
        ));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hits_until_expiry() {
        let backend = Arc::new(CountingLookup {
            calls: AtomicUsize::new(0),
            result: Ok(subject()),
        });
        let service = AresService::new(backend.clone());

        assert_eq!(service.lookup("27074358").await.unwrap(), subject());
        assert_eq!(service.lookup("27074358").await.unwrap(), subject());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(CACHE_TTL + Duration::from_secs(1)).await;
        service.lookup("27074358").await.unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let backend = Arc::new(CountingLookup {
            calls: AtomicUsize::new(0),
            result: Err(AresError::NotFound("27074358".into())),
        });
        let service = AresService::new(backend.clone());
        for _ in 0..2 {
            assert_eq!(
                service.lookup("27074358").await,
                Err(AresError::NotFound("27074358".into()))
            );
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }
}
