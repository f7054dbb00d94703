//! Identity forwarded by the hosting platform's authentication front end.

use axum::http::HeaderMap;

pub const PRINCIPAL_ID_HEADER: &str = "x-ms-client-principal-id";
pub const PRINCIPAL_NAME_HEADER: &str = "x-ms-client-principal-name";
pub const PRINCIPAL_IDP_HEADER: &str = "x-ms-client-principal-idp";

/// Caller identity as asserted by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub name: String,
    pub provider: String,
}

/// Identity used in local development when no platform headers are present.
pub const LOCAL_DEV_PRINCIPAL: (&str, &str, &str) =
    ("00000000-0000-4000-8000-000000000001", "dev@localhost", "aad");

impl Principal {
    fn local_dev() -> Self {
        let (id, name, provider) = LOCAL_DEV_PRINCIPAL;
        Self {
            id: id.to_string(),
            name: name.to_string(),
            provider: provider.to_string(),
        }
    }

    /// Read the principal id from the headers, if present and non-empty.
    pub fn id_from_headers(headers: &HeaderMap, local_dev: bool) -> Option<String> {
        match header(headers, PRINCIPAL_ID_HEADER) {
            Some(id) => Some(id),
            None if local_dev => Some(Self::local_dev().id),
            None => None,
        }
    }

    /// Read the full principal. All three headers are required.
    pub fn from_headers(headers: &HeaderMap, local_dev: bool) -> Option<Self> {
        if local_dev && header(headers, PRINCIPAL_ID_HEADER).is_none() {
            return Some(Self::local_dev());
        }
        Some(Self {
            id: header(headers, PRINCIPAL_ID_HEADER)?,
            name: header(headers, PRINCIPAL_NAME_HEADER)?,
            provider: header(headers, PRINCIPAL_IDP_HEADER)?,
        })
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(id: Option<&str>, name: Option<&str>, idp: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (key, value) in [
            (PRINCIPAL_ID_HEADER, id),
            (PRINCIPAL_NAME_HEADER, name),
            (PRINCIPAL_IDP_HEADER, idp),
        ] {
            if let Some(value) = value {
                map.insert(key, HeaderValue::from_str(value).unwrap());
            }
        }
        map
    }

    #[test]
    fn test_full_principal() {
        let map = headers(Some("abc"), Some("Ana"), Some("github"));
        assert_eq!(
            Principal::from_headers(&map, false),
            Some(Principal {
                id: "abc".to_string(),
                name: "Ana".to_string(),
                provider: "github".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_header() {
        let map = headers(Some("abc"), None, Some("github"));
        assert!(Principal::from_headers(&map, false).is_none());
        assert!(Principal::from_headers(&headers(Some(""), Some("a"), Some("b")), false).is_none());
    }

    #[test]
    fn test_local_dev_injects_identity() {
        let map = HeaderMap::new();
        let principal = Principal::from_headers(&map, true).unwrap();
        assert_eq!(principal.id, LOCAL_DEV_PRINCIPAL.0);
        assert_eq!(
            Principal::id_from_headers(&map, true).as_deref(),
            Some(LOCAL_DEV_PRINCIPAL.0)
        );
        assert!(Principal::id_from_headers(&map, false).is_none());
    }

    #[test]
    fn test_local_dev_keeps_real_headers() {
        let map = headers(Some("real"), Some("Ana"), Some("aad"));
        assert_eq!(Principal::from_headers(&map, true).unwrap().id, "real");
    }
}
