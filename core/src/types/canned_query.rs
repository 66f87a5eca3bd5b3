use crate::error::CannedQueryError;
use crate::types::FilterState;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::fmt;

const SCHEME: &str = "scope://";

/// Characters escaped inside the scope id and query parameters (RFC 3986 unreserved are kept).
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A serializable search request against a named scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CannedQuery {
    pub scope_id: String,
    pub query_string: String,
    pub department_id: String,
    pub filter_state: FilterState,
}

impl CannedQuery {
    pub fn new(scope_id: impl Into<String>) -> Self {
        Self {
            scope_id: scope_id.into(),
            ..Self::default()
        }
    }

    pub fn with_query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = query_string.into();
        self
    }

    pub fn with_department(mut self, department_id: impl Into<String>) -> Self {
        self.department_id = department_id.into();
        self
    }

    pub fn with_filter_state(mut self, filter_state: FilterState) -> Self {
        self.filter_state = filter_state;
        self
    }

    /// Formats as `scope://<id>?q=<query>[&dep=<department>][&filters=<json>]`.
    pub fn to_uri(&self) -> String {
        let mut uri = format!(
            "{SCHEME}{}?q={}",
            utf8_percent_encode(&self.scope_id, COMPONENT),
            utf8_percent_encode(&self.query_string, COMPONENT)
        );
        if !self.department_id.is_empty() {
            uri.push_str("&dep=");
            uri.extend(utf8_percent_encode(&self.department_id, COMPONENT));
        }
        if !self.filter_state.is_empty() {
            uri.push_str("&filters=");
            uri.extend(utf8_percent_encode(&self.filter_state.to_json(), COMPONENT));
        }
        uri
    }

    /// Parses a `scope://` URI. Unknown parameters are ignored.
    pub fn from_uri(uri: &str) -> Result<Self, CannedQueryError> {
        let rest = uri
            .strip_prefix(SCHEME)
            .ok_or_else(|| CannedQueryError::InvalidScheme(uri.to_string()))?;
        let (raw_id, params) = rest.split_once('?').unwrap_or((rest, ""));
        let scope_id = decode(raw_id);
        if scope_id.is_empty() {
            return Err(CannedQueryError::MissingScopeId(uri.to_string()));
        }

        let mut query = Self::new(scope_id);
        for pair in params.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "q" => query.query_string = decode(value),
                "dep" => query.department_id = decode(value),
                "filters" => {
                    let json = decode(value);
                    query.filter_state = FilterState::from_json(&json)
                        .ok_or(CannedQueryError::InvalidFilterState(json))?;
                }
                _ => {}
            }
        }
        Ok(query)
    }
}

impl fmt::Display for CannedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
