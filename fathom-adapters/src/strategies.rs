//! The three function-typed strategies a `SourceAdapter` composes: how to
//! build a request URL, how to make the request, and how to parse the
//! response into a citable value. Splitting these out (rather than one
//! trait per vendor) keeps the six concrete adapters to a declaration plus
//! a handful of closures apiece.

use std::collections::BTreeMap;
use std::sync::Arc;

use fathom_types::FathomError;
use serde_json::Value;

/// Builds the fully-qualified URL for one endpoint call, given the
/// adapter's configured base URL and the caller's params.
pub type UrlBuilderFn = Arc<dyn Fn(&str, &str, &BTreeMap<String, String>) -> String + Send + Sync>;

/// Performs the request and returns the raw JSON body. In the absence of
/// live vendor credentials this is a deterministic synthetic generator;
/// when credentials are configured it is a `reqwest::Client` call.
pub type RequestFn = Arc<
    dyn Fn(
            reqwest::Client,
            String,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<Value, FathomError>> + Send>,
        > + Send
        + Sync,
>;

/// Parses a raw JSON body into the normalized value this adapter returns,
/// plus a confidence score in `[0,1]` for the resulting citation.
pub type ParseFn = Arc<dyn Fn(&Value) -> Result<(Value, f64), FathomError> + Send + Sync>;

/// Default URL builder shared by every adapter: `{base}/{endpoint}?k=v&...`
/// with params sorted for determinism.
#[must_use]
pub fn default_url_builder() -> UrlBuilderFn {
    Arc::new(|base, endpoint, params| {
        let mut url = format!("{base}/{endpoint}");
        if !params.is_empty() {
            let query = params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query);
        }
        url
    })
}

/// Wraps a pure `endpoint, url -> Value` generator as a [`RequestFn`],
/// standing in for a live vendor call in the absence of credentials. The
/// `reqwest::Client` argument is accepted but unused; a real deployment
/// swaps this closure out for one that issues the HTTP request.
#[must_use]
pub fn synthetic_request(
    generate: Arc<dyn Fn(&str, &str) -> Value + Send + Sync>,
) -> RequestFn {
    Arc::new(move |_client, url| {
        let generate = generate.clone();
        Box::pin(async move {
            let endpoint = url
                .rsplit('/')
                .next()
                .and_then(|tail| tail.split('?').next())
                .unwrap_or("");
            Ok(generate(endpoint, &url))
        })
    })
}
