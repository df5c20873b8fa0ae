//! List query parameters and the paginated response envelope.
//!
//! Links in the envelope are absolute and rebuilt from the request itself;
//! every other query parameter (e.g. `search`) is carried over.

use std::collections::BTreeMap;
use std::convert::Infallible;

use axum::{
    Json,
    async_trait,
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, Uri, header, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use url::Url;

use yatube_blog::{Listing, PaginationPolicy, Previous, Window};

pub const LIMIT_PARAM: &str = "limit";
pub const OFFSET_PARAM: &str = "offset";
pub const SEARCH_PARAM: &str = "search";

/// Query of a list request plus what is needed to link to other pages.
#[derive(Debug, Clone)]
pub struct ListQuery {
    params: BTreeMap<String, String>,
    base: Option<Url>,
}

#[async_trait]
impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());

        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok());
        let scheme = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("http");

        Ok(Self::new(&uri, scheme, host))
    }
}

impl ListQuery {
    pub fn new(uri: &Uri, scheme: &str, host: Option<&str>) -> Self {
        let params = uri
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        let base = host.and_then(|host| Url::parse(&format!("{scheme}://{host}{}", uri.path())).ok());

        Self { params, base }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn search(&self) -> Option<&str> {
        self.get(SEARCH_PARAM)
    }

    pub fn window(&self, policy: &PaginationPolicy) -> Option<Window> {
        policy.window(self.get(LIMIT_PARAM), self.get(OFFSET_PARAM))
    }

    pub fn respond<T>(&self, listing: Listing<T>, window: Option<Window>, to_json: impl FnMut(T) -> Value) -> Response {
        (StatusCode::OK, Json(self.render(listing, window, to_json))).into_response()
    }

    /// Plain array without a window, the count/next/previous envelope with one.
    pub fn render<T>(&self, listing: Listing<T>, window: Option<Window>, to_json: impl FnMut(T) -> Value) -> Value {
        let total = listing.total;
        let results: Vec<Value> = listing.items.into_iter().map(to_json).collect();

        let Some(window) = window else {
            return Value::Array(results);
        };

        let next = window
            .next(total)
            .and_then(|offset| self.link(window.limit, Some(offset)));
        let previous = window.previous().and_then(|previous| match previous {
            Previous::FirstPage => self.link(window.limit, None),
            Previous::Offset(offset) => self.link(window.limit, Some(offset)),
        });

        json!({
            "count": total,
            "next": next,
            "previous": previous,
            "results": results,
        })
    }

    /// Absolute URL of another page; `offset: None` drops the parameter.
    fn link(&self, limit: u64, offset: Option<u64>) -> Option<String> {
        let mut url = self.base.clone()?;

        let mut params = self.params.clone();
        params.insert(LIMIT_PARAM.to_string(), limit.to_string());
        match offset {
            Some(offset) => {
                params.insert(OFFSET_PARAM.to_string(), offset.to_string());
            }
            None => {
                params.remove(OFFSET_PARAM);
            }
        }

        url.query_pairs_mut().clear().extend_pairs(params.iter());
        Some(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(path_and_query: &str) -> ListQuery {
        let uri: Uri = path_and_query.parse().unwrap();
        ListQuery::new(&uri, "http", Some("testserver"))
    }

    fn envelope(q: &ListQuery, total: u64) -> Value {
        let window = q.window(&PaginationPolicy::default());
        let listing = Listing::from_all((1..=total).collect(), window);
        q.render(listing, window, |n: u64| json!(n))
    }

    #[test]
    fn no_window_without_limit_or_offset() {
        let q = query("/v1/posts/?search=x");
        assert_eq!(q.window(&PaginationPolicy::default()), None);
        assert_eq!(q.search(), Some("x"));
    }

    #[test]
    fn first_page_links() {
        let q = query("/v1/posts/?limit=2");
        let page = envelope(&q, 5);
        assert_eq!(page["count"], 5);
        assert_eq!(page["results"], json!([1, 2]));
        assert_eq!(page["next"], "http://testserver/v1/posts/?limit=2&offset=2");
        assert!(page["previous"].is_null());
    }

    #[test]
    fn previous_link_drops_offset_on_the_first_page() {
        let q = query("/v1/posts/?limit=2&offset=2");
        let page = envelope(&q, 5);
        assert_eq!(page["results"], json!([3, 4]));
        assert_eq!(page["next"], "http://testserver/v1/posts/?limit=2&offset=4");
        assert_eq!(page["previous"], "http://testserver/v1/posts/?limit=2");
    }

    #[test]
    fn last_page_has_no_next_and_keeps_other_params() {
        let q = query("/v1/follow/?search=al&offset=4&limit=2");
        let page = envelope(&q, 5);
        assert_eq!(page["results"], json!([5]));
        assert!(page["next"].is_null());
        assert_eq!(
            page["previous"],
            "http://testserver/v1/follow/?limit=2&offset=2&search=al"
        );
    }

    #[test]
    fn unwindowed_listing_is_a_plain_array() {
        let q = query("/v1/groups/");
        let window = q.window(&PaginationPolicy::default());
        let listing = Listing::from_all(vec![1u64, 2, 3], window);
        assert_eq!(q.render(listing, window, |n| json!(n)), json!([1, 2, 3]));
    }

    #[test]
    fn links_need_a_host() {
        let uri: Uri = "/v1/posts/?limit=1".parse().unwrap();
        let q = ListQuery::new(&uri, "http", None);
        assert_eq!(q.link(1, Some(1)), None);
    }
}
