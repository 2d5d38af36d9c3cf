// Derives the full info/health URL of a discovered node.

use url::Url;

use crate::models::{FetchKind, NodeDescriptor};

/// Joins the node's base address with its info or health path.
///
/// A base address without a scheme (`host:port`) is treated as plain HTTP. Returns `None`
/// when the base address cannot be turned into a URL; callers treat that as "no reachable
/// endpoint" for this node only.
pub fn endpoint_url(node: &NodeDescriptor, kind: FetchKind) -> Option<Url> {
    let base = node.base_address.trim();
    if base.is_empty() {
        return None;
    }

    let mut url = if base.contains("://") {
        Url::parse(base).ok()?
    } else {
        Url::parse(&format!("http://{base}")).ok()?
    };
    if url.cannot_be_a_base() || url.host_str().is_none_or(str::is_empty) {
        return None;
    }

    let (path, query, fragment) = split_suffix(node.path(kind).trim());
    let joined = join_path(url.path(), path);
    url.set_path(&joined);
    if query.is_some() {
        url.set_query(query);
    }
    if fragment.is_some() {
        url.set_fragment(fragment);
    }
    Some(url)
}

/// `/health?group=liveness` -> (`/health`, `group=liveness`, none)
fn split_suffix(suffix: &str) -> (&str, Option<&str>, Option<&str>) {
    let (rest, fragment) = match suffix.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (suffix, None),
    };
    match rest.split_once('?') {
        Some((path, query)) => (path, Some(query), fragment),
        None => (rest, None, fragment),
    }
}

/// `/api/` + `/info` -> `/api/info`; exactly one slash between the parts.
fn join_path(base: &str, suffix: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        suffix.trim_start_matches('/')
    )
}
