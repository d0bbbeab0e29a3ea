//! Endpoint URL construction for the crawl service.
//!
//! Path parameters are pushed as single segments so the `url` crate
//! percent-encodes them; query parameters go through form encoding.

use url::Url;

use crate::error::ClientError;

use super::PageParams;

/// Collection path segment for instances.
const INSTANCES: &str = "instances";

/// Sub-collection path segment for crawls.
const CRAWLS: &str = "crawls";

/// Append `segments` to the base URL path, each as one encoded segment.
fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    for segment in segments {
        // Dot segments are normalised away by every URL parser, even
        // percent-encoded, so they can never reach the service as an id.
        if matches!(*segment, "" | "." | "..") {
            return Err(ClientError::InvalidPathSegment(segment.to_string()));
        }
    }

    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn append_paging(url: &mut Url, paging: PageParams) {
    url.query_pairs_mut()
        .append_pair("page", &paging.page.to_string())
        .append_pair("per_page", &paging.per_page.to_string());
}

/// `GET /instances?software=&page=&per_page=`
pub fn build_list_instances_url(
    base: &Url,
    software: Option<&str>,
    paging: PageParams,
) -> Result<Url, ClientError> {
    let mut url = join_segments(base, &[INSTANCES])?;
    if let Some(software) = software {
        url.query_pairs_mut().append_pair("software", software);
    }
    append_paging(&mut url, paging);
    Ok(url)
}

/// `GET /instances/{id}`
pub fn build_instance_url(base: &Url, id: &str) -> Result<Url, ClientError> {
    join_segments(base, &[INSTANCES, id])
}

/// `GET /instances/{id}/crawls?page=&per_page=`
pub fn build_crawls_url(base: &Url, id: &str, paging: PageParams) -> Result<Url, ClientError> {
    let mut url = join_segments(base, &[INSTANCES, id, CRAWLS])?;
    append_paging(&mut url, paging);
    Ok(url)
}
