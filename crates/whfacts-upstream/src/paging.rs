//! Lazy consumption of paginated collection endpoints.
//!
//! The upstream exposes two equivalent ways to walk a collection: the
//! client can recompute `limit`/`offset` itself, or follow the opaque
//! `meta.nextHref` reference the server embeds in each page. Both are
//! supported behind [`PageStrategy`] since it is unclear which the
//! production upstream guarantees.

use futures::stream::{self, Stream, TryStreamExt};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::client::UpstreamClient;
use crate::error::UpstreamError;

/// Maximum number of pages fetched per logical listing. Guards against
/// cycling continuation cursors.
const MAX_PAGES: usize = 500;

#[derive(Debug, Deserialize)]
pub struct PageMeta {
    #[serde(rename = "nextHref")]
    pub next_href: Option<String>,
}

/// One page of a collection endpoint: optional paging metadata plus rows.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct PagedEnvelope<T> {
    #[serde(default)]
    pub meta: Option<PageMeta>,
    #[serde(default)]
    pub rows: Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStrategy {
    /// Recompute `limit`/`offset` client-side; a page shorter than `limit`
    /// terminates the walk.
    Offset,
    /// Follow the server-supplied `meta.nextHref`; its absence terminates
    /// the walk.
    Continuation,
}

enum PageCursor {
    Offset { offset: u32 },
    Href(Url),
}

impl UpstreamClient {
    /// Lazily fetches every row of a paginated collection endpoint.
    ///
    /// The stream is finite and non-restartable. Pages are requested on
    /// demand and each page passes through the retry engine independently:
    /// rows already yielded survive a later page's transient failure, but
    /// the stream errors out if any page exhausts its retries.
    pub fn rows<'a, T>(
        &'a self,
        path: &str,
        filter: Option<&str>,
        limit: u32,
        strategy: PageStrategy,
    ) -> impl Stream<Item = Result<T, UpstreamError>> + 'a
    where
        T: DeserializeOwned + 'a,
    {
        let path = path.to_string();
        let filter = filter.map(str::to_string);

        stream::try_unfold(
            (Some(PageCursor::Offset { offset: 0 }), 0_usize),
            move |(cursor, pages)| {
                let path = path.clone();
                let filter = filter.clone();
                async move {
                    let Some(cursor) = cursor else {
                        return Ok(None);
                    };
                    if pages >= MAX_PAGES {
                        return Err(UpstreamError::PageLimit {
                            path,
                            max_pages: MAX_PAGES,
                        });
                    }

                    let (url, offset) = match cursor {
                        PageCursor::Offset { offset } => {
                            let limit_param = limit.to_string();
                            let offset_param = offset.to_string();
                            let mut params = vec![
                                ("limit", limit_param.as_str()),
                                ("offset", offset_param.as_str()),
                            ];
                            if let Some(f) = filter.as_deref() {
                                params.push(("filter", f));
                            }
                            (self.endpoint(&path, &params)?, offset)
                        }
                        PageCursor::Href(url) => (url, 0),
                    };

                    let envelope: PagedEnvelope<T> = self.get(url, &path).await?;
                    let short = envelope.rows.len() < limit as usize;

                    let next = match strategy {
                        PageStrategy::Offset => (!short).then_some(PageCursor::Offset {
                            offset: offset + limit,
                        }),
                        PageStrategy::Continuation => {
                            match envelope.meta.and_then(|m| m.next_href) {
                                Some(href) => Some(PageCursor::Href(Url::parse(&href).map_err(
                                    |e| UpstreamError::Malformed {
                                        context: path.clone(),
                                        reason: format!("bad continuation href \"{href}\": {e}"),
                                    },
                                )?)),
                                None => None,
                            }
                        }
                    };

                    Ok(Some((envelope.rows, (next, pages + 1))))
                }
            },
        )
        .map_ok(|rows| stream::iter(rows.into_iter().map(Ok)))
        .try_flatten()
    }
}
