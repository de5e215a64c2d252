//! Lazy projection of a backend result stream
//!
//! The projected stream pulls one backend element per consumer poll, maps
//! it, and hands it on. It stops pulling as soon as the cancellation token
//! fires, and ends right after the first error it yields.

use super::mapper::MappingErrorPolicy;
use crate::error::{SearchResult, TextSearchError};
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use textsearch_common::CorrelationId;
use textsearch_vector_data::{VectorDataError, VectorSearchStream};
use tokio_util::sync::CancellationToken;

struct Projection<R, F> {
    source: VectorSearchStream<R>,
    map: F,
    cancellation: CancellationToken,
    correlation_id: CorrelationId,
    policy: MappingErrorPolicy,
    index: usize,
    finished: bool,
}

/// Wrap `source` so each element is passed through `map`
pub(crate) fn project<R, T, F>(
    source: VectorSearchStream<R>,
    map: F,
    cancellation: CancellationToken,
    correlation_id: CorrelationId,
    policy: MappingErrorPolicy,
) -> BoxStream<'static, SearchResult<T>>
where
    R: Send + 'static,
    T: Send + 'static,
    F: FnMut(R) -> anyhow::Result<T> + Send + 'static,
{
    let state = Projection {
        source,
        map,
        cancellation,
        correlation_id,
        policy,
        index: 0,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if state.finished {
                return None;
            }

            let next = tokio::select! {
                biased;
                () = state.cancellation.cancelled() => {
                    tracing::debug!(
                        correlation_id = %state.correlation_id,
                        produced = state.index,
                        "Search cancelled, ending result stream"
                    );
                    return None;
                }
                next = state.source.next() => next,
            };

            let Some(next) = next else {
                tracing::debug!(
                    correlation_id = %state.correlation_id,
                    produced = state.index,
                    "Search result stream exhausted"
                );
                return None;
            };

            let index = state.index;
            state.index = state.index.saturating_add(1);

            match next {
                Ok(ranked) => match (state.map)(ranked.record) {
                    Ok(item) => return Some((Ok(item), state)),
                    Err(source) => match state.policy {
                        MappingErrorPolicy::Skip => {
                            tracing::warn!(
                                correlation_id = %state.correlation_id,
                                index,
                                error = %format!("{source:#}"),
                                "Skipping search result that failed to map"
                            );
                        }
                        MappingErrorPolicy::Propagate => {
                            state.finished = true;
                            return Some((Err(TextSearchError::Mapping { index, source }), state));
                        }
                    },
                },
                Err(VectorDataError::Cancelled(_)) if state.cancellation.is_cancelled() => {
                    return None;
                }
                Err(source) => {
                    tracing::warn!(
                        correlation_id = %state.correlation_id,
                        index,
                        error = %source,
                        "Search backend failed mid-stream"
                    );
                    state.finished = true;
                    let correlation_id = state.correlation_id.clone();
                    return Some((
                        Err(TextSearchError::Backend {
                            correlation_id,
                            source,
                        }),
                        state,
                    ));
                }
            }
        }
    })
    .boxed()
}
