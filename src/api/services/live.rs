//! Live scan updates over Server-Sent Events
//!
//! `GET /events` keeps the connection open and writes one `scanUpdate`
//! event per committed scan. Comment lines are sent on connect and as a
//! periodic keep-alive.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE, ContentEncoding};
use actix_web::{HttpResponse, web};
use bytes::Bytes;
use futures_util::Stream;
use futures_util::stream;
use tokio::time::{Instant, Interval, interval_at};
use tracing::warn;

use crate::config::get_config;
use crate::services::{LiveHub, ScanUpdate, Subscription};

pub const SCAN_UPDATE_EVENT: &str = "scanUpdate";

const CONNECTED_COMMENT: &[u8] = b": connected\n\n";
const KEEP_ALIVE_COMMENT: &[u8] = b": keep-alive\n\n";

/// 将一次计数变更编码为 SSE 帧
pub fn sse_frame(update: &ScanUpdate) -> Result<Bytes, serde_json::Error> {
    let data = serde_json::to_string(update)?;
    Ok(Bytes::from(format!(
        "event: {}\ndata: {}\n\n",
        SCAN_UPDATE_EVENT, data
    )))
}

struct LiveStreamState {
    subscription: Subscription,
    keep_alive: Interval,
    greeted: bool,
}

/// 订阅者的事件流；流被丢弃（客户端断开）时自动退出订阅组
pub fn live_stream(
    subscription: Subscription,
    keep_alive: Duration,
) -> impl Stream<Item = Result<Bytes, actix_web::Error>> {
    let state = LiveStreamState {
        subscription,
        keep_alive: interval_at(Instant::now() + keep_alive, keep_alive),
        greeted: false,
    };

    stream::unfold(state, |mut state| async move {
        if !state.greeted {
            state.greeted = true;
            return Some((Ok(Bytes::from_static(CONNECTED_COMMENT)), state));
        }

        loop {
            tokio::select! {
                update = state.subscription.recv() => {
                    let Some(update) = update else {
                        return None;
                    };
                    match sse_frame(&update) {
                        Ok(frame) => return Some((Ok(frame), state)),
                        Err(e) => warn!("Failed to encode scan update: {}", e),
                    }
                }
                _ = state.keep_alive.tick() => {
                    return Some((Ok(Bytes::from_static(KEEP_ALIVE_COMMENT)), state));
                }
            }
        }
    })
}

pub struct LiveService;

impl LiveService {
    /// GET /events
    pub async fn events(hub: web::Data<Arc<LiveHub>>) -> HttpResponse {
        let keep_alive = Duration::from_secs(get_config().live.keep_alive_secs.max(1));
        let subscription = hub.subscribe();

        HttpResponse::Ok()
            .insert_header((CONTENT_TYPE, "text/event-stream"))
            .insert_header((CACHE_CONTROL, "no-cache"))
            .insert_header(ContentEncoding::Identity)
            .insert_header(("X-Accel-Buffering", "no"))
            .streaming(live_stream(subscription, keep_alive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::UpdateBroadcaster;
    use futures_util::StreamExt;

    #[test]
    fn test_sse_frame_format() {
        let frame = sse_frame(&ScanUpdate {
            code_id: "abc".to_string(),
            scan_count: 3,
        })
        .unwrap();
        assert_eq!(
            frame,
            Bytes::from_static(b"event: scanUpdate\ndata: {\"codeId\":\"abc\",\"scanCount\":3}\n\n")
        );
    }

    #[tokio::test]
    async fn test_stream_greets_then_forwards_updates() {
        let hub = LiveHub::new(8);
        let stream = live_stream(hub.subscribe(), Duration::from_secs(60));
        futures_util::pin_mut!(stream);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first, Bytes::from_static(CONNECTED_COMMENT));

        hub.publish(ScanUpdate {
            code_id: "abc".to_string(),
            scan_count: 1,
        });
        let frame = stream.next().await.unwrap().unwrap();
        assert!(frame.starts_with(b"event: scanUpdate\n"));
    }

    #[tokio::test]
    async fn test_stream_sends_keep_alive() {
        let hub = LiveHub::new(8);
        let stream = live_stream(hub.subscribe(), Duration::from_millis(20));
        futures_util::pin_mut!(stream);

        stream.next().await.unwrap().unwrap();
        let next = stream.next().await.unwrap().unwrap();
        assert_eq!(next, Bytes::from_static(KEEP_ALIVE_COMMENT));
    }

    #[tokio::test]
    async fn test_dropping_stream_leaves_group() {
        let hub = LiveHub::new(8);
        let stream = live_stream(hub.subscribe(), Duration::from_secs(60));
        assert_eq!(hub.subscriber_count(), 1);
        drop(stream);
        assert_eq!(hub.subscriber_count(), 0);
    }
}
