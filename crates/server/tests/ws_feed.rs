//! WebSocket progress feed tests against a live listener.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_test::assert_ok;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use common::{fixtures, TestFixture};
use musify_core::testing::ProviderScript;
use musify_core::JobStatus;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: SocketAddr, job_id: &str) -> Client {
    let (client, _) = assert_ok!(connect_async(format!("ws://{}/ws/{}", addr, job_id)).await);
    client
}

/// Read text frames until the server closes the connection.
///
/// Returns the decoded frames and whether a close frame arrived.
async fn read_until_close(client: &mut Client) -> (Vec<Value>, bool) {
    let mut frames = Vec::new();
    loop {
        let next = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("server went silent");
        match next {
            Some(Ok(message @ Message::Text(_))) => {
                let text = message.to_text().unwrap();
                frames.push(serde_json::from_str(text).unwrap());
            }
            Some(Ok(Message::Close(_))) => return (frames, true),
            Some(Ok(_)) => {}
            Some(Err(_)) | None => return (frames, false),
        }
    }
}

#[tokio::test]
async fn test_ws_streams_entries_then_summary() {
    let fixture = TestFixture::with_providers(&["youtube-music", "youtube"]);
    fixture.acquirer.set_delay(Duration::from_millis(100)).await;
    fixture
        .acquirer
        .script("youtube", ProviderScript::files(&["One", "Two"]))
        .await;
    let addr = fixture.serve().await;

    let job_id = fixture.submit(fixtures::PLAYLIST_URL).await;
    let mut client = connect(addr, &job_id).await;
    let (frames, closed) = read_until_close(&mut client).await;
    assert!(closed);

    let phases: Vec<&str> = frames[..frames.len() - 1]
        .iter()
        .map(|f| f["phase"].as_str().unwrap())
        .collect();
    assert_eq!(
        phases,
        vec![
            "starting",
            "trying",
            "trying",
            "partial-success",
            "completed",
            "completed",
        ]
    );
    assert_eq!(frames[1]["label"], "youtube-music");
    assert_eq!(frames[4]["detail"], "Downloaded: One");

    let summary = frames.last().unwrap();
    assert_eq!(summary["status"], "completed");
    assert_eq!(summary["song_count"], 2);
    assert_eq!(
        summary["download_url"],
        format!("/api/download/{}/zip", job_id)
    );
    assert!(summary["error"].is_null());
}

#[tokio::test]
async fn test_ws_reports_failed_job() {
    let fixture = TestFixture::with_providers(&["youtube"]);
    let addr = fixture.serve().await;

    let job_id = fixture.submit(fixtures::ALBUM_URL).await;
    fixture.wait_for_terminal(&job_id).await;

    // A late subscriber replays the whole log
    let mut client = connect(addr, &job_id).await;
    let (frames, closed) = read_until_close(&mut client).await;
    assert!(closed);
    assert_eq!(frames.len(), 3);

    let summary = &frames[2];
    assert_eq!(summary["status"], "failed");
    assert_eq!(summary["error"], "all providers exhausted: youtube");
    assert!(summary["download_url"].is_null());
}

#[tokio::test]
async fn test_ws_unknown_job_sends_single_error() {
    let fixture = TestFixture::new();
    let addr = fixture.serve().await;

    let mut client = connect(addr, "no-such-job").await;
    let (frames, closed) = read_until_close(&mut client).await;

    assert!(closed);
    assert_eq!(frames, vec![serde_json::json!({ "error": "job not found" })]);
}

#[tokio::test]
async fn test_ws_client_close_ends_subscription() {
    let fixture = TestFixture::with_providers(&["youtube"]);
    fixture.acquirer.set_delay(Duration::from_secs(3)).await;
    fixture
        .acquirer
        .script("youtube", ProviderScript::files(&["Song"]))
        .await;
    let addr = fixture.serve().await;

    let job_id = fixture.submit(fixtures::PLAYLIST_URL).await;
    let mut client = connect(addr, &job_id).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_ok!(client.close(None).await);

    // The server stops forwarding well before the job could finish
    let (frames, _) = timeout(Duration::from_secs(2), read_until_close(&mut client))
        .await
        .expect("subscription did not end after client close");
    assert!(frames.iter().all(|f| f.get("phase").is_some()));

    let status = fixture.state.orchestrator().status(&job_id).unwrap().status;
    assert_eq!(status, JobStatus::Running);
}
