// Display and controller sockets against a real server.

mod common;
mod support;

use std::time::Duration;

use serde_json::json;
use support::websocket::{start_test_server, wait_until};
use support::websocket_client::WebSocketClient;
use support::TestRepo;

const CONNECT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn display_receives_state_on_connect() -> Result<(), Box<dyn std::error::Error>> {
    let repo = TestRepo::new();
    let (server_handle, addr, server_join) = start_test_server(repo.state()).await?;

    let mut display = WebSocketClient::connect_retry(&format!("ws://{addr}/ws"), CONNECT).await?;
    let state = display.recv_json().await?;
    assert_eq!(state["type"], "STATE");
    assert_eq!(state["payload"]["coins"], json!([0, 0, 0, 0]));
    assert_eq!(state["payload"]["activeRun"], serde_json::Value::Null);

    display.close().await?;
    server_handle.stop(true).await;
    let _ = server_join.await;
    Ok(())
}

#[tokio::test]
async fn controllers_fill_slots_and_free_them_on_disconnect(
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = TestRepo::new();
    let state = repo.state();
    let controllers = state.controllers().clone();
    let (server_handle, addr, server_join) = start_test_server(state).await?;
    let url = format!("ws://{addr}/ws/controller");

    let mut phones = Vec::new();
    for expected in 1..=4u8 {
        let mut phone = WebSocketClient::connect_retry(&url, CONNECT).await?;
        let availability = phone.recv_type("PLAYER_AVAILABILITY").await?;
        assert_eq!(
            availability["takenPlayers"].as_array().map(Vec::len),
            Some(usize::from(expected - 1))
        );

        phone.send_json(&json!({"type": "JOIN"})).await?;
        let joined = phone.recv_type("JOINED").await?;
        assert_eq!(joined["player"], expected);
        assert_eq!(
            joined["controlHints"],
            json!(["up", "down", "left", "right", "action"])
        );
        phones.push(phone);
    }

    let mut fifth = WebSocketClient::connect_retry(&url, CONNECT).await?;
    fifth.send_json(&json!({"type": "JOIN", "player": 1})).await?;
    let failed = fifth.recv_type("JOIN_FAILED").await?;
    assert_eq!(failed["error"], "All slots full");

    phones[1].close().await?;
    wait_until("slot 2 to free", Duration::from_secs(2), || {
        controllers.taken_players() == [1, 3, 4]
    })
    .await?;

    let left = phones[0].recv_type("CONTROLLER_LEFT").await?;
    assert_eq!(left["player"], 2);

    fifth.send_json(&json!({"type": "JOIN"})).await?;
    let joined = fifth.recv_type("JOINED").await?;
    assert_eq!(joined["player"], 2);

    server_handle.stop(true).await;
    let _ = server_join.await;
    Ok(())
}

#[tokio::test]
async fn control_before_join_is_refused() -> Result<(), Box<dyn std::error::Error>> {
    let repo = TestRepo::new();
    let (server_handle, addr, server_join) = start_test_server(repo.state()).await?;

    let mut phone =
        WebSocketClient::connect_retry(&format!("ws://{addr}/ws/controller"), CONNECT).await?;
    phone
        .send_json(&json!({"type": "CONTROL", "button": "up", "pressed": true}))
        .await?;
    let err = phone.recv_type("ERROR").await?;
    assert_eq!(err["code"], "NOT_JOINED");

    server_handle.stop(true).await;
    let _ = server_join.await;
    Ok(())
}

#[tokio::test]
async fn malformed_frames_keep_the_socket_open() -> Result<(), Box<dyn std::error::Error>> {
    let repo = TestRepo::new();
    let (server_handle, addr, server_join) = start_test_server(repo.state()).await?;

    let mut display = WebSocketClient::connect_retry(&format!("ws://{addr}/ws"), CONNECT).await?;
    display.recv_type("STATE").await?;
    display.send("{{{").await?;
    let err = display.recv_type("ERROR").await?;
    assert_eq!(err["code"], "BAD_REQUEST");

    let mut phone =
        WebSocketClient::connect_retry(&format!("ws://{addr}/ws/controller"), CONNECT).await?;
    phone.send("not json").await?;
    let err = phone.recv_type("ERROR").await?;
    assert_eq!(err["code"], "BAD_REQUEST");

    // Still usable afterwards.
    phone.send_json(&json!({"type": "JOIN", "player": 3})).await?;
    let joined = phone.recv_type("JOINED").await?;
    assert_eq!(joined["player"], 3);

    server_handle.stop(true).await;
    let _ = server_join.await;
    Ok(())
}

#[tokio::test]
async fn browser_game_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let repo = TestRepo::new();
    repo.add_browser_game("mg-bubbles");
    let state = repo.state();
    let dispatcher = state.dispatcher().clone();
    let hub = state.hub().clone();
    let (server_handle, addr, server_join) = start_test_server(state).await?;

    let mut display = WebSocketClient::connect_retry(&format!("ws://{addr}/ws"), CONNECT).await?;
    display.recv_type("STATE").await?;
    let mut phone =
        WebSocketClient::connect_retry(&format!("ws://{addr}/ws/controller"), CONNECT).await?;
    phone.send_json(&json!({"type": "JOIN", "player": 4})).await?;
    phone.recv_type("JOINED").await?;
    wait_until("both sockets registered", Duration::from_secs(2), || {
        hub.display_count() == 1 && hub.controller_count() == 1
    })
    .await?;

    dispatcher.run("mg-bubbles").await?;
    let load = display.recv_type("LOAD_GAME").await?;
    assert_eq!(load["payload"]["game"]["id"], "mg-bubbles");
    assert_eq!(load["payload"]["mode"], "browser");
    let run_id = load["payload"]["runId"].clone();

    phone
        .send_json(&json!({"type": "CONTROL", "button": "action", "pressed": true}))
        .await?;
    let control = display.recv_type("MOBILE_CONTROL").await?;
    assert_eq!(control["player"], 4);
    assert_eq!(control["button"], "action");
    assert_eq!(control["pressed"], true);

    display
        .send_json(&json!({
            "type": "RESULT",
            "payload": {"gameId": "mg-bubbles", "scores": [1, 2, 3, 40]}
        }))
        .await?;
    let ended = display.recv_type("GAME_ENDED").await?;
    assert_eq!(ended["payload"]["runId"], run_id);
    assert_eq!(ended["payload"]["outcome"], "settled");
    let prizes = display.recv_type("PRIZES_AWARDED").await?;
    assert_eq!(prizes["payload"]["prizes"]["winnerIndex"], 3);

    let phone_view = phone.recv_type("PRIZES_AWARDED").await?;
    assert_eq!(phone_view["payload"]["runId"], run_id);

    assert!(dispatcher.active_run().is_none());
    assert_eq!(dispatcher.snapshot().state.stars, [0, 0, 0, 1]);

    server_handle.stop(true).await;
    let _ = server_join.await;
    Ok(())
}
