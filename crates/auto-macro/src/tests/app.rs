use crate::AppCommand;

use tokio::sync::mpsc;

/// WHAT: Sending a command after the app loop is gone fails cleanly
/// WHY: Surfaces must degrade to a logged warning, never a crash
#[tokio::test]
async fn given_closed_channel_when_sending_then_error() {
    // Given: A command channel whose consumer is gone
    let (command_tx, command_rx) = mpsc::channel(1);
    drop(command_rx);

    // When: Sending a trigger
    let result = command_tx
        .send(AppCommand::Play {
            name: "anything".into(),
        })
        .await;

    // Then: The send fails instead of hanging
    assert!(result.is_err());
}

/// WHAT: A full command queue rejects try_send instead of blocking
/// WHY: The hotkey listener must never block the hook path on a slow app
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_full_queue_when_try_sending_then_rejected_not_blocked() {
    // Given: A queue of capacity 1, already full
    let (command_tx, mut command_rx) = mpsc::channel(1);
    command_tx
        .send(AppCommand::Play { name: "one".into() })
        .await
        .unwrap();

    // When: A second trigger arrives while the app is busy
    let result = command_tx.try_send(AppCommand::Play { name: "two".into() });

    // Then: It is dropped with an error; the queued command is intact
    assert!(result.is_err());
    assert!(matches!(
        command_rx.recv().await,
        Some(AppCommand::Play { ref name }) if name == "one"
    ));
}
