//! 단일 인스턴스 IPC 통합 테스트
//!
//! 임시 디렉터리에 소켓을 만들고 실제 Unix 소켓으로 명령을 주고받습니다.

#![cfg(unix)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pastemd_core::ipc::{send_command, socket_path, InstanceCommand, IpcError, IpcServer};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::sync::watch;

/// 서버를 띄우고 (수신 명령 기록, 종료 송신기, 서버 태스크)를 돌려줍니다.
fn spawn_server(
    dir: &TempDir,
) -> (
    std::path::PathBuf,
    Arc<Mutex<Vec<InstanceCommand>>>,
    watch::Sender<bool>,
    tokio::task::JoinHandle<()>,
) {
    let path = socket_path("PasteMD-test", dir.path());
    let server = IpcServer::bind(&path).unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = watch::channel(false);

    let sink = received.clone();
    let handle = tokio::spawn(async move {
        server
            .run(
                move |cmd| {
                    if let InstanceCommand::Other(ref s) = cmd {
                        if s == "boom" {
                            sink.lock().unwrap().push(cmd.clone());
                            anyhow::bail!("handler failure");
                        }
                    }
                    sink.lock().unwrap().push(cmd);
                    Ok(())
                },
                rx,
            )
            .await;
    });

    (path, received, tx, handle)
}

async fn wait_for(received: &Arc<Mutex<Vec<InstanceCommand>>>, count: usize) {
    for _ in 0..100 {
        if received.lock().unwrap().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {} commands", count);
}

#[tokio::test]
async fn test_command_reaches_handler_trimmed() {
    let dir = tempfile::tempdir().unwrap();
    let (path, received, tx, handle) = spawn_server(&dir);

    send_command(&path, "  show-settings  ").await.unwrap();
    send_command(&path, "paste").await.unwrap();
    wait_for(&received, 2).await;

    assert_eq!(
        *received.lock().unwrap(),
        vec![
            InstanceCommand::ShowSettings,
            InstanceCommand::Other("paste".to_string())
        ]
    );

    tx.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_blank_command_is_dropped_and_handler_errors_do_not_stop_loop() {
    let dir = tempfile::tempdir().unwrap();
    let (path, received, tx, handle) = spawn_server(&dir);

    send_command(&path, "   ").await.unwrap();
    send_command(&path, "boom").await.unwrap();
    send_command(&path, "quit").await.unwrap();
    wait_for(&received, 2).await;

    assert_eq!(
        *received.lock().unwrap(),
        vec![
            InstanceCommand::Other("boom".to_string()),
            InstanceCommand::Quit
        ]
    );

    tx.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_line_is_handled_while_client_keeps_connection_open() {
    let dir = tempfile::tempdir().unwrap();
    let (path, received, tx, handle) = spawn_server(&dir);

    let mut stream = UnixStream::connect(&path).await.unwrap();
    stream.write_all(b"show-settings\n").await.unwrap();
    // 연결을 닫기 전에 처리되어야 함
    wait_for(&received, 1).await;
    drop(stream);

    assert_eq!(*received.lock().unwrap(), vec![InstanceCommand::ShowSettings]);

    send_command(&path, "quit").await.unwrap();
    wait_for(&received, 2).await;
    assert_eq!(received.lock().unwrap()[1], InstanceCommand::Quit);

    tx.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_only_first_line_of_connection_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let (path, received, tx, handle) = spawn_server(&dir);

    let mut stream = UnixStream::connect(&path).await.unwrap();
    stream.write_all(b"hide-settings\nquit\n").await.unwrap();
    stream.shutdown().await.unwrap();
    wait_for(&received, 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(*received.lock().unwrap(), vec![InstanceCommand::HideSettings]);

    tx.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_dropping_old_server_keeps_newer_socket() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path("PasteMD-test", dir.path());

    let old = IpcServer::bind(&path).unwrap();
    let newer = IpcServer::bind(&path).unwrap();
    drop(old);
    assert!(path.exists());

    drop(newer);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_shutdown_removes_socket_file() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _received, tx, handle) = spawn_server(&dir);
    assert!(path.exists());

    tx.send(true).unwrap();
    handle.await.unwrap();
    assert!(!path.exists());

    let err = send_command(&path, "show-settings").await.unwrap_err();
    assert!(matches!(err, IpcError::NotRunning(_)));
}

#[tokio::test]
async fn test_stale_socket_file_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path("PasteMD-test", dir.path());
    std::fs::write(&path, b"stale").unwrap();

    let (path, received, tx, handle) = spawn_server(&dir);
    send_command(&path, "hide-settings").await.unwrap();
    wait_for(&received, 1).await;
    assert_eq!(received.lock().unwrap()[0], InstanceCommand::HideSettings);

    tx.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_send_without_server_is_not_running() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path("nobody", dir.path());
    let err = send_command(&path, "show-settings").await.unwrap_err();
    assert!(matches!(err, IpcError::NotRunning(_)));
}
