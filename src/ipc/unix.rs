use std::io::ErrorKind;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::watch;

use super::{InstanceCommand, IpcError, CONNECT_TIMEOUT, MAX_COMMAND_BYTES};

/// 실행 중인 인스턴스에 명령 한 줄을 보냅니다.
pub async fn send_command(path: &Path, command: &str) -> Result<(), IpcError> {
    let send = async {
        let mut stream = UnixStream::connect(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::ConnectionRefused => {
                IpcError::NotRunning(path.to_path_buf())
            }
            _ => IpcError::Io(e),
        })?;
        let line = format!("{}\n", command.trim());
        stream.write_all(line.as_bytes()).await?;
        stream.shutdown().await?;
        Ok(())
    };

    let result = match tokio::time::timeout(CONNECT_TIMEOUT, send).await {
        Ok(r) => r,
        Err(_) => Err(IpcError::Timeout(CONNECT_TIMEOUT)),
    };
    if let Err(ref e) = result {
        tracing::debug!("[IPC] send failed: {}", e);
    }
    result
}

/// 백그라운드 명령 수신 서버
///
/// 드롭될 때 소켓 파일을 지웁니다. 그 사이 다른 인스턴스가 같은 경로에
/// 새로 바인드했다면 (dev, inode)가 달라지므로 건드리지 않습니다.
pub struct IpcServer {
    listener: UnixListener,
    path: PathBuf,
    file_id: Option<(u64, u64)>,
}

impl IpcServer {
    /// 남아 있는 소켓 파일을 지우고 바인드합니다. tokio 런타임 안에서 호출해야 합니다.
    pub fn bind(path: &Path) -> Result<Self, IpcError> {
        if path.exists() {
            if let Err(e) = std::fs::remove_file(path) {
                tracing::warn!("[IPC] Failed to remove stale socket {}: {}", path.display(), e);
            }
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(path)?;
        tracing::info!("[IPC] Listening on {}", path.display());
        Ok(Self {
            listener,
            path: path.to_path_buf(),
            file_id: file_id(path),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 수락 루프. `shutdown`이 `true`가 되거나 송신측이 드롭되면 멈춥니다.
    ///
    /// 핸들러 에러는 로그만 남기고 루프를 계속합니다.
    pub async fn run<F>(self, mut handler: F, mut shutdown: watch::Receiver<bool>)
    where
        F: FnMut(InstanceCommand) -> anyhow::Result<()>,
    {
        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                accepted = self.listener.accept() => {
                    let stream = match accepted {
                        Ok((stream, _)) => stream,
                        Err(e) => {
                            tracing::error!("[IPC] accept failed: {}", e);
                            break;
                        }
                    };

                    match read_command(stream).await {
                        Ok(Some(command)) => {
                            tracing::info!("[IPC] Received command: {}", command);
                            if let Err(e) = handler(command) {
                                tracing::error!("[IPC] handler error: {}", e);
                            }
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!("[IPC] failed to read command: {}", e),
                    }
                }
            }
        }

        tracing::info!("[IPC] Server stopped");
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let current = file_id(&self.path);
        if current.is_none() {
            return;
        }
        if current != self.file_id {
            tracing::debug!(
                "[IPC] Socket {} belongs to another instance, leaving it",
                self.path.display()
            );
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!("[IPC] Failed to remove socket {}: {}", self.path.display(), e);
        }
    }
}

fn file_id(path: &Path) -> Option<(u64, u64)> {
    std::fs::symlink_metadata(path)
        .ok()
        .map(|meta| (meta.dev(), meta.ino()))
}

/// 첫 줄바꿈이나 연결 종료까지 읽습니다 (최대 `MAX_COMMAND_BYTES`).
async fn read_command(stream: UnixStream) -> Result<Option<InstanceCommand>, IpcError> {
    let mut buf = Vec::new();
    let mut reader = BufReader::new(stream.take(MAX_COMMAND_BYTES));
    match tokio::time::timeout(CONNECT_TIMEOUT, reader.read_until(b'\n', &mut buf)).await {
        Ok(r) => {
            r?;
        }
        Err(_) => return Err(IpcError::Timeout(CONNECT_TIMEOUT)),
    }

    let text = String::from_utf8_lossy(&buf);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(InstanceCommand::parse(trimmed)))
}
