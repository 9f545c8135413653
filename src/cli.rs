//! `pastemd` CLI
//!
//! ## 사용법
//! ```text
//! pastemd check                       # 업데이트 확인
//! pastemd check --json                # JSON 출력
//! pastemd check --notify              # 알림용 한 줄 출력
//! pastemd check --current <version>   # 현재 버전 지정
//! pastemd compare <latest> <current>  # 두 버전 비교
//! pastemd parse <version>             # 정규화된 버전 키 표시
//! pastemd send <command>              # 실행 중인 인스턴스에 명령 전달
//! pastemd listen                      # 단일 인스턴스 서버 실행
//! pastemd config                      # 설정 표시
//! pastemd config set <key> <value>    # 설정 변경
//! pastemd help                        # 도움말
//! ```
//!
//! 모든 명령 앞에 `--config <path>`로 설정 파일을 지정할 수 있습니다.
//!
//! ## 종료 코드 (check, compare)
//! - `0` — 업데이트 있음 / 더 새로움
//! - `1` — 에러
//! - `2` — 업데이트 없음 / 새롭지 않음

use std::path::PathBuf;

use pastemd_core::config::{config_file_path, set_config_value, AppConfig};
use pastemd_core::updater::{checker, version, ParsedVersion};
use pastemd_core::APP_VERSION;

/// CLI 실행 — 프로세스 종료 코드를 돌려줍니다.
pub fn run_cli(args: Vec<String>) -> i32 {
    // stderr로 출력하여 stdout의 JSON을 오염시키지 않음
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create tokio runtime: {}", e);
            return 1;
        }
    };

    rt.block_on(async move {
        match run_cli_async(args).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("✗ Error: {}", e);
                1
            }
        }
    })
}

async fn run_cli_async(mut args: Vec<String>) -> anyhow::Result<i32> {
    let config_override = take_option(&mut args, "--config").map(PathBuf::from);
    let args_ref: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    if args_ref.is_empty() || matches!(args_ref[0], "help" | "--help" | "-h") {
        print_help();
        return Ok(0);
    }

    if matches!(args_ref[0], "--version" | "-V") {
        println!("pastemd {}", APP_VERSION);
        return Ok(0);
    }

    let config_path = config_file_path(config_override.as_deref());

    match args_ref[0] {
        "check" => {
            let cfg = AppConfig::load(&config_path)?;
            cmd_check(&cfg, &args_ref[1..]).await
        }
        "compare" => cmd_compare(&args_ref[1..]),
        "parse" => cmd_parse(&args_ref[1..]),
        "send" => {
            let cfg = AppConfig::load(&config_path)?;
            cmd_send(&cfg, &args_ref[1..]).await
        }
        "listen" => {
            let cfg = AppConfig::load(&config_path)?;
            cmd_listen(&cfg).await
        }
        "config" => cmd_config(&config_path, &args_ref[1..]),
        other => {
            eprintln!("✗ Unknown command: {}", other);
            eprintln!("  Run 'pastemd help' for usage.");
            Ok(1)
        }
    }
}

/// `--flag value` 쌍을 인자 목록에서 꺼냅니다.
fn take_option(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let idx = args.iter().position(|a| a == flag)?;
    if idx + 1 >= args.len() {
        args.remove(idx);
        return None;
    }
    let value = args.remove(idx + 1);
    args.remove(idx);
    Some(value)
}

// ═══════════════════════════════════════════════════════
// 명령어 핸들러
// ═══════════════════════════════════════════════════════

async fn cmd_check(cfg: &AppConfig, flags: &[&str]) -> anyhow::Result<i32> {
    let json_mode = flags.contains(&"--json");
    let notify_mode = flags.contains(&"--notify");
    let current = flags
        .iter()
        .position(|f| *f == "--current")
        .and_then(|i| flags.get(i + 1))
        .copied()
        .unwrap_or(APP_VERSION);

    let result = match pastemd_core::updater::checker_from_config(&cfg.updater, current) {
        Ok(c) => c.check_update().await,
        Err(e) => Err(e),
    };

    if json_mode {
        println!("{}", checker::result_to_json(&result));
        return Ok(checker::exit_code(&result));
    }

    if notify_mode {
        match &result {
            Ok(check) if check.has_update => {
                println!("UPDATE_AVAILABLE|{}|{}", check.latest_version, check.current_version);
            }
            Err(e) => eprintln!("CHECK_ERROR|{}", e),
            Ok(_) => {}
        }
        return Ok(checker::exit_code(&result));
    }

    // 대화형 모드
    match &result {
        Ok(check) if check.has_update => {
            println!("⬆ New version available: {} → {}", check.current_version, check.latest_version);
            if let Some(url) = &check.release_url {
                println!("  {}", url);
            }
            if let Some(notes) = &check.release_notes {
                println!();
                for line in notes.lines() {
                    println!("  {}", line);
                }
            }
        }
        Ok(check) => {
            println!("✓ Already on latest version ({})", check.current_version);
        }
        Err(e) => {
            eprintln!("✗ Check failed: {}", e);
            eprintln!("  {}", e.user_message());
        }
    }
    Ok(checker::exit_code(&result))
}

fn cmd_compare(args: &[&str]) -> anyhow::Result<i32> {
    let [latest, current] = args else {
        anyhow::bail!("Usage: pastemd compare <latest> <current>");
    };
    if version::is_newer(latest, current) {
        println!("newer");
        Ok(0)
    } else {
        println!("not newer");
        Ok(2)
    }
}

fn cmd_parse(args: &[&str]) -> anyhow::Result<i32> {
    let raw = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: pastemd parse <version>"))?;

    let parsed = ParsedVersion::parse(raw);
    println!("version:   {}", parsed);
    println!("segments:  {:?}", parsed.numeric_segments);
    println!("rank:      {}", parsed.pre_release_rank.as_str());
    println!("number:    {}", parsed.pre_release_number);
    if let Err(warning) = ParsedVersion::parse_checked(raw) {
        println!("warning:   {}", warning);
    }
    Ok(0)
}

async fn cmd_send(cfg: &AppConfig, args: &[&str]) -> anyhow::Result<i32> {
    if args.is_empty() {
        anyhow::bail!("Usage: pastemd send <command>");
    }
    let command = args.join(" ");
    let path = cfg.ipc.socket_path();
    pastemd_core::ipc::send_command(&path, &command).await?;
    println!("✓ Sent '{}' to {}", command.trim(), path.display());
    Ok(0)
}

#[cfg(unix)]
async fn cmd_listen(cfg: &AppConfig) -> anyhow::Result<i32> {
    use pastemd_core::ipc::{send_command, InstanceCommand, IpcServer};
    use pastemd_core::ui_session::{TracingDock, UiSessionTracker};
    use std::sync::Arc;

    let path = cfg.ipc.socket_path();

    // 이미 실행 중이면 설정 창을 띄우게 하고 종료
    if send_command(&path, InstanceCommand::ShowSettings.as_str()).await.is_ok() {
        tracing::info!("[IPC] Another instance is running, asked it to show settings");
        return Ok(0);
    }

    let server = IpcServer::bind(&path)?;
    let tracker = UiSessionTracker::new(TracingDock);
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            let _ = ctrl_c_tx.send(true);
        }
    });

    let handler = |command: InstanceCommand| -> anyhow::Result<()> {
        match command {
            InstanceCommand::ShowSettings => {
                tracker.begin();
            }
            InstanceCommand::HideSettings => {
                tracker.end();
            }
            InstanceCommand::Quit => {
                let _ = shutdown_tx.send(true);
            }
            InstanceCommand::Other(other) => {
                anyhow::bail!("Unknown command '{}'", other);
            }
        }
        Ok(())
    };

    server.run(handler, shutdown_rx).await;
    Ok(0)
}

#[cfg(not(unix))]
async fn cmd_listen(_cfg: &AppConfig) -> anyhow::Result<i32> {
    Err(pastemd_core::ipc::IpcError::Unsupported.into())
}

fn cmd_config(path: &std::path::Path, args: &[&str]) -> anyhow::Result<i32> {
    match args {
        [] => {
            let cfg = AppConfig::load(path)?;
            println!("# {}", path.display());
            println!("{}", toml::to_string_pretty(&cfg)?);
            Ok(0)
        }
        ["set", key, value] => {
            set_config_value(path, key, value)?;
            println!("✓ {} = {}", key, value);
            Ok(0)
        }
        _ => {
            eprintln!("Usage: pastemd config [set <key> <value>]");
            Ok(1)
        }
    }
}

fn print_help() {
    println!("pastemd {}", APP_VERSION);
    println!();
    println!("USAGE:");
    println!("  pastemd [--config <path>] <command> [args]");
    println!();
    println!("COMMANDS:");
    println!("  check [--json|--notify] [--current <ver>]  Check GitHub for a newer release");
    println!("  compare <latest> <current>                Exit 0 if <latest> is newer");
    println!("  parse <version>                           Show the normalized version key");
    println!("  send <command>                            Send a command to the running instance");
    println!("  listen                                    Run the single-instance server");
    println!("  config [set <key> <value>]                Show or change configuration");
    println!("  help                                      Show this help");
}
