//! Automation-server and tunnel supervisors against stand-in `sh` processes
#![cfg(unix)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use keystone_e2e::selenium::{SeleniumConfig, SeleniumServer, DEFAULT_READY_LINE};
use keystone_e2e::tunnel::{SauceConnect, TunnelClient, TunnelOptions, TunnelSupervisor};
use keystone_e2e::E2eError;

fn shell(script: &str) -> SeleniumConfig {
    SeleniumConfig {
        program: PathBuf::from("sh"),
        args: vec!["-c".to_string(), script.to_string()],
        env: BTreeMap::new(),
        ready_line: DEFAULT_READY_LINE.to_string(),
        startup_timeout: Some(Duration::from_secs(10)),
        term_grace: Duration::from_millis(200),
    }
}

#[tokio::test]
async fn ready_line_on_stderr_starts_server() {
    let config = shell(
        "echo 'INFO - Launching a standalone server' >&2; \
         echo 'noise on stdout'; \
         echo 'INFO - Selenium Server is up and running on port 4444' >&2; \
         exec sleep 30",
    );

    let mut server = SeleniumServer::spawn(&config).await.unwrap();
    assert!(server.is_running());
    assert!(server.pid().is_some());

    server.stop().await.unwrap();
    assert!(!server.is_running());
    server.stop().await.unwrap();
}

#[tokio::test]
async fn exit_before_ready_reports_exit_code() {
    let config = shell("echo 'Exception: port 4444 in use' >&2; exit 3");

    let err = SeleniumServer::spawn(&config).await.err().unwrap();

    assert!(matches!(err, E2eError::SeleniumExited { code: Some(3), .. }));
    assert_eq!(err.to_string(), "Selenium exited with error code 3");
}

#[tokio::test]
async fn invalid_utf8_before_ready_line_is_tolerated() {
    let config = shell(
        "printf 'caf\\351 locale\\n' >&2; \
         echo 'Selenium Server is up and running' >&2; \
         exec sleep 30",
    );

    let mut server = SeleniumServer::spawn(&config).await.unwrap();
    assert!(server.is_running());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn killed_mid_startup_reports_signal() {
    let config = shell("echo 'INFO - Launching a standalone server' >&2; kill -9 $$");

    let err = SeleniumServer::spawn(&config).await.err().unwrap();

    assert!(matches!(
        err,
        E2eError::SeleniumExited {
            code: None,
            signal: Some(9)
        }
    ));
    assert_eq!(err.to_string(), "Selenium exited with error code null (signal 9)");
}

#[tokio::test]
async fn ready_line_on_stdout_does_not_count() {
    let mut config = shell("echo 'Selenium Server is up and running'; exit 0");
    config.startup_timeout = Some(Duration::from_secs(5));

    let err = SeleniumServer::spawn(&config).await.err().unwrap();

    assert!(matches!(err, E2eError::SeleniumExited { code: Some(0), .. }));
}

#[tokio::test]
async fn silent_server_hits_startup_timeout() {
    let mut config = shell("exec sleep 30");
    config.startup_timeout = Some(Duration::from_millis(300));

    let err = SeleniumServer::spawn(&config).await.err().unwrap();

    assert!(matches!(err, E2eError::SeleniumTimeout(_)));
}

#[tokio::test]
async fn stop_escalates_to_sigkill() {
    let config = shell(
        "trap '' TERM; echo 'Selenium Server is up and running' >&2; exec sleep 30",
    );
    let mut server = SeleniumServer::spawn(&config).await.unwrap();

    let start = Instant::now();
    server.stop().await.unwrap();

    assert!(!server.is_running());
    assert!(start.elapsed() < Duration::from_secs(10));
}

fn fake_sc(script: &std::path::Path) -> SauceConnect {
    SauceConnect {
        args: vec![script.to_string_lossy().into_owned()],
        settle: Duration::ZERO,
        close_drain: Duration::ZERO,
        ..SauceConnect::new("sh")
    }
}

fn tunnel_options(retries: u32) -> TunnelOptions {
    TunnelOptions {
        username: "ci".to_string(),
        access_key: "secret".to_string(),
        tunnel_identifier: Some("7.1".to_string()),
        ready_file_id: None,
        connect_retries: retries,
        connect_retry_timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn sauce_connect_passes_credentials_and_closes() {
    let dir = tempfile::tempdir().unwrap();
    let args_file = dir.path().join("args");
    let script = dir.path().join("sc.sh");
    std::fs::write(
        &script,
        format!(
            "echo \"$@\" > {}\necho 'Sauce Connect is up, you may start your tests.'\nexec sleep 30\n",
            args_file.display()
        ),
    )
    .unwrap();

    let mut tunnel = TunnelSupervisor::new(Box::new(fake_sc(&script)));
    tunnel.start(&tunnel_options(0)).await.unwrap();
    assert!(tunnel.is_active());

    let args = std::fs::read_to_string(&args_file).unwrap();
    assert!(args.contains("--user ci"));
    assert!(args.contains("--api-key secret"));
    assert!(args.contains("--tunnel-identifier 7.1"));

    tunnel.stop().await.unwrap();
    assert!(!tunnel.is_active());
}

#[tokio::test]
async fn sauce_connect_retries_until_up() {
    let dir = tempfile::tempdir().unwrap();
    let count = dir.path().join("count");
    let script = dir.path().join("sc.sh");
    std::fs::write(
        &script,
        format!(
            "n=$(cat {count} 2>/dev/null || echo 0)\n\
             n=$((n + 1))\n\
             echo $n > {count}\n\
             if [ $n -lt 3 ]; then echo 'connection refused'; exit 1; fi\n\
             echo 'Sauce Connect is up'\n\
             exec sleep 30\n",
            count = count.display()
        ),
    )
    .unwrap();

    let handle = fake_sc(&script).open(&tunnel_options(5)).await.unwrap();

    assert_eq!(std::fs::read_to_string(&count).unwrap().trim(), "3");
    handle.close().await.unwrap();
}

#[tokio::test]
async fn sauce_connect_ready_after_latin1_output() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("sc.sh");
    std::fs::write(
        &script,
        "printf 'Starting in M\\374nchen\\n'\necho 'Sauce Connect is up'\nexec sleep 30\n",
    )
    .unwrap();

    let handle = fake_sc(&script).open(&tunnel_options(0)).await.unwrap();
    handle.close().await.unwrap();
}

#[tokio::test]
async fn sauce_connect_gives_up_after_retries() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("sc.sh");
    std::fs::write(&script, "echo 'bad credentials'\nexit 2\n").unwrap();

    let err = fake_sc(&script).open(&tunnel_options(1)).await.err().unwrap();

    assert!(matches!(err, E2eError::Tunnel(ref msg) if msg.contains("2 attempts")));
}
