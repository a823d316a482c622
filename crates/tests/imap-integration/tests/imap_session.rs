//! Docker-backed tests of the real IMAP capabilities and engine.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use futures_util::TryStreamExt as _;
use imap_integration::GreenMail;
use monitoring_core::{
    Client as _, CommandOutput, CommandRequest, CommandRunner, ConnectParams, Dialer as _,
    Session as _, UidRange,
};
use monitoring_engine::{Capabilities, Engine, TokioTimer};
use tokio::sync::mpsc;

const IMAP_USER: &str = "test";
const IMAP_PASSWORD: &str = "secret";

type TestResult = Result<(), Box<dyn Error + Send + Sync>>;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn session_reads_appended_messages() -> TestResult {
    imap_integration::require_integration_tests_enabled()?;

    let server = GreenMail::start(IMAP_USER, IMAP_PASSWORD).await?;
    let mut seed =
        imap_integration::connect_with_retry(&server.host, server.port, IMAP_USER, IMAP_PASSWORD)
            .await?;
    for body in ["first message", "URGENT SYSTEM ALERT"] {
        let content = imap_integration::message("alerts@example.com", "Disk", body);
        imap_integration::append(&mut seed, "INBOX", &content).await?;
    }

    let params = ConnectParams {
        host: &server.host,
        port: server.port,
        use_tls: false,
    };
    let mut session = imap_session::Dialer
        .dial(&params)
        .await?
        .login(IMAP_USER, IMAP_PASSWORD)
        .await?;

    let status = session.examine("INBOX").await?;
    assert_eq!(status.exists, 2);
    assert_eq!(session.search_all().await?, [1, 2]);

    let newest = session.fetch_uid(2).await?.ok_or("no UID for the newest message")?;
    let oldest = session.fetch_uid(1).await?.ok_or("no UID for the oldest message")?;
    assert!(newest > oldest);

    let new_uids = session.uid_search(UidRange::after(oldest)).await?;
    assert_eq!(new_uids, [newest]);

    let messages: Vec<_> = session.uid_fetch(&new_uids).await?.try_collect().await?;
    assert_eq!(messages.len(), 1);
    let message = &messages[0];
    assert_eq!(message.uid, newest);
    assert_eq!(message.envelope.from, ["alerts@example.com"]);
    assert_eq!(message.envelope.subject.as_deref(), Some("Disk"));
    assert!(String::from_utf8_lossy(&message.body).contains("URGENT SYSTEM ALERT"));

    session.logout().await?;
    seed.logout().await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
#[error("command receiver dropped")]
struct Closed;

struct RecordingRunner(mpsc::UnboundedSender<CommandRequest>);

impl CommandRunner for RecordingRunner {
    type Error = Closed;

    async fn run(&self, request: CommandRequest) -> Result<CommandOutput, Closed> {
        self.0.send(request).map_err(|_| Closed)?;
        Ok(CommandOutput {
            exit_code: Some(0),
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn engine_runs_command_for_new_mail() -> TestResult {
    imap_integration::require_integration_tests_enabled()?;

    let server = GreenMail::start(IMAP_USER, IMAP_PASSWORD).await?;
    let mut seed =
        imap_integration::connect_with_retry(&server.host, server.port, IMAP_USER, IMAP_PASSWORD)
            .await?;
    let old = imap_integration::message("alerts@example.com", "Old", "urgent alert");
    imap_integration::append(&mut seed, "INBOX", &old).await?;

    let config = config_core::Config {
        check_interval_seconds: 1,
        imap: config_core::ImapConfig {
            server: server.host.clone(),
            port: Some(server.port),
            username: IMAP_USER.to_owned(),
            password: IMAP_PASSWORD.into(),
            use_ssl: false,
        },
        monitor: vec![config_core::MonitorConfig {
            mailbox: "INBOX".to_owned(),
            check_interval_seconds: None,
            triggers: vec![config_core::TriggerConfig {
                regex_pattern: Some("urgent.*alert".to_owned()),
                command: "handle-alert".to_owned(),
                ..Default::default()
            }],
        }],
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let engine = Arc::new(Engine::new(
        &config,
        Capabilities {
            dialer: imap_session::Dialer,
            timer: TokioTimer,
            runner: RecordingRunner(tx),
        },
    )?);
    let stop = engine.stop_handle();
    let running = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.run().await }
    });

    tokio::time::timeout(Duration::from_secs(30), async {
        while engine.watermark("INBOX").is_none() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    })
    .await?;

    let new = imap_integration::message("alerts@example.com", "New", "URGENT SYSTEM ALERT");
    imap_integration::append(&mut seed, "INBOX", &new).await?;

    let request = tokio::time::timeout(Duration::from_secs(30), rx.recv())
        .await?
        .ok_or("runner dropped")?;

    stop.stop();
    running.await?;
    seed.logout().await?;

    let env = |key: &str| {
        request
            .env
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
    };
    assert_eq!(request.command, "handle-alert");
    assert_eq!(env(monitoring_engine::ENV_SUBJECT).as_deref(), Some("New"));
    assert_eq!(env(monitoring_engine::ENV_MAILBOX).as_deref(), Some("INBOX"));
    assert!(String::from_utf8_lossy(&request.stdin).contains("URGENT SYSTEM ALERT"));
    assert!(rx.try_recv().is_err());

    Ok(())
}
