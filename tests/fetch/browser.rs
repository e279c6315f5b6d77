use std::path::PathBuf;
use yolostocks_rs::{BrowserFactory, BrowserKind, Pipeline, TransportMode, YsClient, YsError};

fn nowhere() -> BrowserFactory {
    BrowserFactory::new()
        .executable(BrowserKind::Chrome, "/nonexistent/chrome")
        .executable(BrowserKind::Edge, "/nonexistent/msedge")
        .executable(BrowserKind::Chromium, "/nonexistent/chromium")
}

fn fake_binary(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    path
}

#[test]
fn priority_drops_duplicates_and_keeps_first_position() {
    let f = BrowserFactory::new().priority([
        BrowserKind::Edge,
        BrowserKind::Chrome,
        BrowserKind::Edge,
        BrowserKind::Chromium,
        BrowserKind::Chrome,
    ]);
    assert_eq!(
        f.priority_list(),
        &[BrowserKind::Edge, BrowserKind::Chrome, BrowserKind::Chromium]
    );
    assert_eq!(BrowserFactory::new().priority_list(), &BrowserKind::ALL);
}

#[test]
fn kinds_parse_from_cli_names() {
    assert_eq!("msedge".parse::<BrowserKind>().unwrap(), BrowserKind::Edge);
    assert_eq!(" Chrome ".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
    let err = "firefox".parse::<BrowserKind>().unwrap_err();
    assert!(err.to_string().contains("firefox"));
}

#[test]
fn explicit_executable_wins_and_missing_one_is_not_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let chromium = fake_binary(&dir, "my-chromium", "#!/bin/sh\nexit 0\n");

    let f = nowhere().executable(BrowserKind::Chromium, &chromium);
    assert_eq!(f.locate(BrowserKind::Chromium), Some(chromium.clone()));
    assert_eq!(f.locate(BrowserKind::Chrome), None);
    assert_eq!(f.available(), vec![(BrowserKind::Chromium, chromium)]);
}

#[test]
fn available_follows_the_declared_priority() {
    let dir = tempfile::tempdir().unwrap();
    let chrome = fake_binary(&dir, "chrome-bin", "");
    let chromium = fake_binary(&dir, "chromium-bin", "");

    let f = nowhere()
        .executable(BrowserKind::Chrome, &chrome)
        .executable(BrowserKind::Chromium, &chromium)
        .priority([BrowserKind::Chromium, BrowserKind::Edge, BrowserKind::Chrome]);
    let kinds: Vec<BrowserKind> = f.available().into_iter().map(|(k, _)| k).collect();
    assert_eq!(kinds, vec![BrowserKind::Chromium, BrowserKind::Chrome]);
}

#[tokio::test]
async fn launch_with_nothing_installed_names_what_was_tried() {
    let f = nowhere().priority([BrowserKind::Edge, BrowserKind::Chromium]);
    assert!(f.available().is_empty());

    let err = f.launch().await.err().expect("no browser can start");
    assert!(matches!(err, YsError::Driver(_)), "got {err}");
    assert!(err.is_transport());
    let msg = err.to_string();
    assert!(msg.contains("edge, chromium"), "{msg}");
    assert!(!msg.contains("chrome,"), "{msg}");
}

#[cfg(unix)]
#[tokio::test]
async fn launch_reports_a_browser_that_exits_before_devtools() {
    let dir = tempfile::tempdir().unwrap();
    let broken = fake_binary(&dir, "broken-chrome", "#!/bin/sh\nexit 1\n");

    let f = nowhere()
        .executable(BrowserKind::Chrome, &broken)
        .priority([BrowserKind::Chrome]);
    let err = f.launch().await.err().expect("broken browser must not launch");
    assert!(matches!(err, YsError::Driver(_)), "got {err}");
    assert!(err.to_string().contains("chrome"), "{err}");
}

#[tokio::test]
async fn browser_pipeline_without_a_browser_is_a_transport_error() {
    let pipeline = Pipeline::builder()
        .client(YsClient::new().unwrap())
        .transport(TransportMode::Browser)
        .browsers(nowhere())
        .build()
        .unwrap();
    assert_eq!(pipeline.transport_mode(), TransportMode::Browser);

    let err = pipeline.scrape().await.unwrap_err();
    assert!(err.is_transport(), "got {err}");
    assert!(matches!(err, YsError::Driver(_)), "got {err}");
}
