pub(crate) mod mock;

use bmc::{Bmc, BmcConfig, BootSettings, Error, Model};
use mock::MockRedfish;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

const ISO: &str = "http://192.168.122.1:8000/demo.iso";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn bmc(redfish: MockRedfish) -> Bmc<MockRedfish> {
    init_logger();
    Bmc::new("https://10.1.0.2", redfish).with_settings(BootSettings::immediate())
}

#[tokio::test]
async fn boot_iso_first_attempt() {
    let bmc = bmc(MockRedfish::default());
    bmc.boot_iso(ISO).await.unwrap();
    assert_eq!(
        bmc.redfish().calls(),
        vec![
            "eject".to_string(),
            format!("insert {}", ISO),
            "boot-once".to_string(),
            "reset ForceRestart".to_string(),
        ]
    );
}

#[tokio::test]
async fn eject_failure_is_ignored() {
    let bmc = bmc(MockRedfish {
        eject_fails: true,
        ..MockRedfish::default()
    });
    bmc.boot_iso(ISO).await.unwrap();
    assert_eq!(bmc.redfish().count("reset ForceRestart"), 1);
}

#[tokio::test]
async fn iso_location_must_be_a_url() {
    let bmc = bmc(MockRedfish::default());
    let error = bmc.boot_iso("demo.iso").await.unwrap_err();
    assert!(matches!(error, Error::InvalidIsoUrl { .. }));
    assert!(bmc.redfish().calls().is_empty());
}

#[tokio::test]
async fn redfish_restarted_after_fifth_failure() {
    let bmc = bmc(MockRedfish {
        boot_once_failures: Mutex::new(6),
        ..MockRedfish::default()
    });
    bmc.boot_iso(ISO).await.unwrap();

    let redfish = bmc.redfish();
    assert_eq!(redfish.count("boot-once"), 7);
    assert_eq!(redfish.count("reset manager"), 1);
    assert_eq!(redfish.count("reset ForceRestart"), 1);
    let calls = redfish.calls();
    let restart = calls.iter().position(|c| c == "reset manager").unwrap();
    // The restart follows the fifth failed boot-once request.
    assert_eq!(
        calls[..restart]
            .iter()
            .filter(|c| c.as_str() == "boot-once")
            .count(),
        5
    );
}

#[tokio::test]
async fn last_failure_is_returned() {
    let bmc = bmc(MockRedfish {
        boot_once_failures: Mutex::new(usize::MAX),
        ..MockRedfish::default()
    });
    let error = bmc.boot_iso(ISO).await.unwrap_err();

    assert!(matches!(error, Error::Status { status: 500, .. }), "{}", error);
    let redfish = bmc.redfish();
    assert_eq!(redfish.count("boot-once"), 10);
    assert_eq!(redfish.count("reset manager"), 2);
    assert_eq!(redfish.count("reset ForceRestart"), 0);
}

#[tokio::test]
async fn restart_redfish_waits_for_service() {
    let mut settings = BootSettings::immediate();
    settings.ping_timeout = Duration::from_secs(60);
    let bmc = bmc(MockRedfish {
        reset_manager_failures: Mutex::new(2),
        pings: Mutex::new(VecDeque::from(vec![false, false, true])),
        ..MockRedfish::default()
    })
    .with_settings(settings);

    bmc.restart_redfish().await.unwrap();

    assert_eq!(
        bmc.redfish().calls(),
        vec![
            "reset manager",
            "reset manager",
            "reset manager",
            "ping",
            "ping",
            "ping"
        ]
    );
}

#[tokio::test]
async fn restart_redfish_gives_up() {
    let bmc = bmc(MockRedfish {
        pings: Mutex::new(VecDeque::from(vec![false])),
        ..MockRedfish::default()
    });
    let error = bmc.restart_redfish().await.unwrap_err();
    assert!(matches!(error, Error::RedfishDown { .. }), "{}", error);
}

#[tokio::test]
async fn restart_redfish_skips_other_vendors() {
    let bmc = bmc(MockRedfish {
        model: Model::Other,
        ..MockRedfish::default()
    });
    bmc.restart_redfish().await.unwrap();
    assert!(bmc.redfish().calls().is_empty());
}

#[tokio::test]
async fn cold_boot_powers_off_then_on() {
    let bmc = bmc(MockRedfish::default());
    bmc.cold_boot().await.unwrap();
    assert_eq!(bmc.redfish().calls(), vec!["reset ForceOff", "reset On"]);
}

#[test]
fn empty_url_is_rejected() {
    let error = Bmc::from_config(&BmcConfig::new("")).unwrap_err();
    assert_eq!(error.to_string(), "BMC not defined");
}
