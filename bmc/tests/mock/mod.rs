/*!

A scripted [`RedfishApi`] so that the retry logic of [`bmc::Bmc`] can be tested without a
server.

!*/

use async_trait::async_trait;
use bmc::{Error, Model, RedfishApi, ResetType, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug)]
pub(crate) struct MockRedfish {
    pub(crate) model: Model,
    pub(crate) eject_fails: bool,
    /// How many one-time boot requests fail before one succeeds.
    pub(crate) boot_once_failures: Mutex<usize>,
    pub(crate) reset_manager_failures: Mutex<usize>,
    /// Answers of successive pings, the last one repeats.
    pub(crate) pings: Mutex<VecDeque<bool>>,
    pub(crate) calls: Mutex<Vec<String>>,
}

impl Default for MockRedfish {
    fn default() -> Self {
        Self {
            model: Model::Dell,
            eject_fails: false,
            boot_once_failures: Mutex::new(0),
            reset_manager_failures: Mutex::new(0),
            pings: Mutex::new(VecDeque::from(vec![true])),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockRedfish {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn refused(what: &str) -> Error {
    Error::Status {
        what: what.to_string(),
        status: 500,
        body: "internal error".to_string(),
    }
}

fn take_failure(failures: &Mutex<usize>) -> bool {
    let mut failures = failures.lock().unwrap();
    if *failures > 0 {
        *failures -= 1;
        true
    } else {
        false
    }
}

#[async_trait]
impl RedfishApi for MockRedfish {
    async fn eject_iso(&self) -> Result<()> {
        self.record("eject".to_string());
        if self.eject_fails {
            return Err(refused("eject virtual media"));
        }
        Ok(())
    }

    async fn insert_iso(&self, iso_url: &str) -> Result<()> {
        self.record(format!("insert {}", iso_url));
        Ok(())
    }

    async fn set_iso_once(&self) -> Result<()> {
        self.record("boot-once".to_string());
        if take_failure(&self.boot_once_failures) {
            return Err(refused("set a one-time boot from virtual media"));
        }
        Ok(())
    }

    async fn reset_system(&self, reset: ResetType) -> Result<()> {
        self.record(format!("reset {}", reset));
        Ok(())
    }

    async fn reset_manager(&self) -> Result<()> {
        self.record("reset manager".to_string());
        if take_failure(&self.reset_manager_failures) {
            return Err(refused("reset the manager"));
        }
        Ok(())
    }

    async fn ping(&self) -> bool {
        self.record("ping".to_string());
        let mut pings = self.pings.lock().unwrap();
        if pings.len() > 1 {
            pings.pop_front().unwrap_or(false)
        } else {
            pings.front().copied().unwrap_or(false)
        }
    }

    async fn model(&self) -> Result<Model> {
        Ok(self.model)
    }
}
