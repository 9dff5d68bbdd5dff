/*!

`cluster-driver` drives clusters and infra-envs of the assisted installer to a target state.

Operations are either idempotent "ensure" calls that converge on a state with a single check, or
poll loops that re-check the remote state at a fixed interval until a target state is observed.
Loops that would otherwise run forever take an optional deadline from [`PollSettings`].

Every error returned by [`ClusterLifecycleDriver`] is unrecoverable for the caller: transient
installer failures are retried or ignored inside the operations that expect them.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

mod driver;
mod error;
mod settings;

pub use driver::{select_address, ClusterLifecycleDriver};
pub use error::{Error, Result};
pub use settings::PollSettings;
