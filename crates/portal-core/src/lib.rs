//! Client-side core of the VIP portal.
//!
//! - [`AdminStatusResolver`] decides whether the signed-in user is an
//!   administrator, backed by a shared [`AdminStatusCache`] with a
//!   freshness window, a per-user in-flight guard and a lookup deadline.
//! - [`RegistrationFlow`] drives self-registration through the signup
//!   edge function.
//! - [`CommissionSummary`] totals a user's commissions per calendar window.

mod backend;
pub mod cache;
pub mod clock;
pub mod commission;
pub mod config;
pub mod deadline;
pub mod error;
pub mod guard;
mod portal;
pub mod registration;
pub mod resolver;

pub use cache::{AdminStatusCache, AdminStatusEntry, LookupOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use commission::CommissionSummary;
pub use config::PortalConfig;
pub use deadline::{detached_with_deadline, with_deadline, Deadline};
pub use error::{PortalError, PortalResult};
pub use guard::{InFlightGuard, InFlightToken, InFlightWaiter};
pub use portal::Portal;
pub use registration::{
    RegistrationFlow, RegistrationRequest, RegistrationResult, RegistrationState, SignupGateway,
};
pub use resolver::{AdminStatus, AdminStatusResolver, AuthEvent, RoleLookup};
