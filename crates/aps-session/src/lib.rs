//! APS Session
//!
//! Serializes mutation of a [`Project`](aps_store::Project) and mediates
//! calls to the host application.
//!
//! # Overview
//!
//! - **Single flight**: operations run one at a time on a working copy and
//!   are published only when they succeed
//! - **Snapshot reads**: readers see the last fully applied project
//! - **Stale responses**: a field simulation that arrives after the
//!   selection moved elsewhere is discarded
//!
//! # Usage
//!
//! ```no_run
//! use aps_copy::CopyConfig;
//! use aps_session::{MockHost, Session};
//! use aps_store::Project;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::new(Project::load("model.aps.json")?, MockHost::default());
//!     let (source, target) = session
//!         .read(|p| (p.scope_by_codes(1, None), p.scope_by_codes(2, None)))
//!         .await;
//!     let report = session
//!         .duplicate(source.ok_or("no zone 1")?, target.ok_or("no zone 2")?, CopyConfig::default())
//!         .await?;
//!     println!("{}", report.summary());
//!     session.snapshot().await.save("model.aps.json")?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod error;
mod host;
mod session;

pub use error::{Result, SessionError};
pub use host::{MockHost, MockHostError};
pub use session::Session;
