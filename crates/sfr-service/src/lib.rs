//! SFR Service
//!
//! HTTP prediction service: loads the model artifacts once, then answers
//! `POST /predict` with a fertilizer type and quantity.
//!
//! # Core Concepts
//!
//! - [`ServiceConfig`]: defaults, TOML file, `SFR_*` environment, CLI flags
//! - [`ServiceContext`]: immutable artifacts + pipeline shared behind an `Arc`
//! - [`inference::predict`]: transform → classify → regress → decode
//! - [`http::routes`]: warp filters with CORS and `{"detail": ..}` errors
//!
//! # Example
//!
//! ```rust,ignore
//! use sfr_service::{http, ServiceConfig, ServiceContext};
//!
//! let config = ServiceConfig::default();
//! let ctx = Arc::new(ServiceContext::from_config(&config)?);
//! warp::serve(http::routes(ctx)).run(config.socket_addr()?).await;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
mod context;
mod error;
pub mod http;
pub mod inference;
pub mod logging;
mod report;

pub use config::{ConfigError, ConfigOverrides, LogFormat, ServiceConfig};
pub use context::{ReadyModels, ServiceContext};
pub use error::ServiceError;
pub use report::{ArtifactReport, ArtifactStatus};

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bind and serve until `shutdown` resolves
///
/// # Errors
/// Returns error if the address cannot be bound
pub async fn serve<S>(addr: SocketAddr, ctx: Arc<ServiceContext>, shutdown: S) -> Result<(), warp::Error>
where
    S: Future<Output = ()> + Send + 'static,
{
    let (bound, server) =
        warp::serve(http::routes(ctx)).try_bind_with_graceful_shutdown(addr, shutdown)?;
    tracing::info!("Listening on http://{}", bound);
    server.await;
    tracing::info!("Server stopped");
    Ok(())
}
