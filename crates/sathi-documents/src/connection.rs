//! [`ConnectionManager`]: owns the document backend handle.

use std::sync::{Arc, OnceLock};

use crate::{Error, Result};

type Connector<B> = Box<dyn Fn() -> Result<B> + Send + Sync>;

/// Lazily builds the document backend and caches it for the manager's
/// lifetime.
///
/// Construction runs at most once, even with concurrent first callers. A
/// failed construction is cached too: the manager stays unavailable and
/// every caller sees the same reason. Share it by `Arc` between the
/// [`DocumentStore`](crate::DocumentStore) and the
/// [`SimilarityIndex`](crate::SimilarityIndex).
pub struct ConnectionManager<B> {
  connect: Option<Connector<B>>,
  handle:  OnceLock<Result<Arc<B>, String>>,
}

impl<B: Send + Sync> ConnectionManager<B> {
  /// Build the backend with `connect` on first use.
  pub fn lazy(connect: impl Fn() -> Result<B> + Send + Sync + 'static) -> Self {
    Self { connect: Some(Box::new(connect)), handle: OnceLock::new() }
  }

  /// Wrap a backend that is already built.
  pub fn ready(backend: B) -> Self {
    Self { connect: None, handle: OnceLock::from(Ok(Arc::new(backend))) }
  }

  /// A manager that never has a backend.
  pub fn unavailable(reason: impl Into<String>) -> Self {
    Self { connect: None, handle: OnceLock::from(Err(reason.into())) }
  }

  fn state(&self) -> &Result<Arc<B>, String> {
    self.handle.get_or_init(|| {
      let outcome = match &self.connect {
        Some(connect) => connect(),
        None => Err(Error::Unavailable("no connector".into())),
      };
      match outcome {
        Ok(backend) => {
          tracing::info!("document backend connected");
          Ok(Arc::new(backend))
        }
        Err(e) => {
          tracing::warn!(error = %e, "document backend unavailable");
          Err(e.to_string())
        }
      }
    })
  }

  /// The backend handle, or `None` when it is unavailable.
  pub fn client(&self) -> Option<Arc<B>> { self.state().as_ref().ok().cloned() }

  /// The backend handle, or [`Error::Unavailable`] with the cached reason.
  pub fn require(&self) -> Result<Arc<B>> {
    self.state().clone().map_err(Error::Unavailable)
  }

  pub fn is_available(&self) -> bool { self.state().is_ok() }

  /// Run initialisation now instead of on first use. Call once at startup,
  /// before the manager is shared.
  pub fn connect_now(&self) -> bool { self.is_available() }
}
