//! Cart store
//!
//! Composition root for the client. Routes every cart operation to the server cart while the
//! session is signed in and to the local cart otherwise.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use bazaar::quantity::Quantity;

use crate::{
    config::ClientConfig,
    error::ClientError,
    local::LocalCartRepository,
    merge::{MergeCoordinator, MergeOutcome},
    product::ProductSnapshot,
    remote::RemoteCartRepository,
    repository::CartRepository,
    session::Session,
    storage::CartStorage,
    view::CartView,
};

#[derive(Debug, Clone)]
enum CartOperation {
    Fetch,
    Add {
        product: ProductSnapshot,
        quantity: Quantity,
    },
    Set {
        product: Uuid,
        quantity: Quantity,
    },
    Adjust {
        product: Uuid,
        delta: i32,
    },
    Remove {
        product: Uuid,
    },
    Clear,
}

impl CartOperation {
    async fn apply(&self, repository: &dyn CartRepository) -> Result<CartView, ClientError> {
        match self {
            Self::Fetch => repository.fetch().await,
            Self::Add { product, quantity } => {
                repository.add_item(product.clone(), *quantity).await
            }
            Self::Set { product, quantity } => repository.set_quantity(*product, *quantity).await,
            Self::Adjust { product, delta } => repository.adjust_quantity(*product, *delta).await,
            Self::Remove { product } => repository.remove_item(*product).await,
            Self::Clear => repository.clear().await,
        }
    }
}

/// The cart as the UI sees it.
pub struct CartStore<S> {
    config: ClientConfig,
    session: Session,
    local: LocalCartRepository<S>,
    remote: Option<Arc<dyn CartRepository>>,
    merger: MergeCoordinator,
}

impl<S> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("base_url", &self.config.base_url)
            .field("session", &self.session)
            .field("remote", &self.remote.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: CartStorage + 'static> CartStore<S> {
    /// An anonymous store over `storage`.
    pub fn new(config: ClientConfig, storage: S) -> Self {
        let local = LocalCartRepository::new(storage, config.currency);

        Self {
            config,
            session: Session::anonymous(),
            local,
            remote: None,
            merger: MergeCoordinator,
        }
    }

    /// Current session and merge state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The anonymous cart, which stays in place while signed in.
    pub fn local(&self) -> &LocalCartRepository<S> {
        &self.local
    }

    /// Sign in with an access token and merge the anonymous cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the merge fails. A failed merge
    /// leaves the session signed in with the local cart intact; call [`CartStore::merge`] to
    /// retry.
    pub async fn login(&mut self, access_token: &str) -> Result<CartView, ClientError> {
        let remote = RemoteCartRepository::new(&self.config, access_token)?;

        self.login_with(access_token, Arc::new(remote)).await
    }

    /// Sign in against an already built server repository.
    ///
    /// # Errors
    ///
    /// See [`CartStore::login`].
    pub async fn login_with(
        &mut self,
        access_token: &str,
        remote: Arc<dyn CartRepository>,
    ) -> Result<CartView, ClientError> {
        self.session.login(access_token);
        self.remote = Some(remote);

        self.merge().await
    }

    /// Run the merge if this session has not merged yet, then return the current cart.
    ///
    /// # Errors
    ///
    /// Returns the merge error, except 401 and 403 which fall back to the local cart.
    pub async fn merge(&mut self) -> Result<CartView, ClientError> {
        let Some(remote) = self.remote.clone() else {
            return self.local.fetch().await;
        };

        let outcome = self
            .merger
            .merge_local_cart_into_remote(&mut self.session, &self.local, remote.as_ref())
            .await;

        match outcome {
            Ok(MergeOutcome::Merged(view)) => Ok(view),
            Ok(MergeOutcome::Skipped) => self.perform(CartOperation::Fetch).await,
            Err(merge_error) if merge_error.is_unauthorized() => {
                self.degrade(&merge_error);

                self.local.fetch().await
            }
            Err(merge_error) => Err(merge_error),
        }
    }

    /// Sign out. The local cart is used from here on.
    pub fn logout(&mut self) {
        self.session.logout();
        self.remote = None;
    }

    /// # Errors
    ///
    /// Returns an error if the cart cannot be read.
    pub async fn view(&mut self) -> Result<CartView, ClientError> {
        self.perform(CartOperation::Fetch).await
    }

    /// Add `quantity` of a product, creating the line or adding to it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidQuantity`] for a zero quantity, or the repository error.
    pub async fn add_item(
        &mut self,
        product: ProductSnapshot,
        quantity: u32,
    ) -> Result<CartView, ClientError> {
        let quantity = Quantity::new(quantity)?;

        self.perform(CartOperation::Add { product, quantity }).await
    }

    /// Set the quantity of a line. Zero is rejected; use [`CartStore::remove_item`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidQuantity`] for zero, [`ClientError::NotFound`] when the
    /// product is not in the cart, or the repository error.
    pub async fn set_quantity(
        &mut self,
        product: Uuid,
        quantity: u32,
    ) -> Result<CartView, ClientError> {
        let quantity = Quantity::new(quantity)?;

        self.perform(CartOperation::Set { product, quantity }).await
    }

    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] when the product is not in the cart.
    pub async fn increment(&mut self, product: Uuid) -> Result<CartView, ClientError> {
        self.perform(CartOperation::Adjust { product, delta: 1 })
            .await
    }

    /// Take one unit off a line. A line at quantity one is removed.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] when the product is not in the cart.
    pub async fn decrement(&mut self, product: Uuid) -> Result<CartView, ClientError> {
        self.perform(CartOperation::Adjust { product, delta: -1 })
            .await
    }

    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] when the product is not in the cart.
    pub async fn remove_item(&mut self, product: Uuid) -> Result<CartView, ClientError> {
        self.perform(CartOperation::Remove { product }).await
    }

    /// # Errors
    ///
    /// Returns the repository error.
    pub async fn clear(&mut self) -> Result<CartView, ClientError> {
        self.perform(CartOperation::Clear).await
    }

    async fn perform(&mut self, operation: CartOperation) -> Result<CartView, ClientError> {
        let Some(remote) = self.remote.clone() else {
            return operation.apply(&self.local).await;
        };

        match operation.apply(remote.as_ref()).await {
            Err(remote_error) if remote_error.is_unauthorized() => {
                self.degrade(&remote_error);

                // The server already holds this change.
                if remote_error.was_applied() {
                    return self.local.fetch().await;
                }

                operation.apply(&self.local).await
            }
            result => result,
        }
    }

    fn degrade(&mut self, cause: &ClientError) {
        warn!(error = %cause, "session rejected, continuing with the anonymous cart");

        self.logout();
    }
}
