//! Subcommand implementations and the wiring they share.

pub mod cart;
pub mod checkout;
pub mod migrate;
pub mod products;

use shopfront::Storefront;
use shopfront::cart::{CartStore, FileCartStorage};
use shopfront::config::ShopfrontConfig;
use shopfront::confirm::{AutoConfirm, Confirm, ConfirmRequest, ConfirmationChannel};
use shopfront::db::{self, PgOrderStore};
use shopfront::error::Result;
use shopfront::orders::{MemoryOrderStore, OrderStore, StoreError};
use shopfront_core::{OrderId, OrderRecord};
use tracing::warn;

use crate::terminal::{self, TerminalNotifier};

/// Storefront as driven from the terminal.
pub type CliStorefront = Storefront<FileCartStorage, TerminalNotifier, CliConfirm>;

/// How confirmation dialogs are answered.
#[derive(Debug, Clone)]
pub enum CliConfirm {
    /// `--yes`: confirm everything without asking.
    Auto(AutoConfirm),
    /// Ask on stdin.
    Prompt(ConfirmationChannel),
}

impl Confirm for CliConfirm {
    async fn confirm(&self, request: ConfirmRequest) -> bool {
        match self {
            Self::Auto(auto) => auto.confirm(request).await,
            Self::Prompt(channel) => channel.confirm(request).await,
        }
    }
}

/// Open the shopper's cart.
///
/// With `assume_yes` every dialog is confirmed; otherwise a task answering
/// dialogs on stdin is spawned. The task ends once the storefront is dropped.
pub fn open_storefront(config: &ShopfrontConfig, assume_yes: bool) -> CliStorefront {
    let cart = CartStore::load(FileCartStorage::new(&config.cart_path));

    let confirm = if assume_yes {
        CliConfirm::Auto(AutoConfirm(true))
    } else {
        let (channel, receiver) = ConfirmationChannel::new(1);
        tokio::spawn(terminal::answer_confirmations(receiver));
        CliConfirm::Prompt(channel)
    };

    Storefront::new(cart, TerminalNotifier, confirm, config.pricing)
}

/// Order store selected by configuration.
pub enum CliOrderStore {
    Postgres(PgOrderStore),
    Memory(MemoryOrderStore),
}

impl CliOrderStore {
    /// Connect to `PostgreSQL` when a database is configured, else keep
    /// orders in memory for this run.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured database cannot be reached.
    pub async fn connect(config: &ShopfrontConfig) -> Result<Self> {
        match &config.database_url {
            Some(url) => Ok(Self::Postgres(PgOrderStore::new(db::create_pool(url).await?))),
            None => {
                warn!("No database configured, orders will not be persisted");
                Ok(Self::Memory(MemoryOrderStore::new()))
            }
        }
    }
}

impl OrderStore for CliOrderStore {
    async fn create_record(&self, record: &OrderRecord) -> std::result::Result<OrderId, StoreError> {
        match self {
            Self::Postgres(store) => store.create_record(record).await,
            Self::Memory(store) => store.create_record(record).await,
        }
    }
}
