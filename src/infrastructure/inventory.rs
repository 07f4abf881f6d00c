use crate::config::InventoryConfig;
use crate::domain::account::{Account, AccountId};
use crate::domain::card::{Card, CardKey, CardStatus, Network};
use crate::domain::ports::{AccountGuard, AccountStore, CardCatalog, CodeSource, CodeSourceBox};
use crate::error::{LedgerError, Result};
use crate::infrastructure::random::ThreadRngCodeSource;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::iter;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

const CARD_CODE_DIGITS: std::ops::RangeInclusive<u64> = 100_000_000_000..=999_999_999_999;
const SERIAL_SUFFIX_DIGITS: std::ops::RangeInclusive<u64> = 0..=999_999;

/// Formats card codes and serials from a [`CodeSource`].
///
/// Nothing here checks uniqueness; that is the catalog's job.
#[derive(Clone)]
struct CodeGenerator {
    source: Arc<dyn CodeSource>,
}

impl CodeGenerator {
    fn card_code(&self, network: Network) -> String {
        format!(
            "{}{}",
            network.code_prefix(),
            self.source.next_in(CARD_CODE_DIGITS)
        )
    }

    fn serial(&self) -> String {
        format!(
            "SN{}{:06}",
            Utc::now().timestamp_millis(),
            self.source.next_in(SERIAL_SUFFIX_DIGITS)
        )
    }
}

fn unique_value(
    what: &'static str,
    attempts: u32,
    mut generate: impl FnMut() -> String,
    taken: impl Fn(&str) -> bool,
) -> Result<String> {
    for _ in 0..attempts {
        let candidate = generate();
        if !taken(&candidate) {
            return Ok(candidate);
        }
    }
    Err(LedgerError::CardGenerationCollision { what, attempts })
}

#[derive(Default)]
struct Catalog {
    cards: BTreeMap<CardKey, Card>,
    by_code: HashMap<String, CardKey>,
    by_serial: HashMap<String, CardKey>,
    max_attempts: u32,
}

impl Catalog {
    fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    fn keys_for(network: Network, face_value: u32) -> std::ops::RangeInclusive<CardKey> {
        CardKey {
            network,
            face_value,
            index: 0,
        }..=CardKey {
            network,
            face_value,
            index: u32::MAX,
        }
    }

    /// Adds a new available card with a catalog-unique code and serial.
    fn mint(
        &mut self,
        network: Network,
        face_value: u32,
        generator: &CodeGenerator,
    ) -> Result<CardKey> {
        if face_value == 0 {
            return Err(LedgerError::InvalidAmount(format!(
                "face value for {network} must be positive"
            )));
        }

        let index = self
            .cards
            .range(Self::keys_for(network, face_value))
            .next_back()
            .map_or(0, |(key, _)| key.index + 1);
        let key = CardKey {
            network,
            face_value,
            index,
        };

        let code = unique_value(
            "card code",
            self.max_attempts,
            || generator.card_code(network),
            |code| self.by_code.contains_key(code),
        )?;
        let serial = unique_value(
            "serial",
            self.max_attempts,
            || generator.serial(),
            |serial| self.by_serial.contains_key(serial),
        )?;

        self.by_code.insert(code.clone(), key);
        self.by_serial.insert(serial.clone(), key);
        self.cards.insert(key, Card::new(key, code, serial));
        Ok(key)
    }

    fn first_available(&self, network: Network, face_value: u32) -> Option<CardKey> {
        self.cards
            .range(Self::keys_for(network, face_value))
            .find(|(_, card)| card.is_available())
            .map(|(key, _)| *key)
    }

    /// The lowest-index available card of the pair, minting one if none is left.
    fn claim(
        &mut self,
        network: Network,
        face_value: u32,
        generator: &CodeGenerator,
    ) -> Result<&mut Card> {
        let key = match self.first_available(network, face_value) {
            Some(key) => key,
            None => {
                let key = self.mint(network, face_value, generator)?;
                debug!(%network, face_value, index = key.index, "Minted card");
                key
            }
        };
        self.cards
            .get_mut(&key)
            .ok_or_else(|| LedgerError::CardNotFound(format!("{network}/{face_value}")))
    }
}

/// Owns the account registry and the prepaid card catalog.
///
/// Cheap to clone: every clone shares the same state, so one instance can be
/// handed to the ledger engine both as its `AccountStore` and its
/// `CardCatalog`. Each account sits behind its own mutex so submissions for
/// different accounts never wait on each other.
#[derive(Clone)]
pub struct InventoryStore {
    accounts: Arc<RwLock<HashMap<AccountId, Arc<Mutex<Account>>>>>,
    catalog: Arc<RwLock<Catalog>>,
    generator: CodeGenerator,
    initialized: Arc<AtomicBool>,
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new(Box::new(ThreadRngCodeSource))
    }
}

impl InventoryStore {
    /// Creates an empty store. Call [`InventoryStore::initialize`] once before use.
    pub fn new(source: CodeSourceBox) -> Self {
        Self {
            accounts: Arc::default(),
            catalog: Arc::default(),
            generator: CodeGenerator {
                source: Arc::from(source),
            },
            initialized: Arc::default(),
        }
    }

    /// Populates accounts and cards from `config`.
    ///
    /// May succeed only once per store. A failed attempt leaves the store
    /// empty and can be retried.
    pub async fn initialize(&self, config: &InventoryConfig) -> Result<()> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(LedgerError::AlreadyInitialized);
        }

        match self.populate(config).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.initialized.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    async fn populate(&self, config: &InventoryConfig) -> Result<()> {
        config.validate()?;

        let mut catalog = Catalog::new(config.max_code_attempts);
        for set in &config.denominations {
            for &face_value in &set.face_values {
                for _ in 0..config.cards_per_denomination {
                    catalog.mint(set.network, face_value, &self.generator)?;
                }
            }
        }

        let seed = config.seed_account.to_account().with_admin(true);
        let accounts: HashMap<_, _> = iter::once(seed)
            .chain(config.accounts.iter().map(|s| s.to_account()))
            .map(|account| (account.id.clone(), Arc::new(Mutex::new(account))))
            .collect();

        info!(
            accounts = accounts.len(),
            cards = catalog.cards.len(),
            seed = %config.seed_account.id,
            "Inventory initialized"
        );

        *self.accounts.write().await = accounts;
        *self.catalog.write().await = catalog;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub async fn lookup_account(&self, id: &AccountId) -> Result<Option<Account>> {
        self.get(id).await
    }

    /// A fresh code for `network`. Not checked against the catalog.
    pub fn generate_card_code(&self, network: Network) -> String {
        self.generator.card_code(network)
    }

    /// A fresh serial. Not checked against the catalog.
    pub fn generate_serial(&self) -> String {
        self.generator.serial()
    }
}

#[async_trait]
impl AccountStore for InventoryStore {
    async fn lock(&self, id: &AccountId) -> Result<Option<AccountGuard>> {
        let handle = self.accounts.read().await.get(id).cloned();
        match handle {
            Some(handle) => Ok(Some(handle.lock_owned().await)),
            None => Ok(None),
        }
    }

    async fn get(&self, id: &AccountId) -> Result<Option<Account>> {
        let handle = self.accounts.read().await.get(id).cloned();
        match handle {
            Some(handle) => Ok(Some(handle.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.accounts.read().await.len())
    }
}

#[async_trait]
impl CardCatalog for InventoryStore {
    async fn reserve(&self, network: Network, face_value: u32) -> Result<Card> {
        let mut catalog = self.catalog.write().await;
        let card = catalog.claim(network, face_value, &self.generator)?;
        card.reserve()?;
        Ok(card.clone())
    }

    async fn take(&self, network: Network, face_value: u32) -> Result<Card> {
        let mut catalog = self.catalog.write().await;
        let card = catalog.claim(network, face_value, &self.generator)?;
        card.redeem()?;
        Ok(card.clone())
    }

    async fn redeem(&self, serial: &str) -> Result<Card> {
        let mut catalog = self.catalog.write().await;
        let key = *catalog
            .by_serial
            .get(serial)
            .ok_or_else(|| LedgerError::CardNotFound(serial.to_string()))?;
        let card = catalog
            .cards
            .get_mut(&key)
            .ok_or_else(|| LedgerError::CardNotFound(serial.to_string()))?;
        card.redeem()?;
        Ok(card.clone())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Card>> {
        let catalog = self.catalog.read().await;
        Ok(catalog
            .by_code
            .get(code)
            .and_then(|key| catalog.cards.get(key))
            .cloned())
    }

    async fn count_by_status(&self, status: CardStatus) -> Result<usize> {
        let catalog = self.catalog.read().await;
        Ok(catalog
            .cards
            .values()
            .filter(|card| card.status == status)
            .count())
    }

    async fn all_cards(&self) -> Result<Vec<Card>> {
        Ok(self.catalog.read().await.cards.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AccountSeed, Denominations};
    use crate::domain::account::Balance;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicU64;

    /// Always returns the lower bound of the requested range.
    struct FixedSource;

    impl CodeSource for FixedSource {
        fn next_in(&self, range: std::ops::RangeInclusive<u64>) -> u64 {
            *range.start()
        }
    }

    /// Counts upwards from the lower bound, repeating every value `repeat` times.
    struct StutterSource {
        calls: AtomicU64,
        repeat: u64,
    }

    impl CodeSource for StutterSource {
        fn next_in(&self, range: std::ops::RangeInclusive<u64>) -> u64 {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            range.start() + n / self.repeat
        }
    }

    fn small_config(cards: u32) -> InventoryConfig {
        InventoryConfig {
            denominations: vec![Denominations {
                network: Network::OperatorA,
                face_values: vec![500],
            }],
            cards_per_denomination: cards,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_initialize_populates_accounts_and_cards() {
        let store = InventoryStore::default();
        let config = InventoryConfig::default().with_account(AccountSeed {
            id: "user-1".to_string(),
            name: "Sara".to_string(),
            contact: String::new(),
            balance: dec!(1250.00),
            admin: false,
        });
        store.initialize(&config).await.unwrap();

        assert!(store.is_initialized());
        assert_eq!(store.count().await.unwrap(), 2);

        let admin = store.lookup_account(&"admin".into()).await.unwrap().unwrap();
        assert!(admin.admin);
        assert_eq!(admin.balance, Balance::new(dec!(50000)));

        let user = store.lookup_account(&"user-1".into()).await.unwrap().unwrap();
        assert!(!user.admin);
        assert_eq!(user.balance, Balance::new(dec!(1250.00)));

        let cards = store.all_cards().await.unwrap();
        assert_eq!(cards.len(), config.catalog_size());
        assert_eq!(
            store.count_by_status(CardStatus::Available).await.unwrap(),
            config.catalog_size()
        );
    }

    #[tokio::test]
    async fn test_initialize_twice_is_rejected() {
        let store = InventoryStore::default();
        let config = small_config(3);
        store.initialize(&config).await.unwrap();

        let second = store.initialize(&config).await;
        assert!(matches!(second, Err(LedgerError::AlreadyInitialized)));
        assert_eq!(store.all_cards().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_lookup_unknown_account() {
        let store = InventoryStore::default();
        store.initialize(&small_config(1)).await.unwrap();
        assert!(store.lookup_account(&"ghost".into()).await.unwrap().is_none());
        assert!(store.lock(&"ghost".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_codes_and_serials_are_unique() {
        let store = InventoryStore::default();
        store.initialize(&InventoryConfig::default()).await.unwrap();

        // Mint extra cards on top of the initial catalog.
        for _ in 0..20 {
            store.reserve(Network::Wifi, 750).await.unwrap();
        }

        let cards = store.all_cards().await.unwrap();
        let codes: HashSet<_> = cards.iter().map(|c| c.code.as_str()).collect();
        let serials: HashSet<_> = cards.iter().map(|c| c.serial.as_str()).collect();
        assert_eq!(codes.len(), cards.len());
        assert_eq!(serials.len(), cards.len());
    }

    #[tokio::test]
    async fn test_collision_is_retried() {
        // Each value is drawn four times in a row, so most code draws collide
        // with the previous card and have to be redrawn.
        let store = InventoryStore::new(Box::new(StutterSource {
            calls: AtomicU64::new(0),
            repeat: 4,
        }));
        store.initialize(&small_config(5)).await.unwrap();

        let cards = store.all_cards().await.unwrap();
        let codes: HashSet<_> = cards.iter().map(|c| c.code.clone()).collect();
        assert_eq!(codes.len(), 5);
    }

    #[tokio::test]
    async fn test_collision_exhaustion_fails_initialization() {
        let store = InventoryStore::new(Box::new(FixedSource));
        let result = store.initialize(&small_config(2)).await;

        assert!(matches!(
            result,
            Err(LedgerError::CardGenerationCollision {
                what: "card code",
                attempts: 8
            })
        ));
        assert!(!store.is_initialized());
        assert!(store.all_cards().await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 0);

        // A failed initialization can be retried.
        store.initialize(&small_config(1)).await.unwrap();
        assert_eq!(store.all_cards().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reserve_prefers_existing_then_mints() {
        let store = InventoryStore::default();
        store.initialize(&small_config(2)).await.unwrap();

        let first = store.reserve(Network::OperatorA, 500).await.unwrap();
        assert_eq!(first.key.index, 0);
        assert_eq!(first.status, CardStatus::Reserved);

        let second = store.reserve(Network::OperatorA, 500).await.unwrap();
        assert_eq!(second.key.index, 1);

        let minted = store.reserve(Network::OperatorA, 500).await.unwrap();
        assert_eq!(minted.key.index, 2);
        assert!(minted.code.starts_with("OPA"));
        assert_eq!(store.all_cards().await.unwrap().len(), 3);
        assert_eq!(store.count_by_status(CardStatus::Available).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_redeem_card() {
        let store = InventoryStore::default();
        store.initialize(&small_config(1)).await.unwrap();

        let card = store.reserve(Network::OperatorA, 500).await.unwrap();
        let redeemed = store.redeem(&card.serial).await.unwrap();
        assert_eq!(redeemed.status, CardStatus::Redeemed);

        let found = store.find_by_code(&card.code).await.unwrap().unwrap();
        assert_eq!(found.status, CardStatus::Redeemed);

        assert!(matches!(
            store.redeem(&card.serial).await,
            Err(LedgerError::InvalidCardTransition { .. })
        ));
        assert!(matches!(
            store.redeem("SN-missing").await,
            Err(LedgerError::CardNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_negative_opening_balance_fails_initialization() {
        let store = InventoryStore::default();
        let config = small_config(1).with_seed_balance(dec!(-100));

        let result = store.initialize(&config).await;
        assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));
        assert!(!store.is_initialized());
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.all_cards().await.unwrap().is_empty());

        store
            .initialize(&small_config(1).with_seed_balance(dec!(100)))
            .await
            .unwrap();
        let admin = store.lookup_account(&"admin".into()).await.unwrap().unwrap();
        assert_eq!(admin.balance, Balance::new(dec!(100)));
    }

    #[tokio::test]
    async fn test_zero_code_attempts_fails_initialization() {
        let store = InventoryStore::default();
        let config = InventoryConfig {
            max_code_attempts: 0,
            ..small_config(1)
        };

        let result = store.initialize(&config).await;
        assert!(matches!(result, Err(LedgerError::InvalidConfig(_))));
        assert!(!store.is_initialized());
        assert!(store.all_cards().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_account_reusing_seed_id_fails_initialization() {
        let store = InventoryStore::default();
        let config = small_config(1).with_account(AccountSeed {
            id: "admin".to_string(),
            name: "Other".to_string(),
            contact: String::new(),
            balance: dec!(1),
            admin: false,
        });

        let result = store.initialize(&config).await;
        assert!(matches!(result, Err(LedgerError::DuplicateAccount(id)) if id == "admin"));
        assert!(!store.is_initialized());
        assert_eq!(store.count().await.unwrap(), 0);

        store.initialize(&small_config(1)).await.unwrap();
        let admin = store.lookup_account(&"admin".into()).await.unwrap().unwrap();
        assert!(admin.admin);
        assert_eq!(admin.name, "Ahmed Mohammed");
        assert_eq!(admin.balance, Balance::new(dec!(50000)));
    }

    #[tokio::test]
    async fn test_take_redeems_in_one_step() {
        let store = InventoryStore::default();
        store.initialize(&small_config(1)).await.unwrap();

        let stocked = store.take(Network::OperatorA, 500).await.unwrap();
        assert_eq!(stocked.key.index, 0);
        assert_eq!(stocked.status, CardStatus::Redeemed);

        let minted = store.take(Network::OperatorA, 500).await.unwrap();
        assert_eq!(minted.key.index, 1);
        assert_eq!(minted.status, CardStatus::Redeemed);

        assert_eq!(store.count_by_status(CardStatus::Reserved).await.unwrap(), 0);
        assert_eq!(store.count_by_status(CardStatus::Redeemed).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_zero_face_value_rejected() {
        let store = InventoryStore::default();
        store.initialize(&small_config(1)).await.unwrap();
        assert!(matches!(
            store.reserve(Network::OperatorB, 0).await,
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_generated_formats() {
        let store = InventoryStore::new(Box::new(FixedSource));
        assert_eq!(store.generate_card_code(Network::Wifi), "WIFI100000000000");
        assert_eq!(store.generate_card_code(Network::OperatorB), "OPB100000000000");

        let serial = store.generate_serial();
        assert!(serial.starts_with("SN"));
        assert!(serial.ends_with("000000"));
        assert!(serial[2..].chars().all(|c| c.is_ascii_digit()));
    }
}
