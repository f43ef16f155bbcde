//! # Stockroom Service
//!
//! The operations the request layer calls. Validation happens here; every
//! write goes through a repository, and every stock write through the
//! Stock Ledger.
//!
//! Order operations live in [`crate::orders`]; this file holds construction,
//! suppliers, products, and the dashboard.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use stockroom_core::validation::{
    validate_contact_number, validate_email, validate_optional, validate_order_quantity,
    validate_page_request, validate_price_cents, validate_required, validate_restock_quantity,
    validate_sku, validate_threshold,
};
use stockroom_core::{
    CoreError, DashboardStats, Money, NewProduct, NewSupplier, Page, PageRequest, Product,
    Restock, StockLevel, Supplier, SupplierPatch, ValidationError,
};
use stockroom_db::{generate_product_id, generate_supplier_id, Database, DbError};

use crate::alerts::LowStockMonitor;
use crate::clock::{Clock, SystemClock};
use crate::config::{InventorySettings, NotifierMode, StockroomConfig};
use crate::error::{ServiceError, ServiceResult};
use crate::notifier::{
    LogNotifier, NotificationDispatcher, SupplierNotifier, WebhookConfig, WebhookNotifier,
};

/// Cheap to clone; clones share the pool and the notification worker.
#[derive(Clone)]
pub struct Stockroom {
    pub(crate) db: Database,
    pub(crate) alerts: LowStockMonitor,
    pub(crate) dispatcher: NotificationDispatcher,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) settings: InventorySettings,
}

impl Stockroom {
    /// Opens the database and starts the notifier named by `config`.
    pub async fn open(config: &StockroomConfig) -> ServiceResult<Self> {
        let db = Database::new(config.db_config()).await?;

        let notifier: Arc<dyn SupplierNotifier> = match config.notifier.mode {
            NotifierMode::Log => Arc::new(LogNotifier::new(&config.notifier.from_address)),
            NotifierMode::Webhook => {
                let webhook = WebhookConfig::default()
                    .with_endpoint(config.notifier.webhook_url.clone().unwrap_or_default())
                    .with_from_address(&config.notifier.from_address)
                    .with_timeout(Duration::from_secs(config.notifier.timeout_secs));
                Arc::new(
                    WebhookNotifier::new(webhook)
                        .map_err(|e| ServiceError::Config(e.to_string()))?,
                )
            }
        };

        info!(
            database = ?config.database.path,
            notifier = notifier.name(),
            "Stockroom service opened"
        );

        Ok(Self::new(
            db,
            notifier,
            Arc::new(SystemClock),
            config,
        ))
    }

    /// Wires an already-open database to `notifier`.
    ///
    /// Spawns the notification worker, so it must be called inside a Tokio
    /// runtime.
    pub fn new(
        db: Database,
        notifier: Arc<dyn SupplierNotifier>,
        clock: Arc<dyn Clock>,
        config: &StockroomConfig,
    ) -> Self {
        let dispatcher = NotificationDispatcher::spawn(notifier, config.notifier.queue_capacity);
        let alerts = LowStockMonitor::new(
            db.clone(),
            dispatcher.clone(),
            config.throttle(),
            clock.clone(),
        );

        Stockroom {
            db,
            alerts,
            dispatcher,
            clock,
            settings: config.inventory.clone(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Builds a page request, filling gaps with the configured page size.
    pub fn page(&self, page: Option<u32>, limit: Option<u32>) -> PageRequest {
        PageRequest::new(
            page.unwrap_or(1),
            limit.unwrap_or(self.settings.default_page_size),
        )
    }

    /// Delivers queued alerts, then stops the notification worker.
    pub async fn shutdown(&self) {
        self.dispatcher.shutdown().await;
    }

    pub(crate) fn check_page(&self, request: PageRequest) -> ServiceResult<PageRequest> {
        Ok(validate_page_request(request, self.settings.max_page_size)?)
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Product, order, and supplier counts plus revenue from issued orders.
    pub async fn get_stats(&self) -> ServiceResult<DashboardStats> {
        Ok(self.db.stats().dashboard().await?)
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    pub async fn create_supplier(&self, input: NewSupplier) -> ServiceResult<Supplier> {
        let now = self.clock.now();
        let supplier = Supplier {
            id: generate_supplier_id(),
            name: validate_required("name", &input.name, 200)?,
            contact_number: validate_contact_number(&input.contact_number)?,
            email: normalize_email(input.email.as_deref())?,
            address: validate_optional("address", input.address.as_deref(), 500)?,
            products_supplied: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let supplier = self.db.suppliers().insert(&supplier).await?;
        info!(id = %supplier.id, name = %supplier.name, "Supplier created");
        Ok(supplier)
    }

    pub async fn get_supplier(&self, id: &str) -> ServiceResult<Supplier> {
        self.db
            .suppliers()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::SupplierNotFound(id.to_string()).into())
    }

    pub async fn list_suppliers(&self, request: PageRequest) -> ServiceResult<Page<Supplier>> {
        let request = self.check_page(request)?;
        Ok(self.db.suppliers().list(request).await?)
    }

    pub async fn update_supplier(&self, id: &str, patch: SupplierPatch) -> ServiceResult<Supplier> {
        if patch.is_empty() {
            return self.get_supplier(id).await;
        }

        let patch = SupplierPatch {
            name: patch
                .name
                .map(|n| validate_required("name", &n, 200))
                .transpose()?,
            contact_number: patch
                .contact_number
                .map(|c| validate_contact_number(&c))
                .transpose()?,
            email: match patch.email {
                Some(e) => normalize_email(Some(e.as_str()))?,
                None => None,
            },
            address: match patch.address {
                Some(a) => validate_optional("address", Some(a.as_str()), 500)?,
                None => None,
            },
        };

        let supplier = self.db.suppliers().update(id, &patch).await?;
        debug!(id = %id, "Supplier updated");
        Ok(supplier)
    }

    /// Removes the supplier. Its products stay and keep their `supplier_id`.
    pub async fn delete_supplier(&self, id: &str) -> ServiceResult<()> {
        self.db.suppliers().delete(id).await?;
        info!(id = %id, "Supplier deleted");
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn create_product(&self, input: NewProduct) -> ServiceResult<Product> {
        let quantity = validate_order_quantity(Some(input.quantity))?;
        let price = validate_price_cents(input.price_per_item_cents)?;
        let threshold =
            validate_threshold(input.threshold.unwrap_or(self.settings.default_threshold))?;
        let total = line_total(price, quantity)?;

        let supplier_id = validate_required("supplier_id", &input.supplier_id, 64)?;
        if self.db.suppliers().get_by_id(&supplier_id).await?.is_none() {
            return Err(CoreError::SupplierNotFound(supplier_id).into());
        }

        let now = self.clock.now();
        let product = Product {
            id: generate_product_id(),
            name: validate_required("name", &input.name, 200)?,
            sku: validate_sku(&input.sku)?,
            description: validate_optional("description", input.description.as_deref(), 1000)?,
            category: validate_optional("category", input.category.as_deref(), 100)?,
            quantity,
            threshold,
            total_price_cents: total.cents(),
            supplier_id,
            last_notification_sent: None,
            created_at: now,
            updated_at: now,
        };

        let product = self.db.products().insert(&product).await.map_err(|e| match e {
            // Supplier deleted between the check and the insert
            DbError::ForeignKeyViolation { .. } => {
                ServiceError::from(CoreError::SupplierNotFound(product.supplier_id.clone()))
            }
            other => other.into(),
        })?;

        info!(
            id = %product.id,
            sku = %product.sku,
            quantity = product.quantity,
            "Product created"
        );
        Ok(product)
    }

    pub async fn get_product(&self, id: &str) -> ServiceResult<Product> {
        self.db
            .products()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    pub async fn list_products(&self, request: PageRequest) -> ServiceResult<Page<Product>> {
        let request = self.check_page(request)?;
        Ok(self.db.products().list(request).await?)
    }

    /// Adds `quantity` units (negative to correct a miscount) and their value.
    pub async fn restock_product(&self, id: &str, input: Restock) -> ServiceResult<StockLevel> {
        let quantity = validate_restock_quantity(input.quantity)?;
        let price = validate_price_cents(input.price_per_item_cents)?;
        let added = line_total(price, quantity)?;

        let level = self
            .db
            .products()
            .restock(id, quantity, added.cents())
            .await?;

        info!(
            product_id = %id,
            delta = quantity,
            quantity = level.quantity,
            "Product restocked"
        );

        self.alerts.check(&level).await;
        Ok(level)
    }

    /// Removes the product. Orders that reference it are kept.
    pub async fn delete_product(&self, id: &str) -> ServiceResult<()> {
        self.db.products().delete(id).await?;
        info!(id = %id, "Product deleted");
        Ok(())
    }

    pub(crate) fn now(&self) -> chrono::DateTime<Utc> {
        self.clock.now()
    }
}

/// `price * quantity`, refusing overflow.
pub(crate) fn line_total(price_cents: i64, quantity: i64) -> ServiceResult<Money> {
    Money::from_cents(price_cents).times(quantity).ok_or_else(|| {
        ValidationError::OutOfRange {
            field: "total_price".to_string(),
            min: i64::MIN,
            max: i64::MAX,
        }
        .into()
    })
}

fn normalize_email(email: Option<&str>) -> ServiceResult<Option<String>> {
    match email.map(str::trim) {
        None | Some("") => Ok(None),
        Some(e) => Ok(Some(validate_email(e)?)),
    }
}
