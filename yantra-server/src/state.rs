//! Application state

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_sesv2::Client as SesClient;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::error::BoxError;
use crate::notify::whatsapp::WhatsAppClient;
use crate::notify::{Notifier, OrderNotifier};
use crate::orders::pricing::ShippingPolicy;
use crate::payment::RazorpayClient;

/// Timeout for every outbound HTTP call (payment gateway, WhatsApp)
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Order notification channels
    pub notifier: Arc<dyn OrderNotifier>,
    /// Payment gateway client
    pub razorpay: RazorpayClient,
    /// Shipping charge policy applied when pricing orders
    pub shipping: ShippingPolicy,
    /// Session token secret
    pub jwt_secret: String,
    /// Identity webhook signing secret
    pub identity_webhook_secret: String,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let ses = if let Some(ses_region) = &config.ses_region {
            let ses_config = aws_config
                .to_builder()
                .region(aws_config::Region::new(ses_region.clone()))
                .build();
            SesClient::new(&ses_config)
        } else {
            SesClient::new(&aws_config)
        };

        let http = reqwest::Client::builder()
            .timeout(OUTBOUND_TIMEOUT)
            .build()?;

        let notifier = Notifier::new(
            ses,
            config.mail_from.clone(),
            config.admin_email.clone(),
            config.admin_phone.clone(),
            WhatsAppClient::new(
                http.clone(),
                config.whatsapp_api_token.clone(),
                config.whatsapp_phone_number_id.clone(),
            ),
        );

        Ok(Self {
            pool,
            notifier: Arc::new(notifier),
            razorpay: RazorpayClient::new(
                http,
                config.razorpay_key_id.clone(),
                config.razorpay_key_secret.clone(),
            ),
            shipping: ShippingPolicy {
                flat_fee: config.shipping_flat_fee,
                free_threshold: config.free_shipping_threshold,
            },
            jwt_secret: config.jwt_secret.clone(),
            identity_webhook_secret: config.identity_webhook_secret.clone(),
        })
    }

    /// State backed by a lazy pool that never connects, for router tests
    #[cfg(test)]
    pub fn for_tests(notifier: Arc<dyn OrderNotifier>) -> Self {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/yantra_test")
            .unwrap();
        Self {
            pool,
            notifier,
            razorpay: RazorpayClient::new(
                reqwest::Client::new(),
                "rzp_test_key".into(),
                "rzp_test_secret".into(),
            ),
            shipping: ShippingPolicy::default(),
            jwt_secret: crate::auth::session::tests::SECRET.into(),
            identity_webhook_secret: crate::identity::tests::SECRET.into(),
        }
    }
}
