//! Order notifications: customer email, admin email, admin WhatsApp

pub mod whatsapp;

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use shared::models::Order;

use crate::email;
use crate::error::BoxError;
use whatsapp::WhatsAppClient;

#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn notify_customer(&self, order: &Order) -> Result<(), BoxError>;
    async fn notify_admin_email(&self, order: &Order) -> Result<(), BoxError>;
    async fn notify_admin_whatsapp(&self, order: &Order) -> Result<(), BoxError>;
}

/// Fire all three notifications concurrently and wait for them.
///
/// Each failure is logged and dropped; the order already exists.
pub async fn order_placed<N: OrderNotifier + ?Sized>(notifier: &N, order: &Order) {
    let (customer, admin_email, admin_whatsapp) = tokio::join!(
        notifier.notify_customer(order),
        notifier.notify_admin_email(order),
        notifier.notify_admin_whatsapp(order),
    );

    for (channel, result) in [
        ("customer_email", customer),
        ("admin_email", admin_email),
        ("admin_whatsapp", admin_whatsapp),
    ] {
        if let Err(e) = result {
            tracing::warn!(order_id = %order.id, channel, error = %e, "Order notification failed");
        }
    }
}

/// Production notifier: SES email plus WhatsApp Cloud API
pub struct Notifier {
    ses: SesClient,
    mail_from: String,
    admin_email: String,
    admin_phone: String,
    whatsapp: WhatsAppClient,
}

impl Notifier {
    pub fn new(
        ses: SesClient,
        mail_from: String,
        admin_email: String,
        admin_phone: String,
        whatsapp: WhatsAppClient,
    ) -> Self {
        Self {
            ses,
            mail_from,
            admin_email,
            admin_phone,
            whatsapp,
        }
    }
}

#[async_trait]
impl OrderNotifier for Notifier {
    async fn notify_customer(&self, order: &Order) -> Result<(), BoxError> {
        let Some(to) = order.customer_email.as_deref() else {
            tracing::debug!(order_id = %order.id, "No customer email, skipping confirmation");
            return Ok(());
        };
        email::send_order_confirmation(&self.ses, &self.mail_from, to, order).await
    }

    async fn notify_admin_email(&self, order: &Order) -> Result<(), BoxError> {
        email::send_admin_order_alert(&self.ses, &self.mail_from, &self.admin_email, order).await
    }

    async fn notify_admin_whatsapp(&self, order: &Order) -> Result<(), BoxError> {
        let body = format!(
            "New order from {} ({})\n{}\n\n{}",
            order.customer_name,
            order.customer_phone,
            order.shipping_address,
            email::order_summary(order),
        );
        self.whatsapp.send_text(&self.admin_phone, &body).await?;
        tracing::info!(order_id = %order.id, "Admin WhatsApp alert sent");
        Ok(())
    }
}
