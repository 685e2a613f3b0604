use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use shared::models::Order;

use crate::error::BoxError;

/// Plain-text line-by-line order summary shared by every channel
pub fn order_summary(order: &Order) -> String {
    let mut lines = Vec::with_capacity(order.items.len() + 3);
    for item in &order.items {
        let mut line = format!("- {}", item.name);
        if let Some(variant) = &item.variant {
            line.push_str(&format!(" ({variant})"));
        }
        if item.energized {
            line.push_str(" [Energized]");
        }
        line.push_str(&format!(" x{} @ Rs. {}", item.quantity, item.price));
        lines.push(line);
    }
    lines.push(format!("Subtotal: Rs. {}", order.subtotal));
    lines.push(format!("Shipping: Rs. {}", order.shipping));
    lines.push(format!("Total: Rs. {}", order.total));
    lines.join("\n")
}

async fn send_text(
    ses: &SesClient,
    from: &str,
    to: &str,
    subject: &str,
    body_text: String,
) -> Result<(), BoxError> {
    let subject = Content::builder().data(subject).build()?;
    let body = Body::builder()
        .text(Content::builder().data(body_text).build()?)
        .build();
    let message = Message::builder().subject(subject).body(body).build();

    ses.send_email()
        .from_email_address(from)
        .destination(Destination::builder().to_addresses(to).build())
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await?;
    Ok(())
}

pub async fn send_order_confirmation(
    ses: &SesClient,
    from: &str,
    to: &str,
    order: &Order,
) -> Result<(), BoxError> {
    let body_text = format!(
        "Namaste {name},\n\n\
         Thank you for your order. We have received it and will be in touch \
         when it ships.\n\n\
         Order: {id}\n\
         {summary}\n\n\
         Shipping to:\n{address}",
        name = order.customer_name,
        id = order.id,
        summary = order_summary(order),
        address = order.shipping_address,
    );

    send_text(ses, from, to, "Your order has been received", body_text).await?;
    tracing::info!(to = to, order_id = %order.id, "Order confirmation sent");
    Ok(())
}

pub async fn send_admin_order_alert(
    ses: &SesClient,
    from: &str,
    to: &str,
    order: &Order,
) -> Result<(), BoxError> {
    let body_text = format!(
        "New order {id}\n\n\
         Customer: {name}\n\
         Phone: {phone}\n\
         Email: {email}\n\
         Address: {address}\n\n\
         {summary}",
        id = order.id,
        name = order.customer_name,
        phone = order.customer_phone,
        email = order.customer_email.as_deref().unwrap_or("-"),
        address = order.shipping_address,
        summary = order_summary(order),
    );

    let subject = format!("New order: Rs. {}", order.total);
    send_text(ses, from, to, &subject, body_text).await?;
    tracing::info!(order_id = %order.id, "Admin order alert sent");
    Ok(())
}
