use crate::Product;

pub const NOTIFICATION_SUBJECT: &str = "New product";
/// SMS gateways reject or split longer bodies.
pub const MAX_MESSAGE_CHARS: usize = 300;
pub const TRUNCATION_MARKER: &str = "…";
/// Characters kept in front of the marker when a body is cut.
const TRUNCATED_PREFIX_CHARS: usize = MAX_MESSAGE_CHARS - 10;

/// Builds the notification body: `title\nurl`, or just `title` without a url.
pub fn compose_message(product: &Product) -> String {
    let message = if product.url.is_empty() {
        product.title.clone()
    } else {
        format!("{}\n{}", product.title, product.url)
    };
    truncate_message(message)
}

/// Cuts bodies longer than [`MAX_MESSAGE_CHARS`] characters and appends the marker.
pub fn truncate_message(message: String) -> String {
    if message.chars().count() <= MAX_MESSAGE_CHARS {
        return message;
    }
    let mut truncated: String = message.chars().take(TRUNCATED_PREFIX_CHARS).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
