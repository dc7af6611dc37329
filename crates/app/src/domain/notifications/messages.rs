//! Message rendering for restock, delay and fulfilment notices.

use std::fmt::Write as _;

use jiff::Timestamp;
use restock::email::EmailAddress;

use crate::domain::notifications::transport::OutboundEmail;

/// One restocked item in a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockLine {
    pub name: String,
    pub purchase_link: String,
}

/// Escape text for inclusion in HTML element content or attribute values.
#[must_use]
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

fn html_document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"UTF-8\"><title>{}</title></head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

fn link(href: &str, label: &str) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        escape_html(href),
        escape_html(label)
    )
}

/// A single item is back in stock.
#[must_use]
pub fn restock_notice(
    recipient: EmailAddress,
    line: &RestockLine,
    hold_minutes: u32,
) -> OutboundEmail {
    let subject = format!("{} is back in stock", line.name);

    let text = format!(
        "Good news! {} is back in stock.\n\nBuy it now: {}\n\nWe'll try to hold one for you for {hold_minutes} minutes.\n",
        line.name, line.purchase_link
    );

    let body = format!(
        "<p>Good news! <strong>{}</strong> is back in stock.</p>\n<p>{}</p>\n<p>We'll try to hold one for you for {hold_minutes} minutes.</p>\n",
        escape_html(&line.name),
        link(&line.purchase_link, "Buy it now")
    );

    OutboundEmail {
        recipient,
        html: html_document(&subject, &body),
        subject,
        text,
    }
}

/// Several items a recipient was waiting for are back in stock.
#[must_use]
pub fn consolidated_restock_notice(
    recipient: EmailAddress,
    lines: &[RestockLine],
    hold_minutes: u32,
) -> OutboundEmail {
    let subject = format!("{} items on your waitlist are back in stock", lines.len());

    let mut text = String::from("Good news! These items are back in stock:\n\n");
    let mut items = String::from("<ul>\n");

    for line in lines {
        let _ = writeln!(text, "- {}: {}", line.name, line.purchase_link);
        let _ = writeln!(
            items,
            "<li><strong>{}</strong> {}</li>",
            escape_html(&line.name),
            link(&line.purchase_link, "Buy it now")
        );
    }

    items.push_str("</ul>\n");

    let _ = write!(
        text,
        "\nWe'll try to hold one of each for you for {hold_minutes} minutes.\n"
    );

    let body = format!(
        "<p>Good news! These items are back in stock:</p>\n{items}<p>We'll try to hold one of each for you for {hold_minutes} minutes.</p>\n"
    );

    OutboundEmail {
        recipient,
        html: html_document(&subject, &body),
        subject,
        text,
    }
}

fn describe_expected(expected: Option<Timestamp>) -> String {
    expected.map_or_else(
        || "We don't have a new restock date yet.".to_string(),
        |date| format!("We now expect it to ship after {}.", date.strftime("%Y-%m-%d")),
    )
}

/// A backorder's expected date slipped or is no longer known.
#[must_use]
pub fn delay_notice(
    recipient: EmailAddress,
    items: &[String],
    expected: Option<Timestamp>,
    order_link: &str,
    cancel_link: &str,
) -> OutboundEmail {
    let subject = "Your backorder is delayed".to_string();
    let names = items.join(", ");
    let expected = describe_expected(expected);

    let text = format!(
        "Your backorder for {names} is taking longer than expected. {expected}\n\nView your order: {order_link}\nCancel your order: {cancel_link}\n"
    );

    let body = format!(
        "<p>Your backorder for <strong>{}</strong> is taking longer than expected. {}</p>\n<p>{}</p>\n<p>Changed your mind? {}</p>\n",
        escape_html(&names),
        escape_html(&expected),
        link(order_link, "View your order"),
        link(cancel_link, "Cancel your order")
    );

    OutboundEmail {
        recipient,
        html: html_document(&subject, &body),
        subject,
        text,
    }
}

/// Every line of a backorder has been allocated and the order is being prepared.
#[must_use]
pub fn fulfillment_notice(
    recipient: EmailAddress,
    items: &[String],
    order_link: &str,
) -> OutboundEmail {
    let subject = "Your backorder is on its way".to_string();
    let names = items.join(", ");

    let text = format!(
        "Everything on your backorder ({names}) is now in stock and being prepared for shipping.\n\nView your order: {order_link}\n"
    );

    let body = format!(
        "<p>Everything on your backorder (<strong>{}</strong>) is now in stock and being prepared for shipping.</p>\n<p>{}</p>\n",
        escape_html(&names),
        link(order_link, "View your order")
    );

    OutboundEmail {
        recipient,
        html: html_document(&subject, &body),
        subject,
        text,
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn boots() -> RestockLine {
        RestockLine {
            name: "Trail Boot (Size 42)".to_string(),
            purchase_link: "https://shop.example/products/1?reservation=abc".to_string(),
        }
    }

    #[test]
    fn escape_html_replaces_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn restock_notice_names_item_and_link() -> TestResult {
        let email = restock_notice(EmailAddress::parse("ada@example.com")?, &boots(), 30);

        assert_eq!(email.subject, "Trail Boot (Size 42) is back in stock");
        assert!(email.text.contains("https://shop.example/products/1?reservation=abc"));
        assert!(email.text.contains("30 minutes"));
        assert!(email.html.contains("href=\"https://shop.example/products/1?reservation=abc\""));

        Ok(())
    }

    #[test]
    fn product_names_are_escaped_in_html() -> TestResult {
        let line = RestockLine {
            name: "<script>alert(1)</script>".to_string(),
            purchase_link: "https://shop.example/p".to_string(),
        };

        let email = restock_notice(EmailAddress::parse("ada@example.com")?, &line, 30);

        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("&lt;script&gt;"));

        Ok(())
    }

    #[test]
    fn consolidated_notice_lists_every_item() -> TestResult {
        let scarf = RestockLine {
            name: "Wool Scarf".to_string(),
            purchase_link: "https://shop.example/products/2?reservation=def".to_string(),
        };

        let email = consolidated_restock_notice(
            EmailAddress::parse("ada@example.com")?,
            &[boots(), scarf],
            30,
        );

        assert_eq!(email.subject, "2 items on your waitlist are back in stock");
        assert!(email.text.contains("Trail Boot (Size 42)"));
        assert!(email.text.contains("Wool Scarf"));
        assert_eq!(email.html.matches("<li>").count(), 2);

        Ok(())
    }

    #[test]
    fn delay_notice_includes_cancellation_link() -> TestResult {
        let email = delay_notice(
            EmailAddress::parse("ada@example.com")?,
            &["Trail Boot".to_string()],
            None,
            "https://shop.example/backorders/1",
            "https://shop.example/backorders/1/cancel",
        );

        assert!(email.text.contains("Cancel your order: https://shop.example/backorders/1/cancel"));
        assert!(email.text.contains("don't have a new restock date"));

        Ok(())
    }
}
