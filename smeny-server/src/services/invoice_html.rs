//! Printable invoice rendering (HTML, print-to-PDF in the browser)

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use shared::models::{InvoiceDetail, User};
use std::fmt::Write;

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Czech money format: `12 345,50 CZK`
pub fn format_money(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{frac} {currency}")
}

fn format_date(date: NaiveDate) -> String {
    date.format("%-d. %-m. %Y").to_string()
}

fn opt(s: &Option<String>) -> String {
    s.as_deref().map(escape_html).unwrap_or_default()
}

/// Full HTML document for an invoice issued by `issuer`
pub fn render(detail: &InvoiceDetail, issuer: &User) -> String {
    let inv = &detail.invoice;
    let cust = &detail.customer;
    let cur = escape_html(&inv.currency);

    let supplier_name = issuer
        .company_name
        .clone()
        .unwrap_or_else(|| issuer.full_name());

    let mut rows = String::new();
    for item in &detail.items {
        // Writing into a String cannot fail
        let _ = write!(
            rows,
            "<tr><td>{}</td><td class=\"num\">{}</td><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
            escape_html(&item.description),
            item.quantity.normalize(),
            escape_html(&item.unit),
            format_money(item.unit_price, &cur),
            format_money(item.total, &cur),
        );
    }

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="cs">
<head>
<meta charset="utf-8">
<title>Faktura {number}</title>
<style>
body {{ font-family: sans-serif; margin: 2cm; color: #222; }}
h1 {{ font-size: 1.6em; }}
.parties {{ display: flex; justify-content: space-between; margin-bottom: 1.5em; }}
table {{ width: 100%; border-collapse: collapse; }}
th, td {{ border-bottom: 1px solid #ccc; padding: 0.4em; text-align: left; }}
.num {{ text-align: right; }}
.total {{ font-size: 1.2em; font-weight: bold; text-align: right; margin-top: 1em; }}
@media print {{ body {{ margin: 0; }} }}
</style>
</head>
<body>
<h1>Faktura č. {number}</h1>
<div class="parties">
<div><h3>Dodavatel</h3><p>{supplier}<br>{supplier_address}<br>IČO: {supplier_ico}<br>DIČ: {supplier_dic}</p></div>
<div><h3>Odběratel</h3><p>{customer}<br>{customer_address}<br>{customer_zip} {customer_city}<br>IČO: {customer_ico}<br>DIČ: {customer_dic}</p></div>
</div>
<p>Datum vystavení: {issue}<br>Datum splatnosti: {due}<br>DUZP: {taxable}<br>Variabilní symbol: {vs}</p>
<table>
<thead><tr><th>Popis</th><th class="num">Množství</th><th>Jednotka</th><th class="num">Cena za jednotku</th><th class="num">Celkem</th></tr></thead>
<tbody>{rows}</tbody>
</table>
<p class="total">Celkem k úhradě: {total}</p>
{notes}
</body>
</html>
"#,
        number = escape_html(&inv.invoice_number),
        supplier = escape_html(&supplier_name),
        supplier_address = opt(&issuer.company_address),
        supplier_ico = opt(&issuer.company_ico),
        supplier_dic = opt(&issuer.company_dic),
        customer = escape_html(&cust.name),
        customer_address = opt(&cust.address),
        customer_zip = opt(&cust.zip),
        customer_city = opt(&cust.city),
        customer_ico = opt(&cust.ico),
        customer_dic = opt(&cust.dic),
        issue = format_date(inv.issue_date),
        due = format_date(inv.due_date),
        taxable = inv.taxable_date.map(format_date).unwrap_or_default(),
        vs = opt(&inv.variable_symbol),
        rows = rows,
        total = format_money(inv.total_amount, &cur),
        notes = inv
            .notes
            .as_deref()
            .map(|n| format!("<p>{}</p>", escape_html(n)))
            .unwrap_or_default(),
    );
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Customer, Invoice, InvoiceItem, UserRole};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec("1234.5"), "CZK"), "1 234,50 CZK");
        assert_eq!(format_money(dec("999"), "CZK"), "999,00 CZK");
        assert_eq!(format_money(dec("1234567.891"), "EUR"), "1 234 567,89 EUR");
        assert_eq!(format_money(dec("-50.125"), "CZK"), "-50,13 CZK");
        assert_eq!(format_money(Decimal::ZERO, "CZK"), "0,00 CZK");
    }

    #[test]
    fn test_render_escapes_and_lists_items() {
        let issuer = User {
            id: 1,
            username: "firma".into(),
            email: "f@example.cz".into(),
            password_hash: String::new(),
            first_name: "Jana".into(),
            last_name: "Nová".into(),
            phone: None,
            role: UserRole::Company,
            parent_company_id: None,
            company_name: Some("Nová & spol.".into()),
            company_ico: Some("27074358".into()),
            company_dic: None,
            company_address: Some("Dlouhá 1".into()),
            hourly_rate: None,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        };
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        let detail = InvoiceDetail {
            invoice: Invoice {
                id: 10,
                user_id: 1,
                customer_id: 20,
                invoice_number: "20260001".into(),
                issue_date: date,
                due_date: date,
                taxable_date: None,
                variable_symbol: Some("20260001".into()),
                currency: "CZK".into(),
                is_paid: false,
                notes: Some("<script>".into()),
                total_amount: dec("1500"),
                created_at: 0,
                updated_at: 0,
            },
            items: vec![InvoiceItem {
                id: 1,
                invoice_id: 10,
                description: "Úklid".into(),
                quantity: dec("3.000"),
                unit: "h".into(),
                unit_price: dec("500"),
                total: dec("1500"),
            }],
            customer: Customer {
                id: 20,
                user_id: 1,
                name: "Odběratel s.r.o.".into(),
                ico: None,
                dic: None,
                address: None,
                city: Some("Brno".into()),
                zip: Some("60200".into()),
                email: None,
                phone: None,
                created_at: 0,
                updated_at: 0,
            },
        };

        let html = render(&detail, &issuer);
        assert!(html.contains("Faktura č. 20260001"));
        assert!(html.contains("Nová &amp; spol."));
        assert!(html.contains("<td>Úklid</td><td class=\"num\">3</td>"));
        assert!(html.contains("Celkem k úhradě: 1 500,00 CZK"));
        assert!(html.contains("5. 3. 2026"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
