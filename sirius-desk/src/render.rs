use sirius_catalog::{format_amount, round_minor, CatalogRepository, DiscountKind};
use sirius_core::ValidationErrors;
use sirius_reservation::{BookingConfirmation, ChangeReport, FormController, FormView};

/// Joins output lines, each terminated by a newline.
fn block(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

/// Plain-text listing of everything the farm offers.
pub fn catalog_listing<C: CatalogRepository + ?Sized>(catalog: &C, symbol: &str) -> String {
    let mut lines = vec!["Reservation types".to_string()];
    for t in catalog.types() {
        lines.push(format!("  {:<10} {:<32} {}", t.id, t.name, format_amount(t.base_price, symbol)));
        for a in catalog.activities(&t.id) {
            lines.push(format!("    - {:<12} {:<34} x{}", a.id, a.name, a.price_multiplier));
        }
        let open = catalog.availability(&t.id).available_dates();
        if !open.is_empty() {
            let dates: Vec<String> = open.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
            lines.push(format!("    open: {}", dates.join(", ")));
        }
    }

    lines.push("Additional services".to_string());
    for s in catalog.services() {
        lines.push(format!("  {:<12} {:<32} {}", s.id, s.name, format_amount(s.price, symbol)));
    }

    block(lines)
}

/// Coupon summary line, e.g. `SUMMER25 (25% off)`.
pub fn coupon_label<C: CatalogRepository + ?Sized>(catalog: &C, code: &str, symbol: &str) -> String {
    match catalog.coupon(code) {
        Some(c) => match c.kind {
            DiscountKind::Percentage => format!("{} ({}% off)", c.code, round_minor(c.discount * 100.0)),
            DiscountKind::Fixed => format!("{} ({} off)", c.code, format_amount(c.discount, symbol)),
        },
        None => format!("{} (not recognised)", code),
    }
}

pub fn quote_summary<C: CatalogRepository>(
    controller: &FormController<C>,
    report: &ChangeReport,
    validation: Result<(), ValidationErrors>,
    symbol: &str,
) -> String {
    let form = controller.form();
    let catalog = controller.catalog();
    let view: FormView = controller.view();
    let price = view.price.rounded();

    let type_name = form
        .reservation_type
        .as_deref()
        .map(|t| catalog.reservation_type(t).map(|rt| rt.name.clone()).unwrap_or_else(|| t.to_string()))
        .unwrap_or_else(|| "(none)".to_string());
    let activity_name = match (form.reservation_type.as_deref(), form.activity.as_deref()) {
        (Some(t), Some(a)) => catalog.activity(t, a).map(|x| x.name.clone()).unwrap_or_else(|| a.to_string()),
        _ => "(none)".to_string(),
    };

    let mut lines = vec![
        format!("Reservation: {} / {}", type_name, activity_name),
        format!("People:      {}", form.people),
    ];
    if let Some(nights) = price.nights {
        lines.push(format!("Nights:      {}", nights));
    }
    if let Some(occurrences) = price.occurrences {
        lines.push(format!("Sessions:    {} (recurring series)", occurrences));
    }
    if let Some(code) = form.coupon_code.as_deref() {
        lines.push(format!("Coupon:      {}", coupon_label(catalog, code, symbol)));
    }

    lines.push(format!("Estimated:   {}", format_amount(price.estimated, symbol)));
    lines.push(format!("Services:    {}", format_amount(price.additional_services, symbol)));
    lines.push(format!("Discount:   -{}", format_amount(price.discount, symbol)));
    lines.push(format!("Total:       {}", format_amount(price.total, symbol)));

    for field in &report.cleared {
        lines.push(format!("note: {} was cleared for the selected reservation type", field.as_str()));
    }

    let mut out = block(lines);
    if let Err(errors) = validation {
        out.push_str(&validation_report(&errors));
    }
    out
}

pub fn validation_report(errors: &ValidationErrors) -> String {
    let mut lines = vec!["Please fix the following:".to_string()];
    lines.extend(errors.iter().map(|e| format!("  {}: {}", e.field, e.message)));
    block(lines)
}

pub fn confirmation(confirmation: &BookingConfirmation, symbol: &str) -> String {
    let mut lines = vec![
        "Reservation confirmed. Thank you for choosing Sirius Farm!".to_string(),
        format!("Booking reference: {}", confirmation.reference),
    ];
    if let Some(date) = confirmation.date {
        lines.push(format!("Date:              {}", date.format("%Y-%m-%d")));
    }
    lines.push(format!("Total:             {}", format_amount(confirmation.breakdown.total, symbol)));
    block(lines)
}
