use chrono::NaiveDate;
use std::collections::HashMap;

use crate::availability::DateAvailability;
use crate::catalog::{Activity, AdditionalService, Coupon, DiscountKind, ReservationType};
use crate::repository::CatalogDocument;

fn june_2025(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).expect("seed dates are valid calendar days")
}

fn reservation_type(id: &str, name: &str, base_price: f64) -> ReservationType {
    ReservationType {
        id: id.to_string(),
        name: name.to_string(),
        base_price,
    }
}

fn activity(id: &str, name: &str, price_multiplier: f64) -> Activity {
    Activity {
        id: id.to_string(),
        name: name.to_string(),
        price_multiplier,
    }
}

fn service(id: &str, name: &str, price: f64) -> AdditionalService {
    AdditionalService {
        id: id.to_string(),
        name: name.to_string(),
        price,
    }
}

fn coupon(code: &str, discount: f64, kind: DiscountKind) -> Coupon {
    Coupon {
        code: code.to_string(),
        discount,
        kind,
    }
}

fn calendar(open: &[u32], closed: &[u32]) -> Vec<DateAvailability> {
    let mut entries: Vec<DateAvailability> = open
        .iter()
        .map(|d| DateAvailability::open(june_2025(*d)))
        .chain(closed.iter().map(|d| DateAvailability::closed(june_2025(*d))))
        .collect();
    entries.sort_by_key(|e| e.date);
    entries
}

/// The farm's compiled-in catalog. Prices are whole currency units.
pub fn default_document() -> CatalogDocument {
    let reservation_types = vec![
        reservation_type("stay", "Estancia en Granja", 150.0),
        reservation_type("workshop", "Taller", 75.0),
        reservation_type("culinary", "Curso Culinario", 120.0),
        reservation_type("team", "Formación de Equipos", 200.0),
        reservation_type("venue", "Alquiler de Local", 2000.0),
    ];

    let mut activities_by_type = HashMap::new();
    activities_by_type.insert(
        "stay".to_string(),
        vec![
            activity("standard", "Habitación Estándar", 1.0),
            activity("deluxe", "Habitación Deluxe", 1.5),
            activity("suite", "Suite de Granja", 2.0),
        ],
    );
    activities_by_type.insert(
        "workshop".to_string(),
        vec![
            activity("gardening", "Jardinería Orgánica", 1.0),
            activity("farming", "Agricultura Sostenible", 1.2),
            activity("crafts", "Artesanías Tradicionales", 1.1),
        ],
    );
    activities_by_type.insert(
        "culinary".to_string(),
        vec![
            activity("basics", "Fundamentos de la Cocina de Granja", 1.0),
            activity("advanced", "Cocina Avanzada", 1.3),
            activity("baking", "Panadería Artesanal", 1.2),
        ],
    );
    activities_by_type.insert(
        "team".to_string(),
        vec![
            activity("outdoor", "Actividades al Aire Libre", 1.0),
            activity("cooking", "Desafío de Cocina", 1.1),
            activity("problem", "Resolución de Problemas", 1.0),
        ],
    );
    activities_by_type.insert(
        "venue".to_string(),
        vec![
            activity("wedding", "Boda", 1.2),
            activity("corporate", "Evento Corporativo", 1.0),
            activity("private", "Fiesta Privada", 0.8),
        ],
    );

    let mut available_dates = HashMap::new();
    available_dates.insert("stay".to_string(), calendar(&[10, 11, 12, 13, 14, 17, 18], &[15, 16]));
    available_dates.insert("workshop".to_string(), calendar(&[10, 15, 20, 25], &[]));
    available_dates.insert("culinary".to_string(), calendar(&[12, 19, 26], &[]));
    available_dates.insert("team".to_string(), calendar(&[5, 12, 19, 26], &[]));
    available_dates.insert("venue".to_string(), calendar(&[1, 8, 15, 22, 29], &[]));

    let additional_services = vec![
        service("transport", "Transporte", 50.0),
        service("guided", "Visita Guiada", 35.0),
        service("meal", "Paquete Especial de Comidas", 75.0),
        service("spa", "Tratamiento de Spa", 120.0),
        service("photography", "Servicio de Fotografía", 200.0),
    ];

    let coupons = vec![
        coupon("WELCOME10", 0.1, DiscountKind::Percentage),
        coupon("SUMMER25", 0.25, DiscountKind::Percentage),
        coupon("FARM50", 50.0, DiscountKind::Fixed),
    ];

    CatalogDocument {
        reservation_types,
        activities_by_type,
        available_dates,
        additional_services,
        coupons,
    }
}
