//! Built-in fleet sample, used when no dataset file is given

use chrono::{Duration, TimeZone, Utc};

use super::{capitalize, format_currency, Dataset};
use crate::table::{Align, Column, Row, Value};

const MAKES: [(&str, &str); 6] = [
    ("Toyota", "Hiace"),
    ("Ford", "Transit"),
    ("Tesla", "Model 3"),
    ("Mercedes", "Sprinter"),
    ("Nissan", "Leaf"),
    ("Volkswagen", "Crafter"),
];

const DRIVERS: [&str; 9] = [
    "Amara Okafor",
    "Ben Ishikawa",
    "carla Mendes",
    "Dmitri Volkov",
    "Elif Kaya",
    "Farah Haddad",
    "Gus Lindqvist",
    "Hana Novak",
    "Ivo Petrov",
];

const STATUSES: [&str; 4] = ["active", "maintenance", "idle", "retired"];

const TAGS: [&str; 5] = ["ev", "cargo", "airport", "night", "wheelchair"];

/// Number of vehicles in the sample
pub const VEHICLE_COUNT: usize = 57;

pub fn vehicles() -> Dataset {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();

    let rows = (0..VEHICLE_COUNT)
        .map(|i| {
            let (make, model) = MAKES[i * 7 % MAKES.len()];
            // every eighth vehicle is unassigned, every eleventh has no service record
            let driver = (i % 8 != 3).then(|| DRIVERS[i * 5 % DRIVERS.len()]);
            let serviced = (i % 11 != 6).then(|| base + Duration::days((i * 37 % 300) as i64));
            let tags: Vec<Value> = TAGS
                .iter()
                .enumerate()
                .filter(|(t, _)| (i + t) % 3 == 0)
                .map(|(_, tag)| Value::from(*tag))
                .collect();

            Row::new()
                .with("plate", format!("FL-{:03}", 100 + i * 13 % 900))
                .with("make", make)
                .with("model", model)
                .with("driver", driver)
                .with("trips", ((i * 89) % 400) as i64)
                .with("rating", 3.0 + ((i * 17) % 21) as f64 / 10.0)
                .with("last_service", serviced)
                .with("tags", tags)
                .with("status", STATUSES[i * 3 % STATUSES.len()])
                .with("daily_rate", 45.0 + ((i * 29) % 120) as f64)
        })
        .collect();

    Dataset {
        title: "Vehicles".to_string(),
        columns: columns(),
        rows,
    }
}

fn columns() -> Vec<Column> {
    vec![
        Column::field("Plate", "plate").width(8),
        Column::computed("Vehicle", |row| format!("{} {}", row.get("make"), row.get("model"))),
        Column::field("Driver", "driver"),
        Column::field("Trips", "trips").align(Align::Right).width(8),
        Column::field("Rating", "rating").align(Align::Right).width(9),
        Column::field("Serviced", "last_service").width(11),
        Column::field("Tags", "tags"),
        Column::field("Status", "status")
            .render_with(|row| capitalize(&row.get("status").to_string())),
        Column::field("Daily", "daily_rate")
            .align(Align::Right)
            .render_with(|row| format_currency(row.get("daily_rate"))),
        Column::computed("Actions", |_| "view · delete".to_string()).width(13),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{TableOptions, TableState};

    #[test]
    fn test_demo_shape() {
        let ds = vehicles();
        assert_eq!(ds.rows.len(), VEHICLE_COUNT);
        assert_eq!(ds.columns.len(), 10);
        assert!(ds.rows.iter().any(|r| r.get("driver").is_null()));
        assert!(ds.rows.iter().any(|r| r.get("last_service").is_null()));
        assert!(matches!(ds.rows[0].get("last_service"), Value::Date(_)));
    }

    #[test]
    fn test_demo_pages() {
        let ds = vehicles();
        let mut table = TableState::new(ds.rows, ds.columns, TableOptions::default()).unwrap();
        assert_eq!(table.page_count(), 6);
        table.last();
        assert_eq!(table.view().rows.len(), 7);
    }

    #[test]
    fn test_demo_sorts_by_service_date() {
        let ds = vehicles();
        let mut table = TableState::new(ds.rows, ds.columns, TableOptions::default()).unwrap();
        table.set_page_size(100);
        table.sort("last_service");
        let view = table.view();
        let dates: Vec<i64> = view
            .rows
            .iter()
            .filter_map(|r| match r.get("last_service") {
                Value::Date(d) => Some(d.timestamp()),
                _ => None,
            })
            .collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
        assert!(view.rows.last().is_some_and(|r| r.get("last_service").is_null()));
    }
}
