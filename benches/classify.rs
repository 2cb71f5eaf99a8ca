// benches/classify.rs
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gw_crawl::classify::classify;
use gw_crawl::model::EventType;
use gw_crawl::specs::roster::{self, RosterContext};
use gw_crawl::tables::Tables;

const LABELS: [&str; 8] = [
    "Commanding Officer",
    "Squad Leader Alpha",
    "Rifleman (AT)",
    "Automatic Rifleman",
    "Combat Medic",
    "JTAC (Senior)",
    "Kameramann (AK-74)",
    "Spaßvogel",
];

fn roster_body() -> Vec<String> {
    let mut lines = vec![
        "Eventbeginn: 19:30 Uhr<br />".to_owned(),
        "<strong>Slotliste:</strong><br />".to_owned(),
    ];
    for (i, label) in LABELS.iter().cycle().take(40).enumerate() {
        lines.push(format!("#{} - {label} - <strong>Spieler{i}</strong><br />", i + 1));
    }
    lines
}

fn bench_classify(c: &mut Criterion) {
    let tables = Tables::embedded().expect("embedded tables");

    c.bench_function("classify_labels", |b| {
        b.iter(|| {
            for label in LABELS {
                black_box(classify(black_box(label), &tables));
            }
        })
    });

    let body = roster_body();
    let date = NaiveDate::from_ymd_opt(2013, 7, 21).expect("date");
    let ctx = RosterContext {
        title: "[21.07.2013] Co40 - Benchmark",
        size: Some(40),
        event_type: EventType::Coop,
        date,
        ledger: None,
        tables: &tables,
        today: date,
    };

    c.bench_function("roster_extract_40", |b| {
        b.iter(|| {
            let roster = roster::extract(black_box(&body), &ctx).expect("roster");
            black_box(roster.value.slot_count())
        })
    });
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
