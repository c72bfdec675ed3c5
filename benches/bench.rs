// Criterion benchmarks for Foyer Queue

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use foyer_queue::core::{pick_unbounded_fallback, resolve_category, reservation_deadline, WorkingDays};
use foyer_queue::models::{CandidateTicket, TicketCategory, TicketStatus};

fn unbounded_category(id: i64) -> TicketCategory {
    TicketCategory {
        id,
        event_id: 1,
        unbounded: true,
        expiration: Utc
            .with_ymd_and_hms(2026, 9, 1, 12, 0, 0)
            .unwrap()
            + chrono::Duration::hours(id),
    }
}

fn unbound_ticket(id: i64) -> CandidateTicket {
    CandidateTicket {
        id,
        event_id: 1,
        category_id: None,
        status: TicketStatus::Waiting,
        reservation_id: None,
    }
}

fn bench_reservation_deadline(c: &mut Criterion) {
    let working = WorkingDays::default();
    let tuesday = Utc.with_ymd_and_hms(2026, 8, 4, 10, 0, 0).unwrap();
    let friday_night = Utc.with_ymd_and_hms(2026, 8, 7, 23, 0, 0).unwrap();

    c.bench_function("deadline_on_working_day", |b| {
        b.iter(|| reservation_deadline(black_box(tuesday), black_box(4), &working));
    });

    c.bench_function("deadline_shifted_over_weekend", |b| {
        b.iter(|| reservation_deadline(black_box(friday_night), black_box(4), &working));
    });
}

fn bench_category_fallback(c: &mut Criterion) {
    let mut group = c.benchmark_group("category_fallback");

    for category_count in [1i64, 10, 100].iter() {
        let categories: Vec<TicketCategory> =
            (0..*category_count).map(unbounded_category).collect();
        let ticket = unbound_ticket(1);

        group.bench_with_input(
            BenchmarkId::new("resolve_unbound", category_count),
            category_count,
            |b, _| {
                b.iter(|| {
                    let fallback = pick_unbounded_fallback(black_box(&categories));
                    resolve_category(black_box(&ticket), fallback)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_reservation_deadline, bench_category_fallback);

criterion_main!(benches);
