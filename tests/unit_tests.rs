// Unit tests for Foyer Queue

use chrono::{Datelike, TimeZone, Utc, Weekday};
use foyer_queue::core::{pick_unbounded_fallback, resolve_category, reservation_deadline, WorkingDays};
use foyer_queue::models::{CandidateTicket, TicketCategory, TicketStatus};

fn unbounded_category(id: i64, expires_day: u32) -> TicketCategory {
    TicketCategory {
        id,
        event_id: 1,
        unbounded: true,
        expiration: Utc.with_ymd_and_hms(2026, 9, expires_day, 12, 0, 0).unwrap(),
    }
}

fn waiting_ticket(id: i64, category_id: Option<i64>) -> CandidateTicket {
    CandidateTicket {
        id,
        event_id: 1,
        category_id,
        status: TicketStatus::Waiting,
        reservation_id: None,
    }
}

#[test]
fn test_deadline_stays_put_on_a_working_day() {
    // Tuesday 10:00 + 4h = Tuesday 14:00, no shift
    let tuesday = Utc.with_ymd_and_hms(2026, 8, 4, 10, 0, 0).unwrap();
    let deadline = reservation_deadline(tuesday, 4, &WorkingDays::default());
    assert_eq!(deadline, Utc.with_ymd_and_hms(2026, 8, 4, 14, 0, 0).unwrap());
}

#[test]
fn test_deadline_crossing_into_saturday_shifts_to_monday() {
    let friday_night = Utc.with_ymd_and_hms(2026, 8, 7, 23, 0, 0).unwrap();
    let deadline = reservation_deadline(friday_night, 4, &WorkingDays::default());
    assert_eq!(deadline, Utc.with_ymd_and_hms(2026, 8, 10, 3, 0, 0).unwrap());
    assert_eq!(deadline.weekday(), Weekday::Mon);
}

#[test]
fn test_long_timeout_spanning_the_weekend() {
    // Tuesday 10:00 + 96h = Saturday 10:00 -> Monday 10:00
    let tuesday = Utc.with_ymd_and_hms(2026, 8, 4, 10, 0, 0).unwrap();
    let deadline = reservation_deadline(tuesday, 96, &WorkingDays::default());
    assert_eq!(deadline, Utc.with_ymd_and_hms(2026, 8, 10, 10, 0, 0).unwrap());
}

#[test]
fn test_sparse_working_day_set() {
    // Only Wednesdays count: Tuesday 14:00 moves to Wednesday 14:00
    let working = WorkingDays::parse(&["wed"]).unwrap();
    let tuesday = Utc.with_ymd_and_hms(2026, 8, 4, 10, 0, 0).unwrap();
    let deadline = reservation_deadline(tuesday, 4, &working);
    assert_eq!(deadline, Utc.with_ymd_and_hms(2026, 8, 5, 14, 0, 0).unwrap());
}

#[test]
fn test_bound_ticket_keeps_its_category() {
    let fallback = unbounded_category(20, 30);
    let resolved = resolve_category(&waiting_ticket(1, Some(10)), Some(&fallback)).unwrap();
    assert_eq!(resolved, 10);
}

#[test]
fn test_unbound_ticket_falls_back_to_latest_expiring_category() {
    let categories = vec![
        unbounded_category(20, 10),
        unbounded_category(21, 28),
        unbounded_category(22, 15),
    ];
    let fallback = pick_unbounded_fallback(&categories);
    let resolved = resolve_category(&waiting_ticket(1, None), fallback).unwrap();
    assert_eq!(resolved, 21);
}

#[test]
fn test_unbound_ticket_without_fallback_is_an_error() {
    let err = resolve_category(&waiting_ticket(3, None), None).unwrap_err();
    assert_eq!(err.event_id, 1);
    assert_eq!(err.ticket_id, 3);
}

#[test]
fn test_working_day_names_parse_in_both_forms() {
    let working = WorkingDays::parse(&["Monday", "tue", "SUN"]).unwrap();
    assert!(working.contains(Weekday::Mon));
    assert!(working.contains(Weekday::Tue));
    assert!(working.contains(Weekday::Sun));
    assert!(!working.contains(Weekday::Fri));
}
