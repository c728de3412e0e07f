use std::path::PathBuf;

use chrono::{Days, NaiveDate};
use tokio::sync::mpsc;

use super::*;
use crate::model::*;

fn test_wal_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("roombook_test_engine");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let _ = std::fs::remove_file(&path);
    path
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn request(client_id: Id, room_id: Id, date: NaiveDate, shift: Shift, event: &str) -> BookingRequest {
    BookingRequest {
        client_id,
        room_id,
        date,
        shift,
        event_name: event.into(),
    }
}

/// One room ("Hall A", 50) and one client ("Ana Lopez").
async fn seeded(name: &str) -> Engine {
    let engine = Engine::open(test_wal_path(name), 1000).unwrap();
    assert_eq!(engine.register_room("hall a", 50).await.unwrap(), 1);
    assert_eq!(engine.register_client("ana", "lopez").await.unwrap(), 1);
    engine
}

// ── Registration ─────────────────────────────────────────

#[tokio::test]
async fn registration_assigns_sequential_ids() {
    let engine = Engine::open(test_wal_path("sequential_ids.wal"), 1000).unwrap();
    assert_eq!(engine.register_client("Ana", "Lopez").await.unwrap(), 1);
    assert_eq!(engine.register_client("Luis", "Perez").await.unwrap(), 2);
    assert_eq!(engine.register_room("Hall A", 50).await.unwrap(), 1);
    assert_eq!(engine.peek("client").unwrap(), 3);
    assert_eq!(engine.peek("room").unwrap(), 2);
    assert_eq!(engine.peek("folio").unwrap(), 1);
}

#[tokio::test]
async fn names_are_title_cased() {
    let engine = seeded("title_case.wal").await;
    let client = engine.get_client(1).unwrap();
    assert_eq!(client.given_name, "Ana");
    assert_eq!(client.surname, "Lopez");
    assert_eq!(client.full_name(), "Ana Lopez");
    assert_eq!(engine.get_room(1).unwrap().name, "Hall A");
}

#[tokio::test]
async fn invalid_registration_consumes_no_id() {
    let engine = Engine::open(test_wal_path("invalid_registration.wal"), 1000).unwrap();
    assert!(matches!(
        engine.register_client("Ana3", "Lopez").await,
        Err(EngineError::ValidationFailed(_))
    ));
    assert!(matches!(
        engine.register_room("Hall A", 0).await,
        Err(EngineError::ValidationFailed(_))
    ));
    assert!(engine.register_room("   ", 10).await.is_err());
    assert_eq!(engine.peek("client").unwrap(), 1);
    assert_eq!(engine.peek("room").unwrap(), 1);
}

#[tokio::test]
async fn clients_listed_by_surname() {
    let engine = Engine::open(test_wal_path("clients_sorted.wal"), 1000).unwrap();
    engine.register_client("Luis", "Perez").await.unwrap();
    engine.register_client("Ana", "Lopez").await.unwrap();
    engine.register_client("Beto", "Lopez").await.unwrap();
    let names: Vec<String> = engine.list_clients().iter().map(|c| c.full_name()).collect();
    assert_eq!(names, ["Ana Lopez", "Beto Lopez", "Luis Perez"]);
}

// ── Counters ─────────────────────────────────────────────

#[tokio::test]
async fn peek_does_not_mutate() {
    let engine = Engine::open(test_wal_path("peek.wal"), 1000).unwrap();
    assert_eq!(engine.peek("folio").unwrap(), 1);
    assert_eq!(engine.peek("folio").unwrap(), 1);
}

#[tokio::test]
async fn advance_is_monotonic() {
    let engine = Engine::open(test_wal_path("advance.wal"), 1000).unwrap();
    assert_eq!(engine.advance("room").await.unwrap(), 2);
    assert_eq!(engine.advance("room").await.unwrap(), 3);
    assert_eq!(engine.peek("room").unwrap(), 3);
    assert_eq!(engine.peek("client").unwrap(), 1);
}

#[tokio::test]
async fn unknown_sequence_rejected() {
    let engine = Engine::open(test_wal_path("unknown_seq.wal"), 1000).unwrap();
    assert_eq!(
        engine.peek("invoice"),
        Err(EngineError::UnknownSequence("invoice".into()))
    );
    assert!(matches!(
        engine.advance("Folio").await,
        Err(EngineError::UnknownSequence(_))
    ));
}

// ── Bookings ─────────────────────────────────────────────

#[tokio::test]
async fn first_booking_gets_folio_one() {
    let engine = seeded("first_booking.wal").await;
    let d = date(2026, 10, 20);
    let folio = engine
        .create_booking(request(1, 1, d, Shift::Morning, "Wedding"))
        .await
        .unwrap();
    assert_eq!(folio, 1);
    assert_eq!(engine.peek("folio").unwrap(), 2);

    let rows = engine.bookings_on(d);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.folio, 1);
    assert_eq!(row.room_name, "Hall A");
    assert_eq!(row.client_name, "Ana Lopez");
    assert_eq!(row.shift, Shift::Morning);
    assert_eq!(row.event_name, "Wedding");
}

#[tokio::test]
async fn duplicate_slot_rejected_without_consuming_folio() {
    let engine = seeded("duplicate_slot.wal").await;
    let d = date(2026, 10, 20);
    engine
        .create_booking(request(1, 1, d, Shift::Morning, "Wedding"))
        .await
        .unwrap();

    let err = engine
        .create_booking(request(1, 1, d, Shift::Morning, "Party"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::AvailabilityConflict {
            room_id: 1,
            date: d,
            shift: Shift::Morning,
        }
    );
    assert_eq!(engine.peek("folio").unwrap(), 2);
    assert_eq!(engine.booking_count(), 1);
    assert_eq!(engine.get_booking(1).unwrap().event_name, "Wedding");
}

#[tokio::test]
async fn same_room_other_shift_or_date_is_free() {
    let engine = seeded("other_slot.wal").await;
    let d = date(2026, 10, 20);
    let next = d.checked_add_days(Days::new(1)).unwrap();
    engine.create_booking(request(1, 1, d, Shift::Morning, "A")).await.unwrap();
    assert_eq!(
        engine.create_booking(request(1, 1, d, Shift::Night, "B")).await,
        Ok(2)
    );
    assert_eq!(
        engine.create_booking(request(1, 1, next, Shift::Morning, "C")).await,
        Ok(3)
    );
}

#[tokio::test]
async fn booking_requires_known_client_and_room() {
    let engine = seeded("unknown_refs.wal").await;
    let d = date(2026, 10, 20);
    assert_eq!(
        engine.create_booking(request(9, 1, d, Shift::Morning, "X")).await,
        Err(EngineError::NotFound { kind: "client", id: 9 })
    );
    assert_eq!(
        engine.create_booking(request(1, 7, d, Shift::Morning, "X")).await,
        Err(EngineError::NotFound { kind: "room", id: 7 })
    );
    assert!(matches!(
        engine.create_booking(request(1, 1, d, Shift::Morning, "   ")).await,
        Err(EngineError::ValidationFailed(_))
    ));
    assert_eq!(engine.peek("folio").unwrap(), 1);
}

#[tokio::test]
async fn concurrent_bookings_for_one_slot_admit_one() {
    let engine = std::sync::Arc::new(seeded("concurrent_slot.wal").await);
    let d = date(2026, 10, 20);
    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .create_booking(request(1, 1, d, Shift::Afternoon, &format!("Event {i}")))
                .await
        }));
    }
    let mut created = 0;
    let mut conflicts = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => created += 1,
            Err(EngineError::AvailabilityConflict { .. }) => conflicts += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(engine.peek("folio").unwrap(), 2);
}

#[tokio::test]
async fn booking_and_counter_share_one_wal_batch() {
    let path = test_wal_path("booking_batch.wal");
    let engine = Engine::open(path.clone(), 1000).unwrap();
    engine.register_room("Hall A", 50).await.unwrap();
    engine.register_client("Ana", "Lopez").await.unwrap();
    engine
        .create_booking(request(1, 1, date(2026, 10, 20), Shift::Morning, "Wedding"))
        .await
        .unwrap();
    engine.close().await.unwrap();

    let events = crate::wal::Wal::replay(&path).unwrap();
    let at = events
        .iter()
        .position(|e| matches!(e, Event::BookingCreated { folio: 1, .. }))
        .unwrap();
    assert_eq!(
        events[at + 1],
        Event::CounterAdvanced {
            sequence: Sequence::Folio,
            value: 2,
        }
    );
}

#[tokio::test]
async fn failed_wal_write_leaves_no_booking_and_no_counter_move() {
    let mut engine = seeded("wal_failure.wal").await;
    let d = date(2026, 10, 20);

    let (dead_tx, dead_rx) = mpsc::channel(1);
    drop(dead_rx);
    let live_tx = std::mem::replace(&mut engine.wal_tx, dead_tx);
    assert!(matches!(
        engine.create_booking(request(1, 1, d, Shift::Morning, "Wedding")).await,
        Err(EngineError::WalError(_))
    ));
    assert!(matches!(
        engine.register_client("Luis", "Perez").await,
        Err(EngineError::WalError(_))
    ));
    assert_eq!(engine.booking_count(), 0);
    assert_eq!(engine.peek("folio").unwrap(), 1);
    assert_eq!(engine.peek("client").unwrap(), 2);

    engine.wal_tx = live_tx;
    assert_eq!(
        engine.create_booking(request(1, 1, d, Shift::Morning, "Wedding")).await,
        Ok(1)
    );
    assert_eq!(engine.register_client("Luis", "Perez").await, Ok(2));
}

#[tokio::test]
async fn counter_behind_stored_booking_does_not_block_new_bookings() {
    let engine = seeded("counter_behind.wal").await;
    let d = date(2026, 10, 20);
    // Booking 1 present while the folio counter still says 1
    engine
        .store
        .apply_event(&Event::BookingCreated {
            folio: 1,
            client_id: 1,
            room_id: 1,
            date: d,
            shift: Shift::Morning,
            event_name: "Wedding".into(),
        })
        .unwrap();
    assert_eq!(engine.peek("folio").unwrap(), 1);

    assert_eq!(
        engine.create_booking(request(1, 1, d, Shift::Afternoon, "Lunch")).await,
        Ok(2)
    );
    assert_eq!(
        engine.create_booking(request(1, 1, d, Shift::Night, "Dinner")).await,
        Ok(3)
    );
    assert_eq!(engine.peek("folio").unwrap(), 4);
}

#[tokio::test]
async fn client_counter_behind_stored_client_skips_taken_id() {
    let engine = Engine::open(test_wal_path("client_counter_behind.wal"), 1000).unwrap();
    engine
        .store
        .apply_event(&Event::ClientRegistered {
            id: 1,
            given_name: "Ana".into(),
            surname: "Lopez".into(),
        })
        .unwrap();
    assert_eq!(engine.register_client("Luis", "Perez").await, Ok(2));
    assert_eq!(engine.peek("client").unwrap(), 3);
}

// ── Availability ─────────────────────────────────────────

#[tokio::test]
async fn booked_shift_disappears_from_availability() {
    let engine = seeded("availability.wal").await;
    engine.register_room("Hall B", 20).await.unwrap();
    let d = date(2026, 10, 20);

    let before = engine.available_rooms(d);
    assert_eq!(before.len(), 2);
    assert!(before.iter().all(|a| a.free_shifts == Shift::ALL));

    engine.create_booking(request(1, 1, d, Shift::Morning, "A")).await.unwrap();
    let after = engine.available_rooms(d);
    let hall_a = after.iter().find(|a| a.room.id == 1).unwrap();
    assert_eq!(hall_a.free_shifts, [Shift::Afternoon, Shift::Night]);
    assert!(!hall_a.is_free(Shift::Morning));

    // Other dates are untouched
    assert!(engine
        .available_rooms(d.succ_opt().unwrap())
        .iter()
        .all(|a| a.free_shifts == Shift::ALL));
}

#[tokio::test]
async fn fully_booked_room_is_not_listed() {
    let engine = seeded("fully_booked.wal").await;
    let d = date(2026, 10, 20);
    for shift in Shift::ALL {
        engine.create_booking(request(1, 1, d, shift, "All day")).await.unwrap();
    }
    assert!(engine.available_rooms(d).is_empty());
}

// ── Queries ──────────────────────────────────────────────

#[tokio::test]
async fn range_is_inclusive_on_both_ends() {
    let engine = seeded("range.wal").await;
    let d1 = date(2026, 10, 20);
    let d2 = date(2026, 10, 23);
    let after = date(2026, 10, 24);
    engine.create_booking(request(1, 1, d2, Shift::Morning, "Late")).await.unwrap();
    engine.create_booking(request(1, 1, after, Shift::Morning, "Outside")).await.unwrap();
    engine.create_booking(request(1, 1, d1, Shift::Night, "Early")).await.unwrap();

    let rows = engine.bookings_in_range(d1, d2).unwrap();
    let got: Vec<(NaiveDate, Id)> = rows.iter().map(|r| (r.date, r.folio)).collect();
    assert_eq!(got, [(d1, 3), (d2, 1)]);
}

#[tokio::test]
async fn range_with_start_after_end_rejected() {
    let engine = seeded("range_reversed.wal").await;
    assert!(matches!(
        engine.bookings_in_range(date(2026, 10, 21), date(2026, 10, 20)),
        Err(EngineError::ValidationFailed(_))
    ));
}

#[tokio::test]
async fn day_rows_ordered_by_shift_then_folio() {
    let engine = seeded("day_order.wal").await;
    engine.register_room("Hall B", 20).await.unwrap();
    let d = date(2026, 10, 20);
    engine.create_booking(request(1, 1, d, Shift::Night, "N")).await.unwrap();
    engine.create_booking(request(1, 2, d, Shift::Morning, "M2")).await.unwrap();
    engine.create_booking(request(1, 1, d, Shift::Morning, "M1")).await.unwrap();
    engine.create_booking(request(1, 1, d, Shift::Afternoon, "A")).await.unwrap();

    let events: Vec<String> = engine.bookings_on(d).into_iter().map(|r| r.event_name).collect();
    assert_eq!(events, ["M2", "M1", "A", "N"]);
}

#[tokio::test]
async fn empty_day_has_no_rows() {
    let engine = seeded("empty_day.wal").await;
    assert!(engine.bookings_on(date(2026, 10, 20)).is_empty());
}

// ── Rename ───────────────────────────────────────────────

#[tokio::test]
async fn rename_replaces_event_name_only() {
    let engine = seeded("rename.wal").await;
    let d = date(2026, 10, 20);
    engine.create_booking(request(1, 1, d, Shift::Morning, "Wedding")).await.unwrap();
    engine.rename_event(1, "  Anniversary ").await.unwrap();

    let booking = engine.get_booking(1).unwrap();
    assert_eq!(booking.event_name, "Anniversary");
    assert_eq!(booking.slot(), SlotKey { room_id: 1, date: d, shift: Shift::Morning });
    assert_eq!(engine.peek("folio").unwrap(), 2);
}

#[tokio::test]
async fn rename_unknown_or_blank_rejected() {
    let engine = seeded("rename_errors.wal").await;
    assert_eq!(
        engine.rename_event(5, "Party").await,
        Err(EngineError::NotFound { kind: "booking", id: 5 })
    );
    engine
        .create_booking(request(1, 1, date(2026, 10, 20), Shift::Morning, "Wedding"))
        .await
        .unwrap();
    assert!(engine.rename_event(1, "").await.is_err());
    assert_eq!(engine.get_booking(1).unwrap().event_name, "Wedding");
}

// ── Durability ───────────────────────────────────────────

#[tokio::test]
async fn state_survives_reopen() {
    let path = test_wal_path("reopen.wal");
    let d = date(2026, 10, 20);
    {
        let engine = Engine::open(path.clone(), 1000).unwrap();
        engine.register_room("Hall A", 50).await.unwrap();
        engine.register_client("Ana", "Lopez").await.unwrap();
        engine.create_booking(request(1, 1, d, Shift::Morning, "Wedding")).await.unwrap();
        engine.rename_event(1, "Gala").await.unwrap();
        engine.close().await.unwrap();
    }

    let engine = Engine::open(path, 1000).unwrap();
    assert_eq!(engine.get_booking(1).unwrap().event_name, "Gala");
    assert_eq!(engine.peek("folio").unwrap(), 2);
    assert_eq!(engine.peek("client").unwrap(), 2);
    assert_eq!(engine.peek("room").unwrap(), 2);
    // The unique index is rebuilt too
    assert!(matches!(
        engine.create_booking(request(1, 1, d, Shift::Morning, "Again")).await,
        Err(EngineError::AvailabilityConflict { .. })
    ));
    assert_eq!(engine.create_booking(request(1, 1, d, Shift::Night, "Later")).await, Ok(2));
}

#[tokio::test]
async fn close_compacts_past_threshold() {
    let path = test_wal_path("compact_on_close.wal");
    {
        let engine = Engine::open(path.clone(), 3).unwrap();
        engine.register_room("Hall A", 50).await.unwrap();
        engine.register_client("Ana", "Lopez").await.unwrap();
        engine
            .create_booking(request(1, 1, date(2026, 10, 20), Shift::Morning, "One"))
            .await
            .unwrap();
        engine.rename_event(1, "Two").await.unwrap();
        engine.rename_event(1, "Three").await.unwrap();
        assert!(engine.wal_appends_since_compact().await >= 3);
        engine.close().await.unwrap();
    }

    // Client, room, booking and three counters
    let events = crate::wal::Wal::replay(&path).unwrap();
    assert_eq!(events.len(), 6);
    assert!(!events.iter().any(|e| matches!(e, Event::EventRenamed { .. })));

    let engine = Engine::open(path, 3).unwrap();
    assert_eq!(engine.get_booking(1).unwrap().event_name, "Three");
    assert_eq!(engine.peek("folio").unwrap(), 2);
}

#[tokio::test]
async fn explicit_compaction_resets_append_count() {
    let engine = seeded("compact_explicit.wal").await;
    assert!(engine.wal_appends_since_compact().await > 0);
    engine.compact_wal().await.unwrap();
    assert_eq!(engine.wal_appends_since_compact().await, 0);
    assert_eq!(engine.register_client("Luis", "Perez").await, Ok(2));
}

#[test]
fn replay_repairs_counters_behind_stored_ids() {
    let store = Store::new();
    store
        .apply_event(&Event::ClientRegistered {
            id: 4,
            given_name: "Ana".into(),
            surname: "Lopez".into(),
        })
        .unwrap();
    store
        .apply_event(&Event::CounterAdvanced {
            sequence: Sequence::Client,
            value: 2,
        })
        .unwrap();

    assert_eq!(store.repair_counters(), [(Sequence::Client, 5)]);
    assert_eq!(store.counter(Sequence::Client), 5);
    assert_eq!(store.counter(Sequence::Folio), 1);
    assert!(store.repair_counters().is_empty());
}

#[test]
fn store_rejects_duplicate_slot_on_replay() {
    let store = Store::new();
    let booking = |folio| Event::BookingCreated {
        folio,
        client_id: 1,
        room_id: 1,
        date: date(2026, 10, 20),
        shift: Shift::Night,
        event_name: "X".into(),
    };
    store.apply_event(&booking(1)).unwrap();
    assert!(matches!(
        store.apply_event(&booking(2)),
        Err(EngineError::AvailabilityConflict { .. })
    ));
    assert_eq!(store.booking_count(), 1);
}
