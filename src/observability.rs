use std::net::SocketAddr;

use crate::console::MenuChoice;

// ── Domain counters ─────────────────────────────────────────────

/// Counter: clients registered.
pub const CLIENTS_REGISTERED_TOTAL: &str = "roombook_clients_registered_total";

/// Counter: rooms registered.
pub const ROOMS_REGISTERED_TOTAL: &str = "roombook_rooms_registered_total";

/// Counter: bookings committed.
pub const BOOKINGS_CREATED_TOTAL: &str = "roombook_bookings_created_total";

/// Counter: bookings rejected by the (room, date, shift) unique index.
pub const BOOKING_CONFLICTS_TOTAL: &str = "roombook_booking_conflicts_total";

/// Counter: event names edited.
pub const EVENT_RENAMES_TOTAL: &str = "roombook_event_renames_total";

/// Counter: report exports. Labels: format, status.
pub const EXPORTS_TOTAL: &str = "roombook_exports_total";

/// Histogram: menu operation duration in seconds. Labels: operation.
pub const OPERATION_DURATION_SECONDS: &str = "roombook_operation_duration_seconds";

// ── Store ───────────────────────────────────────────────────────

/// Histogram: WAL group-commit flush duration in seconds.
pub const WAL_FLUSH_DURATION_SECONDS: &str = "roombook_wal_flush_duration_seconds";

/// Histogram: WAL group-commit batch size (events per flush).
pub const WAL_FLUSH_BATCH_SIZE: &str = "roombook_wal_flush_batch_size";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Map a menu choice to a short label for metrics.
pub fn operation_label(choice: MenuChoice) -> &'static str {
    match choice {
        MenuChoice::RegisterClient => "register_client",
        MenuChoice::RegisterRoom => "register_room",
        MenuChoice::CreateBooking => "create_booking",
        MenuChoice::EditEventName => "edit_event_name",
        MenuChoice::QueryByDate => "query_by_date",
        MenuChoice::Exit => "exit",
    }
}
