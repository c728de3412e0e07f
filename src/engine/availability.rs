use std::collections::HashSet;

use crate::model::*;

// ── Availability ─────────────────────────────────────────────────

/// Shifts of `room_id` not present in `booked`, in canonical order.
pub fn free_shifts(room_id: Id, booked: &HashSet<(Id, Shift)>) -> Vec<Shift> {
    Shift::ALL
        .into_iter()
        .filter(|shift| !booked.contains(&(room_id, *shift)))
        .collect()
}

/// Every room with at least one free shift, given the (room, shift) pairs
/// already booked on one date. Rooms keep their input order.
pub fn available_rooms(rooms: &[Room], booked: &HashSet<(Id, Shift)>) -> Vec<AvailableRoom> {
    rooms
        .iter()
        .filter_map(|room| {
            let free = free_shifts(room.id, booked);
            (!free.is_empty()).then(|| AvailableRoom {
                room: room.clone(),
                free_shifts: free,
            })
        })
        .collect()
}
