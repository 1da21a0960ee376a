use super::{pick_index, seeded_random};

/// Lane for a note starting at `start_tick`. Notes sharing a tick share a lane.
pub fn assign_lane(start_tick: u32, lane_count: u8) -> u8 {
    let r = seeded_random(start_tick as f64 * 1000.0);
    pick_index(r, lane_count.max(1) as usize) as u8
}
