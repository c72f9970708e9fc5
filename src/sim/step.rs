//! Per-tick transition function
//!
//! Advances every live photon one cell, applies the cell interaction rules,
//! then dispenses the next scheduled input photon. The tick is atomic with
//! respect to the caller: it fully resolves or (when not running) does
//! nothing at all.

use super::board::Board;
use super::cell::{CellType, GridVec};

/// Advance the board by exactly one tick. No-op unless running.
pub fn step(board: &mut Board) {
    if board.current_time < 0 {
        return;
    }

    // Snapshot the live ids up front: photons spawned during this tick must
    // not be visited until the next one, and earlier interactions may remove
    // photons we have yet to reach.
    let ids: Vec<u32> = board.photons.keys().copied().collect();
    for id in ids {
        let Some(photon) = board.photons.get(&id).copied() else {
            continue;
        };
        let pos = photon.pos + photon.dir;
        if !board.is_in_bounds(pos) {
            board.photons.remove(&id);
            continue;
        }

        let cell = board.get(pos.x, pos.y);
        let mut dir = photon.dir;
        let mut survived = true;
        match cell.kind {
            CellType::Empty => {}
            CellType::Mirror => match mirror_direction(cell.param, dir) {
                Some(reflected) => dir = reflected,
                None => survived = false,
            },
            CellType::Generator => {
                // New photon rides ahead, the trigger bounces back
                board.spawn_photon(cell.param, pos, dir);
                dir = -dir;
            }
            CellType::Sluice => {
                dir = GridVec::from_direction_param(cell.param);
            }
            CellType::Process => {
                board.spawn_photon(photon.value, pos, dir.turned_left());
                board.spawn_photon(photon.value, pos, dir.turned_right());
                survived = false;
            }
            CellType::Tarpit => {
                if dir.is_still() {
                    // This photon is the stuck occupant
                } else if let Some(stuck) = board
                    .photons
                    .get(&cell.tarpit_id)
                    .filter(|p| p.id != id)
                    .copied()
                {
                    let value = combine(cell.param, stuck.value, photon.value);
                    log::debug!(
                        "tarpit at ({}, {}): {} op {} -> {value}",
                        pos.x,
                        pos.y,
                        stuck.value,
                        photon.value
                    );
                    board.photons.remove(&stuck.id);
                    board.spawn_photon(value, pos, dir);
                    let mut cleared = cell;
                    cleared.tarpit_id = 0;
                    board.set(pos.x, pos.y, cleared);
                    survived = false;
                } else {
                    // Unoccupied (or the recorded occupant is gone): halt here
                    dir = GridVec::STILL;
                    let mut occupied = cell;
                    occupied.tarpit_id = id;
                    board.set(pos.x, pos.y, occupied);
                }
            }
            CellType::Input => {
                // One-way source, not a through-path
                survived = false;
            }
            CellType::Output => {
                board.outputs.push(photon.value);
                log::debug!("output photon {id} value {}", photon.value);
                survived = false;
            }
            CellType::Wall => {
                survived = false;
            }
        }

        if survived {
            board.photons.insert(id, super::Photon { pos, dir, ..photon });
        } else {
            board.photons.remove(&id);
        }
    }

    board.current_time += 1;
    if board.current_time % board.cadence == 0 {
        board.dispense_input((board.current_time / board.cadence) as usize);
    }
}

/// Mirror interaction: diagonal variants always redirect, straight variants
/// reflect perpendicular motion and absorb parallel motion (None).
fn mirror_direction(param: i32, dir: GridVec) -> Option<GridVec> {
    match param.rem_euclid(4) {
        // '-': reflects vertical motion, absorbs horizontal
        0 => (dir.y != 0).then(|| GridVec::new(dir.x, -dir.y)),
        // '/': (dx, dy) -> (dy, dx)
        1 => Some(GridVec::new(dir.y, dir.x)),
        // '|': reflects horizontal motion, absorbs vertical
        2 => (dir.x != 0).then(|| GridVec::new(-dir.x, dir.y)),
        // '\': (dx, dy) -> (-dy, -dx)
        _ => Some(GridVec::new(-dir.y, -dir.x)),
    }
}

/// Tarpit combination. The stuck photon is the left operand. Division and
/// modulo by zero yield 0 rather than faulting; everything wraps the way
/// the board's 32-bit values always have.
fn combine(op_param: i32, stuck: i32, arriving: i32) -> i32 {
    match op_param.rem_euclid(5) {
        0 => stuck.wrapping_add(arriving),
        1 => stuck.wrapping_sub(arriving),
        2 => stuck.wrapping_mul(arriving),
        3 => {
            if arriving == 0 {
                0
            } else {
                stuck.wrapping_div(arriving)
            }
        }
        _ => {
            if arriving == 0 {
                0
            } else {
                stuck.wrapping_rem(arriving)
            }
        }
    }
}
