use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use roomplan::event::RoomEvent;
use roomplan::grid::{CellId, Surface};
use roomplan::placement::CatalogItem;

/// Items on the floor before the demo clears the room and starts over
const REDECORATE_AFTER: usize = 14;

/// Chance that a round moves or removes an existing item instead of adding one
const REARRANGE_CHANCE: f64 = 0.25;

/// Drives a decorating session: pick items, wander the ghost across the
/// room, stage and mostly commit. Rejected stages just fall through to a
/// cancel, like a user letting go over an occupied spot.
///
/// The store numbers new items `placed-1`, `placed-2`, ... so the demo
/// predicts ids for re-placement. A wrong guess is a harmless no-op.
pub async fn generate_demo_events(tx: mpsc::Sender<RoomEvent>, catalog: Vec<CatalogItem>, divisions: u32) {
    let mut rng = StdRng::from_entropy();
    if catalog.is_empty() || divisions == 0 {
        return;
    }

    let mut placed: Vec<String> = Vec::new();
    let mut seq: u64 = 0;

    tokio::time::sleep(Duration::from_millis(1200)).await;

    loop {
        if placed.len() >= REDECORATE_AFTER {
            if !send(&tx, RoomEvent::LoadDraft { items: Vec::new() }, 1500).await {
                return;
            }
            placed.clear();
        }

        let rearrange = !placed.is_empty() && rng.gen_bool(REARRANGE_CHANCE);
        let ok = if rearrange {
            let index = rng.gen_range(0..placed.len());
            rearrange_round(&tx, &mut rng, &mut placed, index, divisions).await
        } else {
            let item = &catalog[rng.gen_range(0..catalog.len())];
            seq += 1;
            let placed_id = format!("placed-{seq}");
            match placement_round(&tx, &mut rng, item, divisions).await {
                Some(true) => {
                    placed.push(placed_id);
                    true
                }
                Some(false) => true,
                None => false,
            }
        };
        if !ok {
            return;
        }

        let pause = rng.gen_range(600..1400);
        tokio::time::sleep(Duration::from_millis(pause)).await;
    }
}

/// Send and then wait; false once the app has gone away
async fn send(tx: &mpsc::Sender<RoomEvent>, event: RoomEvent, wait_ms: u64) -> bool {
    if tx.send(event).await.is_err() {
        return false;
    }
    tokio::time::sleep(Duration::from_millis(wait_ms)).await;
    true
}

fn random_cell(rng: &mut StdRng, surface: Option<Surface>, divisions: u32) -> CellId {
    let surface = surface.unwrap_or_else(|| Surface::ALL[rng.gen_range(0..Surface::ALL.len())]);
    CellId::new(
        surface,
        rng.gen_range(1..=divisions),
        rng.gen_range(1..=divisions),
    )
}

/// Hover a few random cells, maybe rotate, then stage
async fn wander(tx: &mpsc::Sender<RoomEvent>, rng: &mut StdRng, surface: Option<Surface>, divisions: u32) -> bool {
    for _ in 0..rng.gen_range(2..6) {
        let cell_id = random_cell(rng, surface, divisions);
        let wait = rng.gen_range(250..500);
        if !send(tx, RoomEvent::Hover { cell_id }, wait).await {
            return false;
        }
    }
    if rng.gen_bool(0.2) && !send(tx, RoomEvent::Rotate, 400).await {
        return false;
    }
    send(tx, RoomEvent::Stage, 700).await
}

/// New item from the inventory. `Some(committed)`, or `None` when the channel closed.
async fn placement_round(
    tx: &mpsc::Sender<RoomEvent>,
    rng: &mut StdRng,
    item: &CatalogItem,
    divisions: u32,
) -> Option<bool> {
    let start = RoomEvent::StartFromInventory {
        item_id: item.item_id.clone(),
        constraints: None,
    };
    if !send(tx, start, 500).await {
        return None;
    }
    // Half the time accept the auto-placed spot as is
    if rng.gen_bool(0.5) {
        if !send(tx, RoomEvent::Stage, 600).await {
            return None;
        }
    } else if !wander(tx, rng, item.allowed_surface, divisions).await {
        return None;
    }

    let commit = rng.gen_bool(0.85);
    let last = if commit { RoomEvent::Commit } else { RoomEvent::Cancel };
    if !send(tx, last, 200).await {
        return None;
    }
    // Clears the session when the stage was rejected
    if !send(tx, RoomEvent::Cancel, 0).await {
        return None;
    }
    Some(commit)
}

async fn rearrange_round(
    tx: &mpsc::Sender<RoomEvent>,
    rng: &mut StdRng,
    placed: &mut Vec<String>,
    index: usize,
    divisions: u32,
) -> bool {
    let placed_id = placed[index].clone();
    if !send(tx, RoomEvent::StartFromPlaced { placed_id }, 500).await {
        return false;
    }
    if rng.gen_bool(0.2) {
        placed.remove(index);
        return send(tx, RoomEvent::Delete, 300).await;
    }
    // Surface is enforced by the store from the catalog entry
    if !wander(tx, rng, None, divisions).await {
        return false;
    }
    send(tx, RoomEvent::Commit, 200).await && send(tx, RoomEvent::Cancel, 0).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_cell_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let cell = random_cell(&mut rng, Some(Surface::LeftWall), 4);
            assert_eq!(cell.surface, Surface::LeftWall);
            assert!((1..=4).contains(&cell.row));
            assert!((1..=4).contains(&cell.col));
        }
    }

    #[tokio::test]
    async fn test_demo_stops_when_app_closes() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let catalog = roomplan::config::demo_catalog();
        tokio::time::timeout(
            Duration::from_secs(5),
            generate_demo_events(tx, catalog, 12),
        )
        .await
        .unwrap();
    }
}
