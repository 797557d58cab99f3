//! Fixed-step systems, run in order:
//! `capture_input → stream_terrain → locomotion → camera_follow`.

use bevy_ecs::prelude::*;
use tracing::{debug, error};
use wayfarer_input::InputSnapshot;

use crate::resources::{
    BindingsRes, CameraRes, ControllerRes, FixedTime, Ground, KeyboardRes, LastTick, PlayerRes,
    SnapshotRes, TickFault,
};

/// Capture this step's [`InputSnapshot`] from the keyboard and bindings.
pub fn capture_input(
    keyboard: Res<KeyboardRes>,
    bindings: Res<BindingsRes>,
    time: Res<FixedTime>,
    mut snapshot: ResMut<SnapshotRes>,
) {
    snapshot.0 = InputSnapshot::capture(&keyboard.0, &bindings.0, time.delta);
}

/// Install finished chunks, request missing ones around the player, and
/// evict chunks that have drifted out of range.
pub fn stream_terrain(player: Res<PlayerRes>, mut ground: ResMut<Ground>) {
    let Ground::Streamed {
        store,
        streamer,
        radius,
    } = &mut *ground
    else {
        return;
    };
    let position = player.0.current();

    let installed = streamer.drain_into(store);
    let queued = streamer.request_around(position.x, position.z, *radius, store);
    // One ring of slack so chunks at the edge don't thrash.
    let evicted = store
        .coord_at(position.x, position.z)
        .map_or(0, |center| store.retain_within(center, radius.saturating_add(1)));

    if installed + queued + evicted > 0 {
        debug!(installed, queued, evicted, resident = store.len(), "terrain streamed");
    }
}

/// Advance the player one tick against the camera's reference frame.
pub fn locomotion(
    controller: Res<ControllerRes>,
    camera: Res<CameraRes>,
    snapshot: Res<SnapshotRes>,
    ground: Res<Ground>,
    mut player: ResMut<PlayerRes>,
    mut last: ResMut<LastTick>,
    mut fault: ResMut<TickFault>,
) {
    let frame = camera.0.reference_frame();
    match controller.0.tick(&mut player.0, &snapshot.0, frame, &*ground) {
        Ok(report) => last.0 = report,
        Err(err) => {
            error!(%err, "locomotion tick rejected");
            fault.0 = Some(err);
        }
    }
}

/// Fly the camera or ease it after the player, then count the step.
/// Skipped when the tick was rejected.
pub fn camera_follow(
    player: Res<PlayerRes>,
    snapshot: Res<SnapshotRes>,
    fault: Res<TickFault>,
    mut camera: ResMut<CameraRes>,
    mut time: ResMut<FixedTime>,
) {
    if fault.0.is_some() {
        return;
    }
    camera.0.fly(&snapshot.0);
    camera.0.follow(&player.0.view());
    time.ticks += 1;
}
