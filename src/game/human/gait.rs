//! Velocity to walk-cycle mapping and playback of the walk clip.

use bevy::prelude::*;

use crate::game::configs::HumanConfig;

use super::assets::HumanAssets;

/// First frame of the walk cycle in the rig's walk action.
pub const WALK_START_FRAME: u32 = 9;
/// Last frame of the walk cycle in the rig's walk action.
pub const WALK_END_FRAME: u32 = 32;
/// Playback scale of the walk cycle.
// TODO: scale with the forward speed so the feet stop sliding at low speeds.
pub const WALK_SPEED: f32 = 1.0;

/// Segment of the walk action the armature should play
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum Gait {
    /// Loop `[start, end]` at `speed`
    Walk { start: u32, end: u32, speed: f32 },
    /// Hold a single frame
    Idle { frame: u32 },
}

impl Gait {
    pub const WALK: Gait = Gait::Walk {
        start: WALK_START_FRAME,
        end: WALK_END_FRAME,
        speed: WALK_SPEED,
    };

    pub const IDLE: Gait = Gait::Idle {
        frame: WALK_START_FRAME,
    };

    pub fn start_frame(&self) -> u32 {
        match *self {
            Gait::Walk { start, .. } => start,
            Gait::Idle { frame } => frame,
        }
    }

    /// `(start, end)` frames of the played segment.
    pub fn frame_range(&self) -> (u32, u32) {
        match *self {
            Gait::Walk { start, end, .. } => (start, end),
            Gait::Idle { frame } => (frame, frame),
        }
    }
}

/// Picks the gait from the raw motion command (robot frame, x forward, z up).
///
/// Any forward or turning component walks. There is no hysteresis: a single
/// tick at zero snaps the armature back to the idle frame.
pub fn select_gait(linear: Vec3, angular: Vec3) -> Gait {
    if linear.x != 0.0 || angular.z != 0.0 {
        Gait::WALK
    } else {
        Gait::IDLE
    }
}

/// Playback cursor of the walk action on an armature.
///
/// Requesting the segment that is already playing keeps the cursor where it
/// is; any other segment restarts from its first frame.
#[derive(Component, Debug, Default, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct GaitPlayback {
    gait: Option<Gait>,
    frame: f32,
}

impl GaitPlayback {
    pub fn play(&mut self, gait: Gait) {
        if self.gait != Some(gait) {
            self.gait = Some(gait);
            self.frame = gait.start_frame() as f32;
        }
    }

    pub fn gait(&self) -> Option<Gait> {
        self.gait
    }

    pub fn frame(&self) -> f32 {
        self.frame
    }

    /// Moves the cursor forward by `dt` seconds and returns the frame to display.
    pub fn advance(&mut self, dt: f32, frame_rate: f32) -> Option<f32> {
        let gait = self.gait?;
        let (start, end) = gait.frame_range();
        let (start, end) = (start as f32, end as f32);
        match gait {
            Gait::Idle { .. } => self.frame = start,
            Gait::Walk { speed, .. } => {
                let length = end - start;
                if length <= 0.0 {
                    self.frame = start;
                } else {
                    let offset = self.frame - start + dt * frame_rate * speed;
                    self.frame = start + offset.rem_euclid(length);
                }
            }
        }
        Some(self.frame)
    }
}

/// The walk clip as registered in the rig's animation graph
#[derive(Component, Debug, Clone, Copy)]
pub struct WalkAnimation {
    pub player: Entity,
    pub node: AnimationNodeIndex,
}

/// Hooks the walk clip up to the rig's [`AnimationPlayer`] once the scene has spawned it.
pub fn bind_walk_animation(
    mut commands: Commands,
    human_assets: Option<Res<HumanAssets>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    armatures: Query<Entity, (With<GaitPlayback>, Without<WalkAnimation>)>,
    children: Query<&Children>,
    parents: Query<&ChildOf>,
    players: Query<(), With<AnimationPlayer>>,
) {
    let Some(human_assets) = human_assets else {
        return;
    };

    for armature in &armatures {
        // glTF puts the player on the animation root, which may sit above the armature.
        let player = std::iter::once(armature)
            .chain(children.iter_descendants(armature))
            .chain(parents.iter_ancestors(armature))
            .find(|entity| players.contains(*entity));
        let Some(player) = player else {
            continue;
        };

        let (graph, node) = AnimationGraph::from_clip(human_assets.walk.clone());
        commands
            .entity(player)
            .insert(AnimationGraphHandle(graphs.add(graph)));
        commands
            .entity(armature)
            .insert(WalkAnimation { player, node });
        info!("Bound walk animation of armature {armature:?} to player {player:?}");
    }
}

/// Advances every armature's walk cursor and seeks its clip to it.
pub fn drive_walk_cycle(
    time: Res<Time>,
    config: Res<HumanConfig>,
    mut armatures: Query<(&mut GaitPlayback, Option<&WalkAnimation>)>,
    mut players: Query<&mut AnimationPlayer>,
) {
    let frame_rate = config.frame_rate;
    for (mut playback, walk) in &mut armatures {
        let Some(frame) = playback.advance(time.delta_secs(), frame_rate) else {
            continue;
        };
        let Some(walk) = walk else {
            continue;
        };
        let Ok(mut player) = players.get_mut(walk.player) else {
            continue;
        };
        // The cursor is authoritative, the player only samples the clip at it.
        player.play(walk.node).seek_to(frame / frame_rate).pause();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_when_no_forward_or_turn() {
        assert_eq!(select_gait(Vec3::ZERO, Vec3::ZERO), Gait::IDLE);
        // Lateral and vertical motion do not walk.
        assert_eq!(
            select_gait(Vec3::new(0.0, 1.0, -2.0), Vec3::new(0.5, 0.3, 0.0)),
            Gait::IDLE
        );
        assert_eq!(Gait::IDLE.frame_range(), (9, 9));
    }

    #[test]
    fn test_walk_on_forward_or_turn() {
        let walk = Gait::Walk {
            start: 9,
            end: 32,
            speed: 1.0,
        };
        assert_eq!(select_gait(Vec3::new(0.5, 0.0, 0.0), Vec3::ZERO), walk);
        assert_eq!(select_gait(Vec3::new(-0.1, 0.0, 0.0), Vec3::ZERO), walk);
        assert_eq!(select_gait(Vec3::ZERO, Vec3::new(0.0, 0.0, 0.2)), walk);
        // No dead zone: the tiniest command still walks.
        assert_eq!(select_gait(Vec3::new(1e-6, 0.0, 0.0), Vec3::ZERO), walk);
    }

    #[test]
    fn test_same_segment_keeps_cursor() {
        let mut playback = GaitPlayback::default();
        playback.play(Gait::WALK);
        assert_eq!(playback.frame(), 9.0);

        // 0.5s at 24 fps is 12 frames.
        playback.advance(0.5, 24.0);
        playback.play(Gait::WALK);
        assert!((playback.frame() - 21.0).abs() < 1e-4);
    }

    #[test]
    fn test_switching_segment_restarts() {
        let mut playback = GaitPlayback::default();
        playback.play(Gait::WALK);
        playback.advance(0.5, 24.0);

        playback.play(Gait::IDLE);
        assert_eq!(playback.frame(), 9.0);
        assert_eq!(playback.advance(1.0, 24.0), Some(9.0));

        playback.play(Gait::WALK);
        assert_eq!(playback.frame(), 9.0);
    }

    #[test]
    fn test_walk_cycle_loops() {
        let mut playback = GaitPlayback::default();
        playback.play(Gait::WALK);

        // 30 frames past the start on a 23 frame cycle lands 7 frames in.
        let frame = playback.advance(1.25, 24.0).unwrap();
        assert!((frame - 16.0).abs() < 1e-3);
        assert!(frame >= WALK_START_FRAME as f32 && frame < WALK_END_FRAME as f32);
    }

    #[test]
    fn test_nothing_to_advance_before_first_command() {
        let mut playback = GaitPlayback::default();
        assert_eq!(playback.advance(0.1, 24.0), None);
    }
}
