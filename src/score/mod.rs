// Match score state and delivery to the display server

pub mod pusher;
pub mod snapshot;

pub use pusher::{PushError, ScorePusher};
pub use snapshot::{
    combine_players, GameMeta, ScoreBoard, ScorePayload, ScoreSnapshot, Side,
};
