use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    pub fn offset(self, pos: Vec2) -> Vec2 {
        let (dx, dy) = self.delta();
        Vec2::new(pos.x + dx, pos.y + dy)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    Active,
    Lost,
    Won,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EnemyView {
    pub id: usize,
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct MazeView {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<String>,
    pub start: Vec2,
    pub goal: Vec2,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    RoundStarted {
        round: u32,
        score: u32,
    },
    PickupCollected {
        x: i32,
        y: i32,
        score: u32,
    },
    RoundWon {
        score: u32,
    },
    RoundLost {
        #[serde(rename = "finalScore")]
        final_score: u32,
    },
}

impl GameEvent {
    pub fn status_line(&self) -> String {
        match self {
            Self::RoundStarted { score, .. } => {
                format!("スコア: {score} - 矢印キーで動かしてリンゴをゲット！")
            }
            Self::PickupCollected { score, .. } => format!("スコア: {score}"),
            Self::RoundWon { score } => format!("ゴール！おめでとう！現在のスコア: {score}"),
            Self::RoundLost { final_score } => {
                format!("ゲームオーバー！最終スコア: {final_score}")
            }
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    pub round: u32,
    pub state: RoundState,
    pub score: u32,
    pub player: Vec2,
    pub goal: Vec2,
    pub enemies: Vec<EnemyView>,
    pub pickups: Vec<Vec2>,
    pub events: Vec<GameEvent>,
}
