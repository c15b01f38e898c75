pub mod scoreboard;
pub mod theme;
