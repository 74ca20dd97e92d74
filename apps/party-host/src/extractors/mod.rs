pub mod game_id;
