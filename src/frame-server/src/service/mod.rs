pub mod bet_transaction;
pub mod chain;
pub mod frame_api;
pub mod frame_flow;
pub mod game_result;
pub mod render;
