// src/lib.rs

//! rankwatch: leaderboard rank tracking library

pub mod error;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod storage;
pub mod utils;
