pub mod config;
pub mod logging;
pub mod stamp;

pub mod catalog;
pub mod dispatch;
pub mod fsops;
pub mod job;
pub mod transfer;

pub mod testing;
