pub mod auth_service;
pub mod job_scheduler_service;
pub mod trading_service;
pub mod watchlist_service;
