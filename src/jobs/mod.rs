//! Background maintenance jobs, registered with the scheduler at startup
//! and run independently of user requests.

pub mod session_sweep_job;
