//! Collection agent: loads the device list, runs a pass over every device on
//! each interval tick and writes the resulting samples out.

pub mod agent;
pub mod config;
pub mod logging;
pub mod replay;
pub mod scheduler;
pub mod textfile;
