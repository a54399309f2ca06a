pub mod application_service;
pub mod identity_service;
pub mod job_service;
pub mod skill_service;
pub mod stats_service;
pub mod storage_service;
