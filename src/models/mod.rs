pub mod application;
pub mod ats_result;
pub mod job_posting;
pub mod profile;
pub mod required_skill;

pub use application::{
    Application, ApplicationJoinRow, ApplicationStatus, EnrichedApplication, UNKNOWN_LABEL,
};
pub use ats_result::AtsResult;
pub use job_posting::{JobPosting, NewJobPosting, ACTIVE_JOB_STATUS};
pub use profile::{Principal, Profile, Role};
pub use required_skill::{NewRequiredSkill, RequiredSkill};
