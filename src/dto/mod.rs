pub mod job_dto;
