pub mod aigc_job;
