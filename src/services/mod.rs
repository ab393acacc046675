pub mod course_service;
pub mod syllabus_service;

pub use course_service::CourseService;
pub use syllabus_service::{SyllabusReport, SyllabusService};
